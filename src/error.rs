//! Rich diagnostic error types for soar-wm.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know what went wrong and
//! how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::value::ValueKind;

/// Top-level error type for soar-wm.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum WmError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Printout(#[from] PrintoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl WmError {
    /// The store did not know the handle, e.g. because the WME went away
    /// with its parent.
    pub fn is_unknown_handle(&self) -> bool {
        matches!(self, WmError::Store(StoreError::UnknownHandle { .. }))
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("unknown handle: {handle}")]
    #[diagnostic(
        code(wm::store::unknown_handle),
        help(
            "The handle does not name a live identifier or WME. \
             It may have been destroyed already, or garbage-collected \
             when its parent was removed."
        )
    )]
    UnknownHandle { handle: String },

    #[error("handle {handle} is an identifier, not a value WME")]
    #[diagnostic(
        code(wm::store::not_a_value),
        help("Only value WMEs created with `create_value_wme` can be updated in place.")
    )]
    NotAValue { handle: String },

    #[error("handle {handle} is not an identifier")]
    #[diagnostic(
        code(wm::store::not_an_identifier),
        help("Children can only be created under identifiers, not under value WMEs.")
    )]
    NotAnIdentifier { handle: String },

    #[error("cannot update {handle}: stored value is {expected}, got {actual}")]
    #[diagnostic(
        code(wm::store::kind_mismatch),
        help(
            "A WME keeps the value type it was created with. \
             Destroy it and create a new one to change the type."
        )
    )]
    KindMismatch {
        handle: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}

// ---------------------------------------------------------------------------
// Value errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ValueError {
    #[error("WME ^{attribute} holds {expected} values, got {actual}")]
    #[diagnostic(
        code(wm::value::kind_mismatch),
        help(
            "A tracked WME's value type is fixed when it is constructed. \
             Convert the value first with `WmValue::coerce_to`, or track \
             the new type with a separate WME."
        )
    )]
    KindMismatch {
        attribute: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("cannot coerce {value:?} to {target}")]
    #[diagnostic(
        code(wm::value::coerce),
        help("Only numeric strings can be coerced to int or float.")
    )]
    Coerce { value: String, target: ValueKind },
}

// ---------------------------------------------------------------------------
// Tree synchronizer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TreeError {
    #[error("invalid attribute {attribute:?} under {path}")]
    #[diagnostic(
        code(wm::tree::invalid_attribute),
        help(
            "Input tree attributes must be non-empty and must not contain '.', \
             which separates segments of the table path."
        )
    )]
    InvalidAttribute { path: String, attribute: String },

    #[error("{path} was synchronized as a {previous}, now given as a {current}")]
    #[diagnostic(
        code(wm::tree::shape_mismatch),
        help(
            "A path in the WME table cannot switch between a leaf and a \
             sub-tree. Call `remove_tree_from_wm` and rebuild the tree."
        )
    )]
    ShapeMismatch {
        path: String,
        previous: &'static str,
        current: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Printout errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PrintoutError {
    #[error("printout is empty")]
    #[diagnostic(
        code(wm::printout::empty),
        help("Print an identifier with a depth, e.g. `p S1 -d 3`, and pass its output.")
    )]
    Empty,

    #[error("no such identifier: {message}")]
    #[diagnostic(
        code(wm::printout::no_identifier),
        help("The agent reported that the requested identifier does not exist.")
    )]
    NoSuchIdentifier { message: String },

    #[error("printout does not start with an identifier: {token:?}")]
    #[diagnostic(
        code(wm::printout::no_root),
        help("A working-memory printout starts with `(ID ^attr value ...`.")
    )]
    MissingRoot { token: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(wm::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(wm::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(wm::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type WmResult<T> = std::result::Result<T, WmError>;
