//! Working memory: the externally-owned graph this crate mirrors into.
//!
//! The runtime owns the actual graph. This module defines the boundary the
//! rest of the crate talks to:
//!
//! - [`WmRead`]: enumerate an identifier's child WMEs and name identifiers
//! - [`WorkingMemory`]: create, update and destroy WMEs
//! - [`MemoryStore`](memory::MemoryStore): an in-memory implementation
//! - [`WmQuery`](query::WmQuery): attribute lookups on top of `WmRead`
//!
//! Wrappers never own graph nodes. They hold [`Handle`]s and write only when
//! the caller asks them to.

pub mod memory;
pub mod query;

use serde::{Deserialize, Serialize};

use crate::error::WmResult;
use crate::value::WmValue;

/// Opaque reference to an identifier or WME in the store.
///
/// The wrapped string is the stable ID the store assigned (an identifier's
/// symbol such as `S1`, or a store-specific WME ID). Equality and hashing go
/// through that string only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The value side of a child WME.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildValue {
    /// A structural child: another identifier.
    Identifier(Handle),
    /// A typed constant.
    Scalar(WmValue),
    /// A constant whose type the store could not classify.
    Untyped { value_type: String, text: String },
}

impl ChildValue {
    /// Render the value as the runtime would print it.
    pub fn as_text(&self, wm: &(impl WmRead + ?Sized)) -> String {
        match self {
            ChildValue::Identifier(h) => wm.symbol_of(h),
            ChildValue::Scalar(v) => v.to_string(),
            ChildValue::Untyped { text, .. } => text.clone(),
        }
    }
}

/// One `(id ^attribute value)` edge leaving an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildWme {
    pub attribute: String,
    pub value: ChildValue,
}

impl ChildWme {
    pub fn new(attribute: impl Into<String>, value: ChildValue) -> Self {
        Self {
            attribute: attribute.into(),
            value,
        }
    }
}

/// Read access to working memory.
pub trait WmRead {
    /// All WMEs whose identifier is `id`, in store order.
    fn children(&self, id: &Handle) -> WmResult<Vec<ChildWme>>;

    /// The identifier's symbol, used as its identity key during traversal.
    fn symbol_of(&self, id: &Handle) -> String;
}

/// Write access to working memory.
///
/// Every method performs exactly one change in the store. Callers decide when
/// it is safe to write (normally once per input phase).
pub trait WorkingMemory: WmRead {
    /// Create `(parent ^attribute <new-id>)` and return the new identifier.
    fn create_id_wme(&mut self, parent: &Handle, attribute: &str) -> WmResult<Handle>;

    /// Create `(parent ^attribute value)` typed after `value`, returning the WME.
    fn create_value_wme(
        &mut self,
        parent: &Handle,
        attribute: &str,
        value: &WmValue,
    ) -> WmResult<Handle>;

    /// Replace the value of an existing constant WME.
    fn update_value(&mut self, wme: &Handle, value: &WmValue) -> WmResult<()>;

    /// Remove a WME (or every WME pointing at an identifier).
    fn destroy_wme(&mut self, wme: &Handle) -> WmResult<()>;
}
