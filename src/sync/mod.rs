//! Mirroring local state into working memory on demand.
//!
//! Nothing here writes to the store on its own. Callers drive the cycle,
//! normally once per input phase:
//!
//! - [`WmInterface::attach`] creates the structure under a parent identifier
//! - [`WmInterface::sync`] pushes local changes
//! - [`WmInterface::detach`] removes the structure again
//!
//! [`SoarWme`] tracks a single constant; [`tree`] synchronizes a whole nested
//! input specification.

pub mod tree;
pub mod wme;

pub use tree::{
    InputNode, InputTree, TableEntry, WmeTable, remove_tree_from_wm, update_wm_from_tree,
};
pub use wme::SoarWme;

use crate::error::WmResult;
use crate::wm::{Handle, WorkingMemory};

/// A structure that can be added to, updated in, and removed from working memory.
///
/// Implementors provide the three `*_impl` hooks and report whether they are
/// currently in working memory. The provided methods guard the hooks:
/// attaching twice removes the old structure first, and syncing or detaching
/// a structure that is not attached does nothing.
pub trait WmInterface {
    /// Whether the structure is currently in working memory.
    fn is_added(&self) -> bool;

    fn add_to_wm_impl(&mut self, wm: &mut dyn WorkingMemory, parent: &Handle) -> WmResult<()>;

    fn update_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()>;

    fn remove_from_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()>;

    /// Create the structure under `parent`, replacing any earlier copy.
    fn attach(&mut self, wm: &mut dyn WorkingMemory, parent: &Handle) -> WmResult<()> {
        if self.is_added() {
            self.remove_from_wm_impl(wm)?;
        }
        self.add_to_wm_impl(wm, parent)
    }

    /// Push local changes; no-op when not attached.
    fn sync(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        if !self.is_added() {
            return Ok(());
        }
        self.update_wm_impl(wm)
    }

    /// Remove the structure; no-op when not attached.
    fn detach(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        if !self.is_added() {
            return Ok(());
        }
        self.remove_from_wm_impl(wm)
    }
}
