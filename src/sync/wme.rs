//! A single constant WME with deferred writes.

use crate::error::{ValueError, WmResult};
use crate::value::{ValueKind, WmValue};
use crate::wm::{Handle, WorkingMemory};

use super::WmInterface;

/// One `(parent ^attribute value)` WME whose value changes over time.
///
/// The value can be changed at any moment; working memory only sees the
/// change when [`sync`](WmInterface::sync) runs. The value's kind is fixed at
/// construction.
///
/// Invariant: `handle` is `Some` exactly while the WME is attached.
#[derive(Debug, Clone)]
pub struct SoarWme {
    attribute: String,
    value: WmValue,
    kind: ValueKind,
    handle: Option<Handle>,
    dirty: bool,
}

impl SoarWme {
    /// A detached WME; nothing is written until [`attach`](WmInterface::attach).
    pub fn new(attribute: impl Into<String>, value: impl Into<WmValue>) -> Self {
        let value = value.into();
        Self {
            attribute: attribute.into(),
            kind: value.kind(),
            value,
            handle: None,
            dirty: false,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> &WmValue {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The store's handle for the WME while attached.
    pub fn handle(&self) -> Option<&Handle> {
        self.handle.as_ref()
    }

    /// Whether the local value differs from what was last written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Change the local value. Equal values are ignored; a value of another
    /// kind is rejected. Working memory is not touched.
    pub fn set_value(&mut self, value: impl Into<WmValue>) -> WmResult<()> {
        let value = value.into();
        if value.kind() != self.kind {
            return Err(ValueError::KindMismatch {
                attribute: self.attribute.clone(),
                expected: self.kind,
                actual: value.kind(),
            }
            .into());
        }
        if value != self.value {
            self.value = value;
            self.dirty = true;
        }
        Ok(())
    }
}

impl WmInterface for SoarWme {
    fn is_added(&self) -> bool {
        self.handle.is_some()
    }

    fn add_to_wm_impl(&mut self, wm: &mut dyn WorkingMemory, parent: &Handle) -> WmResult<()> {
        let handle = wm.create_value_wme(parent, &self.attribute, &self.value)?;
        self.handle = Some(handle);
        self.dirty = false;
        Ok(())
    }

    fn update_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(handle) = &self.handle {
            wm.update_value(handle, &self.value)?;
            self.dirty = false;
        }
        Ok(())
    }

    fn remove_from_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        match wm.destroy_wme(&handle) {
            Err(e) if e.is_unknown_handle() => {
                tracing::debug!(%handle, attribute = %self.attribute, "WME already gone from working memory");
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::memory::{ChangeCounts, MemoryStore, WmChange};
    use crate::wm::query::WmQuery;

    fn store() -> (MemoryStore, Handle) {
        let wm = MemoryStore::with_journal();
        let root = wm.root();
        (wm, root)
    }

    #[test]
    fn attach_creates_once() {
        let (mut wm, root) = store();
        let mut wme = SoarWme::new("count", 3);
        assert!(!wme.is_added());
        wme.attach(&mut wm, &root).unwrap();
        assert!(wme.is_added());
        assert!(wme.handle().is_some());
        assert_eq!(wm.child_int(&root, "count").unwrap(), Some(3));
        assert_eq!(wm.counts().create_value, 1);
    }

    #[test]
    fn sync_without_change_is_silent() {
        let (mut wm, root) = store();
        let mut wme = SoarWme::new("count", 3);
        wme.attach(&mut wm, &root).unwrap();
        wm.clear_journal();
        wme.sync(&mut wm).unwrap();
        assert!(wm.journal().is_empty());
    }

    #[test]
    fn setting_same_value_stays_clean() {
        let (mut wm, root) = store();
        let mut wme = SoarWme::new("name", "box");
        wme.attach(&mut wm, &root).unwrap();
        wme.set_value("box").unwrap();
        wme.set_value("box").unwrap();
        assert!(!wme.is_dirty());
        wm.clear_journal();
        wme.sync(&mut wm).unwrap();
        assert_eq!(wm.counts(), ChangeCounts::default());
    }

    #[test]
    fn last_value_wins_on_sync() {
        let (mut wm, root) = store();
        let mut wme = SoarWme::new("x", 1.0);
        wme.attach(&mut wm, &root).unwrap();
        wm.clear_journal();

        wme.set_value(2.0).unwrap();
        wme.set_value(3.5).unwrap();
        assert!(wme.is_dirty());
        wme.sync(&mut wm).unwrap();

        let handle = wme.handle().unwrap().clone();
        assert_eq!(
            wm.journal(),
            &[WmChange::Update {
                wme: handle,
                value: WmValue::Float(3.5),
            }]
        );
        assert!(!wme.is_dirty());
        assert_eq!(wm.child_float(&root, "x").unwrap(), Some(3.5));

        wme.sync(&mut wm).unwrap();
        assert_eq!(wm.counts().update, 1);
    }

    #[test]
    fn detached_operations_are_noops() {
        let (mut wm, _) = store();
        let mut wme = SoarWme::new("x", 1);
        wme.set_value(2).unwrap();
        wme.sync(&mut wm).unwrap();
        wme.detach(&mut wm).unwrap();
        assert!(wm.journal().is_empty());
        assert!(wme.is_dirty());
    }

    #[test]
    fn detach_removes_and_clears_handle() {
        let (mut wm, root) = store();
        let mut wme = SoarWme::new("x", 1);
        wme.attach(&mut wm, &root).unwrap();
        wme.detach(&mut wm).unwrap();
        assert!(!wme.is_added());
        assert!(wme.handle().is_none());
        assert_eq!(wm.child_int(&root, "x").unwrap(), None);
        assert_eq!(wm.counts().destroy, 1);

        wme.detach(&mut wm).unwrap();
        assert_eq!(wm.counts().destroy, 1);
    }

    #[test]
    fn detach_after_parent_removed_is_ok() {
        let (mut wm, root) = store();
        let parent = wm.create_id_wme(&root, "obj").unwrap();
        let mut wme = SoarWme::new("x", 1);
        wme.attach(&mut wm, &parent).unwrap();
        wm.destroy_wme(&parent).unwrap();

        wme.detach(&mut wm).unwrap();
        assert!(!wme.is_added());
    }

    #[test]
    fn reattach_replaces_old_wme() {
        let (mut wm, root) = store();
        let other = wm.create_id_wme(&root, "other").unwrap();
        let mut wme = SoarWme::new("x", 1);
        wme.attach(&mut wm, &root).unwrap();
        wme.set_value(5).unwrap();
        wme.attach(&mut wm, &other).unwrap();

        assert_eq!(wm.child_int(&root, "x").unwrap(), None);
        assert_eq!(wm.child_int(&other, "x").unwrap(), Some(5));
        assert!(!wme.is_dirty());
        let counts = wm.counts();
        assert_eq!(counts.create_value, 2);
        assert_eq!(counts.destroy, 1);
    }

    #[test]
    fn kind_change_is_rejected() {
        let mut wme = SoarWme::new("steps", 0);
        let err = wme.set_value("zero").unwrap_err();
        assert!(matches!(
            err,
            crate::error::WmError::Value(ValueError::KindMismatch { .. })
        ));
        assert_eq!(wme.value(), &WmValue::Int(0));
        assert!(!wme.is_dirty());
    }
}
