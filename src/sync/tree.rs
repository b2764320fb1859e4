//! Synchronizing a nested input specification into working memory.
//!
//! An [`InputTree`] maps attributes either to a getter (a leaf constant) or to
//! another tree (a sub-identifier). [`update_wm_from_tree`] walks it, creating
//! each identifier and WME the first time its dotted path is seen and
//! reusing it afterwards, so only values that changed are written.
//!
//! Paths that disappear from the tree are *not* pruned. They stay in the
//! [`WmeTable`] (and in working memory) until [`remove_tree_from_wm`] runs.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::{TreeError, WmResult};
use crate::value::WmValue;
use crate::wm::{Handle, WorkingMemory};

use super::{SoarWme, WmInterface};

/// Produces the current value of a leaf.
pub type Getter<'a> = Box<dyn Fn() -> WmValue + 'a>;

/// One entry of an [`InputTree`].
pub enum InputNode<'a> {
    Leaf(Getter<'a>),
    Branch(InputTree<'a>),
}

impl std::fmt::Debug for InputNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputNode::Leaf(_) => f.write_str("Leaf(..)"),
            InputNode::Branch(tree) => f.debug_tuple("Branch").field(tree).finish(),
        }
    }
}

/// Ordered mapping from attribute to leaf getter or sub-tree.
#[derive(Debug, Default)]
pub struct InputTree<'a> {
    entries: Vec<(String, InputNode<'a>)>,
}

impl<'a> InputTree<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a leaf whose value is read from `getter` on every update.
    pub fn leaf<F, V>(mut self, attribute: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> V + 'a,
        V: Into<WmValue>,
    {
        self.insert(attribute, InputNode::Leaf(Box::new(move || getter().into())));
        self
    }

    /// Add a sub-tree under a new identifier.
    pub fn branch(mut self, attribute: impl Into<String>, tree: InputTree<'a>) -> Self {
        self.insert(attribute, InputNode::Branch(tree));
        self
    }

    /// Insert or replace the node for `attribute`, keeping its position.
    pub fn insert(&mut self, attribute: impl Into<String>, node: InputNode<'a>) {
        let attribute = attribute.into();
        match self.entries.iter().position(|(a, _)| *a == attribute) {
            Some(index) => self.entries[index].1 = node,
            None => self.entries.push((attribute, node)),
        }
    }

    pub fn remove(&mut self, attribute: &str) -> Option<InputNode<'a>> {
        let index = self.entries.iter().position(|(a, _)| a == attribute)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputNode<'a>)> {
        self.entries.iter().map(|(a, n)| (a.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the table remembers for one dotted path.
#[derive(Debug, Clone)]
pub enum TableEntry {
    /// An intermediate identifier.
    Structure(Handle),
    /// A leaf constant.
    Leaf(SoarWme),
}

impl TableEntry {
    fn shape(&self) -> &'static str {
        match self {
            TableEntry::Structure(_) => "sub-tree",
            TableEntry::Leaf(_) => "leaf",
        }
    }
}

/// Identifiers and WMEs created by [`update_wm_from_tree`], keyed by dotted path.
#[derive(Debug, Clone, Default)]
pub struct WmeTable {
    entries: BTreeMap<String, TableEntry>,
}

impl WmeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&TableEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// The tracked WME at `path`, if that path is a leaf.
    pub fn leaf(&self, path: &str) -> Option<&SoarWme> {
        match self.entries.get(path)? {
            TableEntry::Leaf(wme) => Some(wme),
            TableEntry::Structure(_) => None,
        }
    }

    /// The identifier at `path`, if that path is a sub-tree.
    pub fn structure(&self, path: &str) -> Option<&Handle> {
        match self.entries.get(path)? {
            TableEntry::Structure(h) => Some(h),
            TableEntry::Leaf(_) => None,
        }
    }

    /// All paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bring the subtree under `root` in line with `tree`.
///
/// `root_name` prefixes every path recorded in `table` (pass `""` for bare
/// attribute paths). For each sub-tree the identifier at its path is reused or
/// created and the walk recurses into it. For each leaf the getter is called,
/// the tracked WME is created on first sight and synced otherwise, so every
/// call flushes the current values.
///
/// Fails fast on an empty or dotted attribute and on a path that changes
/// between leaf and sub-tree.
pub fn update_wm_from_tree(
    wm: &mut dyn WorkingMemory,
    root: &Handle,
    root_name: &str,
    tree: &InputTree<'_>,
    table: &mut WmeTable,
) -> WmResult<()> {
    for (attribute, node) in tree.iter() {
        if attribute.is_empty() || attribute.contains('.') {
            return Err(TreeError::InvalidAttribute {
                path: root_name.to_string(),
                attribute: attribute.to_string(),
            }
            .into());
        }
        let path = if root_name.is_empty() {
            attribute.to_string()
        } else {
            format!("{root_name}.{attribute}")
        };

        match node {
            InputNode::Branch(sub) => {
                let child = match table.entries.get(&path) {
                    Some(TableEntry::Structure(h)) => h.clone(),
                    Some(other) => {
                        return Err(TreeError::ShapeMismatch {
                            path,
                            previous: other.shape(),
                            current: "sub-tree",
                        }
                        .into());
                    }
                    None => {
                        let h = wm.create_id_wme(root, attribute)?;
                        table
                            .entries
                            .insert(path.clone(), TableEntry::Structure(h.clone()));
                        h
                    }
                };
                update_wm_from_tree(wm, &child, &path, sub, table)?;
            }
            InputNode::Leaf(getter) => {
                let value = getter();
                match table.entries.entry(path) {
                    Entry::Occupied(slot) => {
                        let path = slot.key().clone();
                        match slot.into_mut() {
                            TableEntry::Leaf(wme) => {
                                wme.set_value(value)?;
                                if wme.is_added() {
                                    wme.sync(wm)?;
                                } else {
                                    wme.attach(wm, root)?;
                                }
                            }
                            other => {
                                return Err(TreeError::ShapeMismatch {
                                    path,
                                    previous: other.shape(),
                                    current: "leaf",
                                }
                                .into());
                            }
                        }
                    }
                    Entry::Vacant(slot) => {
                        let mut wme = SoarWme::new(attribute, value);
                        wme.attach(wm, root)?;
                        slot.insert(TableEntry::Leaf(wme));
                    }
                }
            }
        }
    }

    tracing::trace!(root = %root, root_name, tracked = table.len(), "input tree synchronized");
    Ok(())
}

/// Remove every leaf recorded in `table` from working memory and empty it.
///
/// Leaves are detached one by one. Intermediate identifiers are dropped from
/// the table without a store call: they go away with their parent, or the
/// caller removes them. A leaf that is already gone from working memory
/// counts as removed. The table is emptied even when a detach fails; the
/// first failure is returned after every leaf has been tried.
pub fn remove_tree_from_wm(wm: &mut dyn WorkingMemory, table: &mut WmeTable) -> WmResult<()> {
    let mut first_error = None;
    for entry in table.entries.values_mut() {
        if let TableEntry::Leaf(wme) = entry {
            if let Err(e) = wme.detach(wm) {
                tracing::warn!(attribute = wme.attribute(), error = %e, "failed to detach input leaf");
                first_error.get_or_insert(e);
            }
        }
    }
    tracing::debug!(removed = table.len(), "input tree removed from working memory");
    table.entries.clear();
    first_error.map_or(Ok(()), Err)
}
