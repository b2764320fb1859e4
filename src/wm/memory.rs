//! In-memory working memory backed by `petgraph`.
//!
//! Nodes are identifiers or constants; edges are WMEs carrying their attribute
//! and a monotonically increasing timetag. Identifiers get runtime-style
//! symbols (first letter of the attribute, upper-cased, plus a per-letter
//! counter). Removing a WME garbage-collects everything that is no longer
//! reachable from the root state `S1`.
//!
//! A store built with [`MemoryStore::with_journal`] records every successful
//! mutation so hosts (and tests) can see exactly which store calls a wrapper
//! issued. The default store keeps no journal and runs in bounded memory.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{Dfs, EdgeRef};

use crate::error::{StoreError, WmResult};
use crate::value::WmValue;

use super::{ChildValue, ChildWme, Handle, WmRead, WorkingMemory};

/// Node weight: what a graph node holds.
#[derive(Debug, Clone)]
enum Element {
    Identifier(String),
    Constant(WmValue),
    Untyped { value_type: String, text: String },
}

/// Edge weight: one WME.
#[derive(Debug, Clone)]
struct WmeEdge {
    attribute: String,
    timetag: u64,
}

/// One change applied to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WmChange {
    CreateId {
        parent: Handle,
        attribute: String,
        id: Handle,
    },
    CreateValue {
        parent: Handle,
        attribute: String,
        value: WmValue,
        wme: Handle,
    },
    Link {
        parent: Handle,
        attribute: String,
        target: Handle,
    },
    Update {
        wme: Handle,
        value: WmValue,
    },
    Destroy {
        wme: Handle,
    },
}

/// Number of journal entries per change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    pub create_id: usize,
    pub create_value: usize,
    pub link: usize,
    pub update: usize,
    pub destroy: usize,
}

enum Resolved {
    Identifier(NodeIndex),
    Wme(EdgeIndex),
}

/// Working memory held entirely in process.
pub struct MemoryStore {
    graph: StableDiGraph<Element, WmeEdge>,
    root: NodeIndex,
    identifiers: HashMap<String, NodeIndex>,
    wmes: HashMap<u64, EdgeIndex>,
    next_timetag: u64,
    symbol_counters: HashMap<char, u64>,
    journal: Option<Vec<WmChange>>,
}

impl MemoryStore {
    /// Create a store containing only the root state `S1`.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Like [`MemoryStore::new`], but every mutation is journaled until
    /// [`MemoryStore::clear_journal`].
    pub fn with_journal() -> Self {
        Self::build(Some(Vec::new()))
    }

    fn build(journal: Option<Vec<WmChange>>) -> Self {
        let mut store = Self {
            graph: StableDiGraph::new(),
            root: NodeIndex::end(),
            identifiers: HashMap::new(),
            wmes: HashMap::new(),
            next_timetag: 1,
            symbol_counters: HashMap::new(),
            journal,
        };
        let symbol = store.allocate_symbol("state");
        store.root = store.graph.add_node(Element::Identifier(symbol.clone()));
        store.identifiers.insert(symbol, store.root);
        store
    }

    /// Handle of the root state.
    pub fn root(&self) -> Handle {
        match &self.graph[self.root] {
            Element::Identifier(sym) => Handle::new(sym.clone()),
            _ => unreachable!("root is always an identifier"),
        }
    }

    /// Add `(parent ^attribute target)` where `target` is an existing identifier.
    ///
    /// This is how shared structure and cycles enter the graph.
    pub fn link(&mut self, parent: &Handle, attribute: &str, target: &Handle) -> WmResult<Handle> {
        let from = self.identifier_node(parent)?;
        let to = self.identifier_node(target)?;
        let wme = self.add_wme(from, to, attribute);
        self.record(WmChange::Link {
            parent: parent.clone(),
            attribute: attribute.to_string(),
            target: target.clone(),
        });
        Ok(wme)
    }

    /// Add a constant whose type is unknown to the crate, e.g. a runtime
    /// value type it has no representation for.
    pub fn add_untyped(
        &mut self,
        parent: &Handle,
        attribute: &str,
        value_type: &str,
        text: &str,
    ) -> WmResult<Handle> {
        let from = self.identifier_node(parent)?;
        let to = self.graph.add_node(Element::Untyped {
            value_type: value_type.to_string(),
            text: text.to_string(),
        });
        Ok(self.add_wme(from, to, attribute))
    }

    /// Whether the handle names a live identifier or WME.
    pub fn contains(&self, handle: &Handle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Number of live WMEs.
    pub fn wme_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of live identifiers, including the root.
    pub fn identifier_count(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_journaling(&self) -> bool {
        self.journal.is_some()
    }

    /// Changes recorded so far; always empty without a journal.
    pub fn journal(&self) -> &[WmChange] {
        self.journal.as_deref().unwrap_or_default()
    }

    pub fn clear_journal(&mut self) {
        if let Some(journal) = &mut self.journal {
            journal.clear();
        }
    }

    /// Tally of the journal by change kind.
    pub fn counts(&self) -> ChangeCounts {
        let mut counts = ChangeCounts::default();
        for change in self.journal() {
            match change {
                WmChange::CreateId { .. } => counts.create_id += 1,
                WmChange::CreateValue { .. } => counts.create_value += 1,
                WmChange::Link { .. } => counts.link += 1,
                WmChange::Update { .. } => counts.update += 1,
                WmChange::Destroy { .. } => counts.destroy += 1,
            }
        }
        counts
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn record(&mut self, change: WmChange) {
        if let Some(journal) = &mut self.journal {
            journal.push(change);
        }
    }

    fn allocate_symbol(&mut self, attribute: &str) -> String {
        let letter = attribute
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('I');
        let counter = self.symbol_counters.entry(letter).or_insert(0);
        *counter += 1;
        format!("{letter}{counter}")
    }

    fn add_wme(&mut self, from: NodeIndex, to: NodeIndex, attribute: &str) -> Handle {
        let timetag = self.next_timetag;
        self.next_timetag += 1;
        let edge = self.graph.add_edge(
            from,
            to,
            WmeEdge {
                attribute: attribute.to_string(),
                timetag,
            },
        );
        self.wmes.insert(timetag, edge);
        wme_handle(timetag)
    }

    fn resolve(&self, handle: &Handle) -> Result<Resolved, StoreError> {
        let unknown = || StoreError::UnknownHandle {
            handle: handle.to_string(),
        };
        match handle.as_str().strip_prefix('@') {
            Some(tag) => {
                let timetag: u64 = tag.parse().map_err(|_| unknown())?;
                self.wmes
                    .get(&timetag)
                    .copied()
                    .map(Resolved::Wme)
                    .ok_or_else(unknown)
            }
            None => self
                .identifiers
                .get(handle.as_str())
                .copied()
                .map(Resolved::Identifier)
                .ok_or_else(unknown),
        }
    }

    fn identifier_node(&self, handle: &Handle) -> Result<NodeIndex, StoreError> {
        match self.resolve(handle)? {
            Resolved::Identifier(node) => Ok(node),
            Resolved::Wme(edge) => {
                // A WME handle is accepted as a parent when its value is an identifier.
                let (_, target) = self.graph.edge_endpoints(edge).ok_or_else(|| {
                    StoreError::UnknownHandle {
                        handle: handle.to_string(),
                    }
                })?;
                match self.graph[target] {
                    Element::Identifier(_) => Ok(target),
                    _ => Err(StoreError::NotAnIdentifier {
                        handle: handle.to_string(),
                    }),
                }
            }
        }
    }

    fn remove_edge(&mut self, edge: EdgeIndex) {
        if let Some(weight) = self.graph.remove_edge(edge) {
            self.wmes.remove(&weight.timetag);
        }
    }

    /// Drop every node not reachable from the root.
    fn collect_garbage(&mut self) {
        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, self.root);
        while let Some(node) = dfs.next(&self.graph) {
            reachable.insert(node);
        }
        let dead: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| !reachable.contains(n))
            .collect();
        if dead.is_empty() {
            return;
        }
        for node in &dead {
            if let Some(Element::Identifier(sym)) = self.graph.remove_node(*node) {
                self.identifiers.remove(&sym);
            }
        }
        let graph = &self.graph;
        self.wmes.retain(|timetag, edge| {
            graph
                .edge_weight(*edge)
                .is_some_and(|w| w.timetag == *timetag)
        });
        tracing::trace!(removed = dead.len(), "working memory garbage collected");
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn wme_handle(timetag: u64) -> Handle {
    Handle::new(format!("@{timetag}"))
}

impl WmRead for MemoryStore {
    fn children(&self, id: &Handle) -> WmResult<Vec<ChildWme>> {
        let node = self.identifier_node(id)?;
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .collect();
        // petgraph yields newest edges first; the runtime lists WMEs oldest first.
        edges.sort_by_key(|e| e.weight().timetag);
        Ok(edges
            .into_iter()
            .map(|e| {
                let value = match &self.graph[e.target()] {
                    Element::Identifier(sym) => ChildValue::Identifier(Handle::new(sym.clone())),
                    Element::Constant(v) => ChildValue::Scalar(v.clone()),
                    Element::Untyped { value_type, text } => ChildValue::Untyped {
                        value_type: value_type.clone(),
                        text: text.clone(),
                    },
                };
                ChildWme::new(e.weight().attribute.clone(), value)
            })
            .collect())
    }

    fn symbol_of(&self, id: &Handle) -> String {
        match self.identifier_node(id) {
            Ok(node) => match &self.graph[node] {
                Element::Identifier(sym) => sym.clone(),
                _ => id.to_string(),
            },
            Err(_) => id.to_string(),
        }
    }
}

impl WorkingMemory for MemoryStore {
    fn create_id_wme(&mut self, parent: &Handle, attribute: &str) -> WmResult<Handle> {
        let from = self.identifier_node(parent)?;
        let symbol = self.allocate_symbol(attribute);
        let to = self.graph.add_node(Element::Identifier(symbol.clone()));
        self.identifiers.insert(symbol.clone(), to);
        self.add_wme(from, to, attribute);

        let id = Handle::new(symbol);
        tracing::trace!(%parent, attribute, %id, "create id wme");
        self.record(WmChange::CreateId {
            parent: parent.clone(),
            attribute: attribute.to_string(),
            id: id.clone(),
        });
        Ok(id)
    }

    fn create_value_wme(
        &mut self,
        parent: &Handle,
        attribute: &str,
        value: &WmValue,
    ) -> WmResult<Handle> {
        let from = self.identifier_node(parent)?;
        let to = self.graph.add_node(Element::Constant(value.clone()));
        let wme = self.add_wme(from, to, attribute);

        tracing::trace!(%parent, attribute, %value, %wme, "create value wme");
        self.record(WmChange::CreateValue {
            parent: parent.clone(),
            attribute: attribute.to_string(),
            value: value.clone(),
            wme: wme.clone(),
        });
        Ok(wme)
    }

    fn update_value(&mut self, wme: &Handle, value: &WmValue) -> WmResult<()> {
        let edge = match self.resolve(wme)? {
            Resolved::Wme(edge) => edge,
            Resolved::Identifier(_) => {
                return Err(StoreError::NotAValue {
                    handle: wme.to_string(),
                }
                .into());
            }
        };
        let target = self
            .graph
            .edge_endpoints(edge)
            .map(|(_, t)| t)
            .ok_or_else(|| StoreError::UnknownHandle {
                handle: wme.to_string(),
            })?;
        match &mut self.graph[target] {
            Element::Constant(current) => {
                if current.kind() != value.kind() {
                    return Err(StoreError::KindMismatch {
                        handle: wme.to_string(),
                        expected: current.kind(),
                        actual: value.kind(),
                    }
                    .into());
                }
                *current = value.clone();
            }
            _ => {
                return Err(StoreError::NotAValue {
                    handle: wme.to_string(),
                }
                .into());
            }
        }

        tracing::trace!(%wme, %value, "update value wme");
        self.record(WmChange::Update {
            wme: wme.clone(),
            value: value.clone(),
        });
        Ok(())
    }

    fn destroy_wme(&mut self, wme: &Handle) -> WmResult<()> {
        match self.resolve(wme)? {
            Resolved::Wme(edge) => self.remove_edge(edge),
            Resolved::Identifier(node) => {
                let incoming: Vec<EdgeIndex> = self
                    .graph
                    .edges_directed(node, Direction::Incoming)
                    .map(|e| e.id())
                    .collect();
                for edge in incoming {
                    self.remove_edge(edge);
                }
            }
        }
        self.collect_garbage();

        tracing::trace!(%wme, "destroy wme");
        self.record(WmChange::Destroy { wme: wme.clone() });
        Ok(())
    }
}
