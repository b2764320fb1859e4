//! Working-memory graph snapshots.
//!
//! [`extract_wm_graph`] crawls an identifier's descendants and records them in
//! a [`WmGraph`]: an arena of [`WmNode`]s addressed by [`NodeId`]. Every
//! identifier appears exactly once, so shared structure and cycles show up as
//! repeated [`NodeId`]s rather than copies.
//!
//! A snapshot is never written back to working memory.

pub mod display;
pub mod export;
pub mod extract;

pub use extract::extract_wm_graph;

use std::collections::HashMap;

use crate::value::WmValue;
use crate::wm::Handle;

/// Index of a node inside its [`WmGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The value of one attribute of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Scalar(WmValue),
    Node(NodeId),
    /// Multi-valued attribute, in traversal order.
    List(Vec<GraphValue>),
}

impl GraphValue {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            GraphValue::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&WmValue> {
        match self {
            GraphValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// The values as a slice: a list's items, or the single value itself.
    pub fn iter(&self) -> std::slice::Iter<'_, GraphValue> {
        match self {
            GraphValue::List(items) => items.iter(),
            single => std::slice::from_ref(single).iter(),
        }
    }
}

/// One identifier in a snapshot.
#[derive(Debug, Clone)]
pub struct WmNode {
    handle: Handle,
    symbol: String,
    attributes: Vec<(String, GraphValue)>,
}

impl WmNode {
    fn new(handle: Handle, symbol: String) -> Self {
        Self {
            handle,
            symbol,
            attributes: Vec::new(),
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Attributes in order of first appearance.
    pub fn attributes(&self) -> &[(String, GraphValue)] {
        &self.attributes
    }

    pub fn get(&self, attribute: &str) -> Option<&GraphValue> {
        self.attributes
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, v)| v)
    }

    pub fn is_leaf(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Record one more value for `attribute`: bare on first sight, promoted
    /// to a two-element list on the second, appended after that.
    fn push_value(&mut self, attribute: String, value: GraphValue) {
        let Some(index) = self.attributes.iter().position(|(a, _)| *a == attribute) else {
            self.attributes.push((attribute, value));
            return;
        };
        let slot = &mut self.attributes[index].1;
        if let GraphValue::List(items) = slot {
            items.push(value);
        } else {
            let first = std::mem::replace(slot, GraphValue::List(Vec::new()));
            *slot = GraphValue::List(vec![first, value]);
        }
    }
}

/// An extracted subgraph of working memory.
#[derive(Debug, Clone)]
pub struct WmGraph {
    nodes: Vec<WmNode>,
    by_symbol: HashMap<String, NodeId>,
    root: NodeId,
}

impl WmGraph {
    fn with_root(handle: Handle, symbol: String) -> Self {
        let mut graph = Self {
            nodes: Vec::new(),
            by_symbol: HashMap::new(),
            root: NodeId(0),
        };
        graph.root = graph.insert(handle, symbol);
        graph
    }

    fn insert(&mut self, handle: Handle, symbol: String) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_symbol.insert(symbol.clone(), id);
        self.nodes.push(WmNode::new(handle, symbol));
        id
    }

    fn node_mut(&mut self, id: NodeId) -> &mut WmNode {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &WmNode {
        &self.nodes[id.0]
    }

    pub fn root_node(&self) -> &WmNode {
        self.node(self.root)
    }

    /// Number of distinct identifiers in the snapshot.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &WmNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn node_by_symbol(&self, symbol: &str) -> Option<NodeId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn get(&self, node: NodeId, attribute: &str) -> Option<&GraphValue> {
        self.node(node).get(attribute)
    }

    /// Follow a dotted attribute path such as `"fields.object"` from `node`.
    ///
    /// Every segment but the last must lead to a single identifier.
    pub fn get_path(&self, node: NodeId, path: &str) -> Option<&GraphValue> {
        let mut segments = path.split('.');
        let mut value = self.get(node, segments.next()?)?;
        for segment in segments {
            value = self.get(value.as_node()?, segment)?;
        }
        Some(value)
    }

    /// Scalar value of `(node ^attribute value)` as text.
    pub fn get_str(&self, node: NodeId, attribute: &str) -> Option<String> {
        self.get(node, attribute)?.as_scalar().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> WmNode {
        WmNode::new(Handle::new("P1"), "P1".into())
    }

    fn s(v: &str) -> GraphValue {
        GraphValue::Scalar(WmValue::from(v))
    }

    #[test]
    fn single_value_stays_bare() {
        let mut n = node();
        n.push_value("color".into(), s("red"));
        assert_eq!(n.get("color"), Some(&s("red")));
    }

    #[test]
    fn second_value_promotes_to_list() {
        let mut n = node();
        n.push_value("predicate".into(), s("red"));
        n.push_value("predicate".into(), s("cube"));
        n.push_value("predicate".into(), s("block"));
        assert_eq!(
            n.get("predicate"),
            Some(&GraphValue::List(vec![s("red"), s("cube"), s("block")]))
        );
        assert_eq!(n.attributes().len(), 1);
    }

    #[test]
    fn iter_over_single_and_list() {
        assert_eq!(s("a").iter().count(), 1);
        assert_eq!(GraphValue::List(vec![s("a"), s("b")]).iter().count(), 2);
    }

    #[test]
    fn path_lookup() {
        let mut g = WmGraph::with_root(Handle::new("M1"), "M1".into());
        let fields = g.insert(Handle::new("F1"), "F1".into());
        g.node_mut(fields).push_value("word".into(), s("hello"));
        let root = g.root();
        g.node_mut(root).push_value("fields".into(), GraphValue::Node(fields));

        assert_eq!(g.get_path(root, "fields.word"), Some(&s("hello")));
        assert_eq!(g.get_path(root, "fields.missing"), None);
        assert_eq!(g.get_path(root, "fields.word.deeper"), None);
        assert_eq!(g.node_by_symbol("F1"), Some(fields));
    }
}
