//! Depth-bounded, cycle-safe extraction of a working-memory subgraph.

use crate::error::WmResult;
use crate::value::WmValue;
use crate::wm::{ChildValue, ChildWme, Handle, WmRead};

use super::{GraphValue, NodeId, WmGraph};

/// A node whose child WMEs are still being visited.
struct Frame {
    node: NodeId,
    children: std::vec::IntoIter<ChildWme>,
    /// Remaining depth budget of `node`.
    depth: usize,
}

/// Crawl the descendants of `root` into a [`WmGraph`].
///
/// `max_depth` bounds how many identifier hops are followed (`None` for no
/// bound); a depth of zero yields the root with no attributes. Identifiers
/// are keyed by symbol: the first time one is reached it becomes a node and
/// is crawled, every later reference reuses that node. Multi-valued
/// attributes collect into a [`GraphValue::List`] in store order.
///
/// Children are visited depth-first in the order a recursive crawl would
/// visit them, using an explicit stack.
///
/// The crawl is a plain read of the store: if working memory changes while it
/// runs, the result is unspecified.
pub fn extract_wm_graph(
    wm: &(impl WmRead + ?Sized),
    root: &Handle,
    max_depth: Option<usize>,
) -> WmResult<WmGraph> {
    let depth = max_depth.unwrap_or(usize::MAX);
    let mut graph = WmGraph::with_root(root.clone(), wm.symbol_of(root));

    let mut stack = Vec::new();
    if depth > 0 {
        stack.push(Frame {
            node: graph.root(),
            children: wm.children(root)?.into_iter(),
            depth,
        });
    }

    while let Some(frame) = stack.last_mut() {
        let Some(child) = frame.children.next() else {
            stack.pop();
            continue;
        };
        let parent = frame.node;
        let child_depth = frame.depth - 1;

        let mut descend = None;
        let value = match child.value {
            ChildValue::Identifier(handle) => {
                let symbol = wm.symbol_of(&handle);
                match graph.node_by_symbol(&symbol) {
                    Some(existing) => GraphValue::Node(existing),
                    None => {
                        let id = graph.insert(handle.clone(), symbol);
                        if child_depth > 0 {
                            descend = Some((id, handle));
                        }
                        GraphValue::Node(id)
                    }
                }
            }
            ChildValue::Scalar(v) => GraphValue::Scalar(v),
            ChildValue::Untyped { value_type, text } => {
                tracing::trace!(%value_type, attribute = %child.attribute, "untyped value read as string");
                GraphValue::Scalar(WmValue::Str(text))
            }
        };
        graph.node_mut(parent).push_value(child.attribute, value);

        if let Some((node, handle)) = descend {
            let children = wm.children(&handle)?.into_iter();
            stack.push(Frame {
                node,
                children,
                depth: child_depth,
            });
        }
    }

    tracing::debug!(
        root = %graph.root_node().symbol(),
        nodes = graph.len(),
        "extracted working-memory graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::WorkingMemory;
    use crate::wm::memory::MemoryStore;

    /// (<obj> ^id 5 ^volume 23.3 ^predicates <preds>)
    /// (<preds> ^predicate red ^predicate cube ^predicate block)
    fn object_store() -> (MemoryStore, Handle) {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let obj = wm.create_id_wme(&root, "object").unwrap();
        wm.create_value_wme(&obj, "id", &WmValue::Int(5)).unwrap();
        wm.create_value_wme(&obj, "volume", &WmValue::Float(23.3)).unwrap();
        let preds = wm.create_id_wme(&obj, "predicates").unwrap();
        for p in ["red", "cube", "block"] {
            wm.create_value_wme(&preds, "predicate", &WmValue::from(p)).unwrap();
        }
        (wm, obj)
    }

    #[test]
    fn extracts_typed_values_and_lists() {
        let (wm, obj) = object_store();
        let g = extract_wm_graph(&wm, &obj, None).unwrap();
        let root = g.root();

        assert_eq!(g.root_node().symbol(), "O1");
        assert_eq!(g.get(root, "id"), Some(&GraphValue::Scalar(WmValue::Int(5))));
        assert_eq!(
            g.get(root, "volume"),
            Some(&GraphValue::Scalar(WmValue::Float(23.3)))
        );
        let preds: Vec<_> = g
            .get_path(root, "predicates.predicate")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_scalar().and_then(WmValue::as_str))
            .collect();
        assert_eq!(preds, vec!["red", "cube", "block"]);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn depth_zero_is_root_only() {
        let (wm, obj) = object_store();
        let g = extract_wm_graph(&wm, &obj, Some(0)).unwrap();
        assert_eq!(g.len(), 1);
        assert!(g.root_node().is_leaf());
    }

    #[test]
    fn depth_one_stops_at_children() {
        let (wm, obj) = object_store();
        let g = extract_wm_graph(&wm, &obj, Some(1)).unwrap();
        let preds = g.get(g.root(), "predicates").unwrap().as_node().unwrap();
        assert_eq!(g.node(preds).symbol(), "P1");
        assert!(g.node(preds).is_leaf());
        assert_eq!(g.get(g.root(), "id"), Some(&GraphValue::Scalar(WmValue::Int(5))));
    }

    #[test]
    fn self_reference_terminates() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let a = wm.create_id_wme(&root, "a").unwrap();
        wm.link(&a, "self", &a).unwrap();
        let g = extract_wm_graph(&wm, &a, None).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g.get(g.root(), "self"), Some(&GraphValue::Node(g.root())));
    }

    #[test]
    fn cycle_reuses_the_same_node() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let a = wm.create_id_wme(&root, "a").unwrap();
        let b = wm.create_id_wme(&a, "b").unwrap();
        let c = wm.create_id_wme(&b, "c").unwrap();
        wm.link(&c, "back", &a).unwrap();

        let g = extract_wm_graph(&wm, &a, None).unwrap();
        assert_eq!(g.len(), 3);
        let back = g.get_path(g.root(), "b.c.back").unwrap();
        assert_eq!(back, &GraphValue::Node(g.root()));
    }

    #[test]
    fn diamond_shares_one_node() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let top = wm.create_id_wme(&root, "top").unwrap();
        let left = wm.create_id_wme(&top, "left").unwrap();
        let right = wm.create_id_wme(&top, "right").unwrap();
        let bottom = wm.create_id_wme(&left, "bottom").unwrap();
        wm.link(&right, "bottom", &bottom).unwrap();
        wm.create_value_wme(&bottom, "n", &WmValue::Int(1)).unwrap();

        let g = extract_wm_graph(&wm, &top, None).unwrap();
        let via_left = g.get_path(g.root(), "left.bottom").unwrap();
        let via_right = g.get_path(g.root(), "right.bottom").unwrap();
        assert_eq!(via_left, via_right);
        assert_eq!(g.len(), 4);
    }

    #[test]
    fn untyped_values_fall_back_to_strings() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        wm.add_untyped(&root, "blob", "shared-ptr", "0xdead").unwrap();
        let g = extract_wm_graph(&wm, &root, None).unwrap();
        assert_eq!(g.get_str(g.root(), "blob").as_deref(), Some("0xdead"));
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut wm = MemoryStore::new();
        let mut cur = wm.root();
        for _ in 0..10_000 {
            cur = wm.create_id_wme(&cur, "next").unwrap();
        }
        let g = extract_wm_graph(&wm, &wm.root(), None).unwrap();
        assert_eq!(g.len(), 10_001);
    }
}
