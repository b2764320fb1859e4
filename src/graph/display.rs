//! Human-readable rendering of a [`WmGraph`].
//!
//! ```text
//! <O1> {
//!   id: 5
//!   volume: 23.3
//!   predicates: <P1> {
//!     predicate: [ red, cube, block ]
//!   }
//! }
//! ```
//!
//! Each identifier is expanded once; later references print as `<SYM>`, as do
//! identifiers with no attributes.

use std::collections::HashSet;
use std::fmt::{self, Write};

use super::{GraphValue, NodeId, WmGraph};

/// Displays a graph starting from its root.
pub struct GraphDisplay<'a> {
    graph: &'a WmGraph,
    start: NodeId,
}

impl WmGraph {
    /// Pretty-printer rooted at the snapshot's root.
    pub fn display(&self) -> GraphDisplay<'_> {
        self.display_from(self.root())
    }

    /// Pretty-printer rooted at an arbitrary node.
    pub fn display_from(&self, start: NodeId) -> GraphDisplay<'_> {
        GraphDisplay { graph: self, start }
    }
}

impl fmt::Display for GraphDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_graph(f, self.graph, self.start)
    }
}

/// Pending output, popped in order.
enum Step<'a> {
    Text(&'static str),
    Attribute { name: &'a str, depth: usize },
    Value { value: &'a GraphValue, depth: usize },
    Close { depth: usize },
}

/// Render with an explicit stack so chains of any length fit on the call stack.
fn write_graph(f: &mut impl Write, graph: &WmGraph, start: NodeId) -> fmt::Result {
    let mut seen = HashSet::new();
    let root = GraphValue::Node(start);
    let mut stack = vec![Step::Value {
        value: &root,
        depth: 0,
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => f.write_str(text)?,
            Step::Attribute { name, depth } => {
                indent(f, depth)?;
                write!(f, "{name}: ")?;
            }
            Step::Close { depth } => {
                indent(f, depth)?;
                f.write_char('}')?;
            }
            Step::Value {
                value: GraphValue::Scalar(v),
                ..
            } => write!(f, "{v}")?,
            Step::Value {
                value: GraphValue::List(items),
                depth,
            } => {
                f.write_str("[ ")?;
                stack.push(Step::Text(" ]"));
                for (i, item) in items.iter().enumerate().rev() {
                    stack.push(Step::Value { value: item, depth });
                    if i > 0 {
                        stack.push(Step::Text(", "));
                    }
                }
            }
            Step::Value {
                value: GraphValue::Node(id),
                depth,
            } => {
                let node = graph.node(*id);
                if !seen.insert(*id) || node.is_leaf() {
                    write!(f, "<{}>", node.symbol())?;
                    continue;
                }
                writeln!(f, "<{}> {{", node.symbol())?;
                stack.push(Step::Close { depth });
                for (name, value) in node.attributes().iter().rev() {
                    stack.push(Step::Text("\n"));
                    stack.push(Step::Value {
                        value,
                        depth: depth + 1,
                    });
                    stack.push(Step::Attribute {
                        name,
                        depth: depth + 1,
                    });
                }
            }
        }
    }
    Ok(())
}

fn indent(f: &mut impl Write, depth: usize) -> fmt::Result {
    const SPACES: &str = "                                                                ";
    let mut width = depth * 2;
    while width > 0 {
        let chunk = width.min(SPACES.len());
        f.write_str(&SPACES[..chunk])?;
        width -= chunk;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::graph::extract_wm_graph;
    use crate::value::WmValue;
    use crate::wm::WorkingMemory;
    use crate::wm::memory::MemoryStore;

    #[test]
    fn renders_nested_structure() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let obj = wm.create_id_wme(&root, "object").unwrap();
        wm.create_value_wme(&obj, "id", &WmValue::Int(5)).unwrap();
        wm.create_value_wme(&obj, "volume", &WmValue::Float(23.3)).unwrap();
        let preds = wm.create_id_wme(&obj, "predicates").unwrap();
        for p in ["red", "cube", "block"] {
            wm.create_value_wme(&preds, "predicate", &WmValue::from(p)).unwrap();
        }

        let g = extract_wm_graph(&wm, &obj, None).unwrap();
        let expected = "<O1> {\n  id: 5\n  volume: 23.3\n  predicates: <P1> {\n    predicate: [ red, cube, block ]\n  }\n}";
        assert_eq!(g.display().to_string(), expected);
    }

    #[test]
    fn repeated_and_empty_identifiers_are_short() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let a = wm.create_id_wme(&root, "a").unwrap();
        wm.create_id_wme(&a, "empty").unwrap();
        wm.link(&a, "me", &a).unwrap();

        let g = extract_wm_graph(&wm, &a, None).unwrap();
        assert_eq!(g.display().to_string(), "<A1> {\n  empty: <E1>\n  me: <A1>\n}");
    }

    /// Counts what a rendering writes without keeping it.
    #[derive(Default)]
    struct Tally {
        bytes: usize,
        lines: usize,
        last: Option<char>,
    }

    impl std::fmt::Write for Tally {
        fn write_str(&mut self, s: &str) -> std::fmt::Result {
            self.bytes += s.len();
            self.lines += s.matches('\n').count();
            if let Some(c) = s.chars().last() {
                self.last = Some(c);
            }
            Ok(())
        }
    }

    #[test]
    fn deep_chain_renders() {
        use std::fmt::Write;

        let mut wm = MemoryStore::new();
        let mut tail = wm.root();
        for _ in 0..10_000 {
            tail = wm.create_id_wme(&tail, "next").unwrap();
        }
        let g = extract_wm_graph(&wm, &wm.root(), None).unwrap();

        let mut tally = Tally::default();
        write!(tally, "{}", g.display()).unwrap();
        // Two lines per expanded identifier; the last one is a leaf.
        assert_eq!(tally.lines, 20_000);
        assert_eq!(tally.last, Some('}'));

        let shallow = g.display_from(g.node_by_symbol("N9998").unwrap()).to_string();
        assert_eq!(shallow, "<N9998> {\n  next: <N9999> {\n    next: <N10000>\n  }\n}");
    }
}
