//! JSON export of a [`WmGraph`].
//!
//! The document is a flat symbol table, so its nesting depth does not grow
//! with the depth of the snapshot:
//!
//! ```json
//! {
//!   "root": "M1",
//!   "nodes": {
//!     "F1": { "n": [2, 2.5], "parent": { "__ref__": "M1" } },
//!     "M1": { "type": "say-sentence", "fields": { "__ref__": "F1" } }
//!   }
//! }
//! ```
//!
//! Every identifier value is written as `{"__ref__": "SYM"}`; cycles and
//! shared structure need no special casing.

use serde_json::{Map, Value};

use super::{GraphValue, WmGraph, WmNode};

pub const ROOT_KEY: &str = "root";
pub const NODES_KEY: &str = "nodes";
pub const REF_KEY: &str = "__ref__";

impl WmGraph {
    /// Export every node of the snapshot, keyed by symbol.
    pub fn to_json(&self) -> Value {
        let nodes: Map<String, Value> = self
            .nodes()
            .map(|(_, node)| (node.symbol().to_string(), node_to_json(self, node)))
            .collect();

        let mut doc = Map::new();
        doc.insert(
            ROOT_KEY.into(),
            Value::String(self.root_node().symbol().to_string()),
        );
        doc.insert(NODES_KEY.into(), Value::Object(nodes));
        Value::Object(doc)
    }
}

fn node_to_json(graph: &WmGraph, node: &WmNode) -> Value {
    let attributes = node
        .attributes()
        .iter()
        .map(|(attribute, value)| (attribute.clone(), value_to_json(graph, value)))
        .collect();
    Value::Object(attributes)
}

fn value_to_json(graph: &WmGraph, value: &GraphValue) -> Value {
    match value {
        GraphValue::Scalar(v) => serde_json::to_value(v).unwrap_or(Value::Null),
        GraphValue::Node(id) => {
            let mut reference = Map::new();
            reference.insert(
                REF_KEY.into(),
                Value::String(graph.node(*id).symbol().to_string()),
            );
            Value::Object(reference)
        }
        // Extraction only builds lists of scalars and nodes.
        GraphValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| value_to_json(graph, item))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graph::extract_wm_graph;
    use crate::value::WmValue;
    use crate::wm::WorkingMemory;
    use crate::wm::memory::MemoryStore;

    #[test]
    fn exports_values_and_references() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let msg = wm.create_id_wme(&root, "message").unwrap();
        wm.create_value_wme(&msg, "type", &WmValue::from("say-sentence")).unwrap();
        let fields = wm.create_id_wme(&msg, "fields").unwrap();
        wm.create_value_wme(&fields, "n", &WmValue::Int(2)).unwrap();
        wm.create_value_wme(&fields, "n", &WmValue::Float(2.5)).unwrap();
        wm.link(&fields, "parent", &msg).unwrap();

        let g = extract_wm_graph(&wm, &msg, None).unwrap();
        assert_eq!(
            g.to_json(),
            json!({
                "root": "M1",
                "nodes": {
                    "M1": {
                        "type": "say-sentence",
                        "fields": { "__ref__": "F1" }
                    },
                    "F1": {
                        "n": [2, 2.5],
                        "parent": { "__ref__": "M1" }
                    }
                }
            })
        );
    }

    #[test]
    fn deep_chain_exports_flat() {
        let mut wm = MemoryStore::new();
        let mut tail = wm.root();
        for _ in 0..10_000 {
            tail = wm.create_id_wme(&tail, "next").unwrap();
        }
        let g = extract_wm_graph(&wm, &wm.root(), None).unwrap();

        let json = g.to_json();
        assert_eq!(json["root"], "S1");
        assert_eq!(json["nodes"].as_object().unwrap().len(), 10_001);
        assert_eq!(json["nodes"]["S1"]["next"]["__ref__"], "N1");
        assert_eq!(json["nodes"]["N9999"]["next"]["__ref__"], "N10000");
        assert_eq!(json["nodes"]["N10000"], json!({}));

        let text = serde_json::to_string(&json).unwrap();
        assert!(text.contains(r#""N10000":{}"#));
    }
}
