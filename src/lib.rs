// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # soar-wm
//!
//! Host-side helpers for a cognitive architecture's working memory: mirror
//! structured input into it, and read structured output back out.
//!
//! ## Architecture
//!
//! - **Working memory** (`wm`): the store boundary (`WmRead`, `WorkingMemory`),
//!   an in-memory petgraph store, and attribute queries
//! - **Snapshots** (`graph`): cycle-safe, depth-bounded extraction into an
//!   arena of `WmNode`s, with pretty-printing and JSON export
//! - **Synchronization** (`sync`): tracked scalars (`SoarWme`) and nested
//!   input trees written incrementally, only when values change
//! - **Connectors** (`connector`, `time_info`, `language`): per-cycle input and
//!   output handlers
//! - **Printouts** (`printout`): parse textual WM dumps into a read-only store
//!
//! ## Library usage
//!
//! ```
//! use soar_wm::sync::{InputTree, WmeTable, update_wm_from_tree};
//! use soar_wm::wm::memory::MemoryStore;
//! use soar_wm::graph::extract_wm_graph;
//!
//! let mut wm = MemoryStore::new();
//! let root = wm.root();
//! let mut table = WmeTable::default();
//! let tree = InputTree::new()
//!     .leaf("x", || 3)
//!     .branch("obj", InputTree::new().leaf("name", || "cup"));
//! update_wm_from_tree(&mut wm, &root, "input", &tree, &mut table).unwrap();
//!
//! let graph = extract_wm_graph(&wm, &root, None).unwrap();
//! assert_eq!(graph.get_path(graph.root(), "obj.name").unwrap().as_scalar().unwrap().to_string(), "cup");
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod graph;
pub mod language;
pub mod printout;
pub mod svs;
pub mod sync;
pub mod time_info;
pub mod value;
pub mod wm;
