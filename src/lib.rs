//! dump2dot - heap dump ownership graphs with shared-size attribution
//!
//! This library imports the line-oriented object dumps written by the
//! runtime's memory dumper, resolves which referrer owns each object,
//! apportions shared subtrees among their owners, marks the heavy
//! (critical) branches and exports the result as DOT, GML or GraphML.
//!
//! ```
//! use dump2dot::{attribution, critical_path, graph::MemoryGraph};
//!
//! let dump = "0x1,nil,24,100,,root\n0x2,0x1,24,50,child_of,leaf\n";
//! let (mut graph, _report) = MemoryGraph::from_reader(dump.as_bytes()).unwrap();
//! attribution::attribute(&mut graph);
//! critical_path::mark_critical(&mut graph);
//! assert_eq!(graph.total_size(), 150.0);
//! ```

pub mod attribution;
pub mod cli;
pub mod config;
pub mod critical_path;
pub mod error;
pub mod export;
pub mod graph;
pub mod interner;
pub mod kinds;
pub mod record;
pub mod selector;
pub mod summary;
