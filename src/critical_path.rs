//! Critical branch marking
//!
//! A node is critical when it is at least half as heavy as the heaviest of
//! its siblings, and its parent is critical too (the root set is the first
//! sibling group). The result is one or more heavy paths from the roots
//! towards the leaves, where most of the memory sits.
//!
//! ```text
//! NIL
//! ├─ a (900)   critical   (max of group)
//! │  ├─ c (500) critical
//! │  └─ d (200)
//! └─ b (450)   critical   (450 >= 0.5 × 900)
//! ```
//!
//! Marking is idempotent: a node that is already critical is not expanded
//! again, so repeated runs produce the same set.

use crate::graph::{MemoryGraph, NodeId};
use tracing::debug;

/// Fraction of the heaviest sibling a node must reach to be critical
pub const CRITICAL_RATIO: f64 = 0.5;

/// Mark critical nodes; requires attributed subtree sizes
///
/// Returns the number of nodes newly marked.
pub fn mark_critical(graph: &mut MemoryGraph) -> usize {
    let mut marked = 0;
    let mut groups: Vec<Vec<NodeId>> = vec![graph.roots().to_vec()];

    while let Some(group) = groups.pop() {
        let heaviest = group
            .iter()
            .map(|&id| graph.node_at(id).subtree_size)
            .fold(f64::NEG_INFINITY, f64::max);

        for id in group {
            let node = graph.node_at_mut(id);
            if node.subtree_size < CRITICAL_RATIO * heaviest || node.critical {
                continue;
            }
            node.critical = true;
            marked += 1;
            groups.push(node.children.iter().map(|c| c.node).collect());
        }
    }

    debug!("Marked {} critical nodes", marked);
    marked
}

/// Clear every critical flag
pub fn clear_critical(graph: &mut MemoryGraph) {
    for node in graph.nodes_mut() {
        node.critical = false;
    }
}

/// Number of nodes currently marked critical
pub fn critical_count(graph: &MemoryGraph) -> usize {
    graph.nodes().filter(|n| n.critical).count()
}
