//! Shared-ownership size attribution
//!
//! Sizes are attributed in two depth-first passes over the forest reachable
//! from the roots:
//!
//! 1. **Owner counting**: each tree edge `parent -> child` adds one owner to
//!    `child`, unless `child` is on the active path (a back edge closing a
//!    cycle).
//! 2. **Size propagation**: `subtree = self + Σ child.subtree / child.owners`
//!    over the same non-back edges.
//!
//! Both passes walk the graph identically (same roots, same child order,
//! every node expanded at most once), so a back edge in pass 1 is a back
//! edge in pass 2. The walk uses an explicit stack; dump graphs can be
//! arbitrarily deep.
//!
//! # Example
//!
//! ```text
//! root (100)
//! ├─ a (40) ──┐
//! └─ b (40) ──┴─ shared (20)
//!
//! shared: owners = 2, subtree = 20
//! a, b:   subtree = 40 + 20/2 = 50
//! root:   subtree = 100 + 50 + 50 = 200
//! ```

use crate::graph::{MemoryGraph, NodeId};
use tracing::info;

/// Callbacks for [`walk_forest`]
trait ForestVisitor {
    /// A non-back tree edge. `fresh` is true when `child` is expanded now,
    /// false when it was fully expanded earlier.
    fn tree_edge(&mut self, parent: NodeId, child: NodeId, fresh: bool);

    /// All of `node`'s children are done; `dfs_parent` expanded it
    fn finished(&mut self, node: NodeId, dfs_parent: Option<NodeId>);
}

#[derive(Clone, Copy)]
struct Frame {
    node: NodeId,
    next_child: usize,
}

/// Depth-first walk from every root with cycle guarding by active path
fn walk_forest<V: ForestVisitor>(graph: &MemoryGraph, visitor: &mut V) {
    let mut expanded = vec![false; graph.len()];
    let mut on_path = vec![false; graph.len()];
    let mut stack: Vec<Frame> = Vec::new();

    for &root in graph.roots() {
        if expanded[root.index()] {
            continue;
        }
        expanded[root.index()] = true;
        on_path[root.index()] = true;
        stack.push(Frame {
            node: root,
            next_child: 0,
        });

        while let Some(&Frame { node, next_child }) = stack.last() {
            let top = stack.len() - 1;
            match graph.node_at(node).children.get(next_child) {
                Some(link) => {
                    stack[top].next_child += 1;
                    let child = link.node;
                    if on_path[child.index()] {
                        continue;
                    }
                    let fresh = !expanded[child.index()];
                    visitor.tree_edge(node, child, fresh);
                    if fresh {
                        expanded[child.index()] = true;
                        on_path[child.index()] = true;
                        stack.push(Frame {
                            node: child,
                            next_child: 0,
                        });
                    }
                }
                None => {
                    stack.pop();
                    on_path[node.index()] = false;
                    let parent = stack.last().map(|f| f.node);
                    visitor.finished(node, parent);
                }
            }
        }
    }
}

struct OwnerCounter {
    owners: Vec<u32>,
}

impl ForestVisitor for OwnerCounter {
    fn tree_edge(&mut self, _parent: NodeId, child: NodeId, _fresh: bool) {
        self.owners[child.index()] += 1;
    }

    fn finished(&mut self, _node: NodeId, _dfs_parent: Option<NodeId>) {}
}

struct SizePropagator<'a> {
    owners: &'a [u32],
    sizes: Vec<f64>,
}

impl SizePropagator<'_> {
    fn share(&self, node: NodeId) -> f64 {
        self.sizes[node.index()] / f64::from(self.owners[node.index()].max(1))
    }
}

impl ForestVisitor for SizePropagator<'_> {
    fn tree_edge(&mut self, parent: NodeId, child: NodeId, fresh: bool) {
        // a fresh child reports to its parent when it finishes
        if !fresh {
            let share = self.share(child);
            self.sizes[parent.index()] += share;
        }
    }

    fn finished(&mut self, node: NodeId, dfs_parent: Option<NodeId>) {
        if let Some(parent) = dfs_parent {
            let share = self.share(node);
            self.sizes[parent.index()] += share;
        }
    }
}

/// Pass 1: count the tree parents claiming each reachable node
pub fn count_owners(graph: &mut MemoryGraph) {
    let mut counter = OwnerCounter {
        owners: vec![0; graph.len()],
    };
    walk_forest(graph, &mut counter);
    for (node, owners) in graph.nodes_mut().zip(counter.owners) {
        node.owner_count = owners;
    }
}

/// Pass 2: recompute subtree sizes from the owner counts of pass 1
///
/// Returns the total graph size (sum of root subtree sizes). Nodes not
/// reachable from any root keep their own size as subtree size.
pub fn propagate_sizes(graph: &mut MemoryGraph) -> f64 {
    let owners: Vec<u32> = graph.nodes().map(|n| n.owner_count).collect();
    let mut propagator = SizePropagator {
        owners: &owners,
        sizes: graph.nodes().map(|n| n.self_size as f64).collect(),
    };
    walk_forest(graph, &mut propagator);
    let sizes = propagator.sizes;

    let total = graph
        .roots()
        .iter()
        .fold(0.0, |acc, r| acc + sizes[r.index()]);
    for (node, size) in graph.nodes_mut().zip(sizes) {
        node.subtree_size = size;
    }
    graph.set_total_size(total);
    total
}

/// Run both passes and return the total graph size
pub fn attribute(graph: &mut MemoryGraph) -> f64 {
    count_owners(graph);
    let total = propagate_sizes(graph);
    info!(
        "Attributed {:.0} bytes across {} nodes ({} roots)",
        total,
        graph.len(),
        graph.roots().len()
    );
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributed(dump: &str) -> MemoryGraph {
        let (mut graph, _) = MemoryGraph::from_reader(dump.as_bytes()).unwrap();
        attribute(&mut graph);
        graph
    }

    fn subtree(graph: &MemoryGraph, label: u64) -> f64 {
        graph.node(label).unwrap().subtree_size
    }

    #[test]
    fn test_worked_example_sizes() {
        let graph = attributed(
            "0x1,nil,24,100,,root\n0x2,0x1,24,50,child_of,leaf1\n0x3,0x1,24,50,child_of,leaf2\n",
        );
        assert_eq!(subtree(&graph, 1), 200.0);
        assert_eq!(subtree(&graph, 2), 50.0);
        assert_eq!(subtree(&graph, 3), 50.0);
        assert_eq!(graph.total_size(), 200.0);
    }

    #[test]
    fn test_shared_child_split_between_owners() {
        let graph = attributed(
            "0x1,nil,24,100,,root\n\
             0xa,0x1,24,40,,a\n\
             0xb,0x1,24,40,,b\n\
             0xc,0xa,24,20,,shared\n\
             0xc,0xb,24,20,,shared\n",
        );
        assert_eq!(graph.node(0xc).unwrap().owner_count, 2);
        assert_eq!(subtree(&graph, 0xc), 20.0);
        assert_eq!(subtree(&graph, 0xa), 50.0);
        assert_eq!(subtree(&graph, 0xb), 50.0);
        assert_eq!(subtree(&graph, 1), 200.0);
        assert_eq!(graph.total_size(), 200.0);
    }

    #[test]
    fn test_shared_subtree_divides_whole_subtree() {
        // x (10) owns y (6); x is shared by p and q
        let graph = attributed(
            "0x1,nil,24,0,,p\n\
             0x2,nil,24,0,,q\n\
             0x10,0x1,24,10,,x\n\
             0x10,0x2,24,10,,x\n\
             0x11,0x10,24,6,,y\n",
        );
        assert_eq!(subtree(&graph, 0x10), 16.0);
        assert_eq!(subtree(&graph, 1), 8.0);
        assert_eq!(subtree(&graph, 2), 8.0);
        assert_eq!(graph.total_size(), 16.0);
    }

    #[test]
    fn test_mutual_cycle_terminates_and_stays_bounded() {
        let graph = attributed(
            "0x1,nil,24,10,,root\n\
             0xa,0x1,24,5,,a\n\
             0xa,0xb,24,5,,a\n\
             0xb,0xa,24,7,,b\n",
        );
        // b -> a is a back edge: a is owned by root and b, but only root counts
        assert_eq!(graph.node(0xa).unwrap().owner_count, 1);
        assert_eq!(subtree(&graph, 0xb), 7.0);
        assert_eq!(subtree(&graph, 0xa), 12.0);
        assert_eq!(graph.total_size(), 22.0);
    }

    #[test]
    fn test_self_referencing_object_is_unreachable() {
        let graph = attributed("0x1,nil,24,10,,root\n0x5,0x5,24,7,,selfref\n");
        assert_eq!(graph.total_size(), 10.0);
        assert_eq!(subtree(&graph, 5), 7.0);
        assert_eq!(graph.node(5).unwrap().owner_count, 0);
    }

    #[test]
    fn test_self_reference_does_not_add_owner() {
        let graph = attributed("0x1,nil,24,10,,root\n0x5,0x1,24,7,,x\n0x5,0x5,24,7,,x\n");
        assert_eq!(graph.node(5).unwrap().owner_count, 1);
        assert_eq!(subtree(&graph, 1), 17.0);
        assert_eq!(graph.total_size(), 17.0);
    }

    #[test]
    fn test_zero_address_line_does_not_empty_the_forest() {
        let graph = attributed("0x1,nil,24,10,,root\n0x0,0x1,24,5,,zero\n0x2,0x1,24,5,,b\n");
        assert_eq!(graph.roots().len(), 1);
        assert_eq!(graph.total_size(), 15.0);
    }

    #[test]
    fn test_unrooted_cycle_is_unreachable() {
        let graph = attributed("0xa,0xb,24,5,,a\n0xb,0xa,24,7,,b\n");
        assert_eq!(graph.total_size(), 0.0);
        assert!(graph.total_size().is_sign_positive());
        assert_eq!(graph.node(0xa).unwrap().owner_count, 0);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut dump = String::from("0x1,nil,24,1,,n1\n");
        for i in 2..=200_000u64 {
            dump.push_str(&format!("0x{:x},0x{:x},24,1,,n\n", i, i - 1));
        }
        let graph = attributed(&dump);
        assert_eq!(graph.total_size(), 200_000.0);
        assert_eq!(subtree(&graph, 1), 200_000.0);
    }

    #[test]
    fn test_reattribution_is_stable() {
        let (mut graph, _) = MemoryGraph::from_reader(
            "0x1,nil,24,100,,root\n0x2,0x1,24,50,,a\n0x2,nil,24,50,,a\n".as_bytes(),
        )
        .unwrap();
        let first = attribute(&mut graph);
        let second = attribute(&mut graph);
        assert_eq!(first, second);
        assert_eq!(graph.node(2).unwrap().owner_count, 2);
    }

    #[test]
    fn test_sum_invariant_on_dag() {
        let graph = attributed(
            "0x1,nil,24,3,,r1\n\
             0x2,nil,24,5,,r2\n\
             0x3,0x1,24,7,,a\n\
             0x3,0x2,24,7,,a\n\
             0x4,0x3,24,11,,b\n\
             0x5,0x1,24,13,,c\n\
             0x5,0x3,24,13,,c\n",
        );
        let reachable: u64 = [1u64, 2, 3, 4, 5]
            .iter()
            .map(|l| graph.node(*l).unwrap().self_size)
            .sum();
        assert!((graph.total_size() - reachable as f64).abs() < 1e-9);
    }
}
