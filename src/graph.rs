//! Ownership graph built from a memory dump
//!
//! Nodes live in a flat arena keyed by address (`label`). Every relation
//! between nodes is an arena index, so cycles in the dump are harmless to
//! the data structure itself; the traversals in [`crate::attribution`],
//! [`crate::critical_path`] and [`crate::export`] guard against them.
//!
//! # Tree parents
//!
//! An object may be referenced by many referrers. Each referrer edge carries
//! an [`EdgePriority`] derived from its label; only the referrers at the
//! highest priority present become tree parents. When several referrers tie
//! at that priority the node is shared, and its size is later divided among
//! them.
//!
//! # Example
//!
//! ```
//! use dump2dot::graph::MemoryGraph;
//!
//! # fn main() -> dump2dot::error::Result<()> {
//! let dump = "0x1,nil,24,100,,root\n0x2,0x1,24,50,child_of,leaf1\n";
//! let (graph, report) = MemoryGraph::from_reader(dump.as_bytes())?;
//!
//! assert_eq!(report.records, 2);
//! // NIL plus the two objects
//! assert_eq!(graph.len(), 3);
//! assert_eq!(graph.roots().len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::{DumpError, Result};
use crate::interner::StringInterner;
use crate::record::{parse_line, DumpRecord, ParseOutcome};
use fnv::{FnvHashMap, FnvHashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Label of the synthetic root absorbing objects whose referrer is nil
pub const NIL_LABEL: u64 = 0;

/// Display name of the synthetic root
pub const NIL_NAME: &str = "NIL";

/// Rank of a referrer edge; declaration order is priority order, lowest first
///
/// The generic (unlabeled or any other label) relation outranks the
/// specialized tags, so an object referenced both ways hangs under its
/// generic referrer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgePriority {
    Keylist,
    Meta,
    Spec,
    Generic,
}

impl EdgePriority {
    /// Classify an edge label
    pub fn classify(edge: &str) -> Self {
        match edge {
            "keylist" => EdgePriority::Keylist,
            "meta" => EdgePriority::Meta,
            "spec" => EdgePriority::Spec,
            _ => EdgePriority::Generic,
        }
    }
}

/// Arena index of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A recorded referrer of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentEdge {
    pub referrer: u64,
    pub edge: Rc<str>,
    pub priority: EdgePriority,
}

/// An owned child link, derived from the child's winning parent edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    pub node: NodeId,
    pub edge: Rc<str>,
}

/// One memory object
#[derive(Debug, Clone)]
pub struct Node {
    pub label: u64,
    pub kind: i32,
    pub self_size: u64,
    /// Apportioned size of this node and its descendants (0 until attributed)
    pub subtree_size: f64,
    pub name: Rc<str>,
    /// Referrers, at most one entry per referrer address
    pub parent_edges: Vec<ParentEdge>,
    pub children: Vec<ChildLink>,
    /// How many tree parents claim this node (0 for roots and unreachable nodes)
    pub owner_count: u32,
    pub critical: bool,
}

impl Node {
    fn new(label: u64, kind: i32, self_size: u64, name: Rc<str>) -> Self {
        Self {
            label,
            kind,
            self_size,
            subtree_size: 0.0,
            name,
            parent_edges: Vec::new(),
            children: Vec::new(),
            owner_count: 0,
            critical: false,
        }
    }

    /// Highest priority among this node's referrer edges
    pub fn winning_priority(&self) -> Option<EdgePriority> {
        self.parent_edges.iter().map(|p| p.priority).max()
    }
}

/// A line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number
    pub line_number: usize,
    pub text: String,
}

/// Counters collected while importing a dump
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Lines read, including comments and malformed lines
    pub lines: usize,
    /// Object records parsed
    pub records: usize,
    pub comments: usize,
    /// Records that redeclared an address already seen
    pub duplicates: usize,
    pub malformed: Vec<MalformedLine>,
}

/// The whole ownership forest of one dump
#[derive(Debug)]
pub struct MemoryGraph {
    nodes: Vec<Node>,
    index: FnvHashMap<u64, NodeId>,
    roots: Vec<NodeId>,
    interner: StringInterner,
    total_size: f64,
}

impl MemoryGraph {
    /// Import a dump file
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Io`] if the file cannot be opened or read.
    /// Malformed lines do not fail the import; they are listed in the report.
    pub fn import<P: AsRef<Path>>(path: P) -> Result<(Self, ImportReport)> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DumpError::io(path, e))?;
        info!("Importing {}", path.display());
        Self::read_lines(BufReader::new(file)).map_err(|e| DumpError::io(path, e))
    }

    /// Import a dump from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<(Self, ImportReport)> {
        Self::read_lines(reader).map_err(|e| DumpError::io("<reader>", e))
    }

    fn read_lines<R: BufRead>(reader: R) -> std::io::Result<(Self, ImportReport)> {
        let mut builder = GraphBuilder::new();
        for raw in reader.split(b'\n') {
            let raw = raw?;
            let text = String::from_utf8_lossy(&raw);
            builder.add_line(text.strip_suffix('\r').unwrap_or(text.as_ref()));
        }
        Ok(builder.finish())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of owned child links
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// Forest roots, in import order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn id_of(&self, label: u64) -> Option<NodeId> {
        self.index.get(&label).copied()
    }

    pub fn node(&self, label: u64) -> Option<&Node> {
        self.id_of(label).map(|id| &self.nodes[id.0])
    }

    pub fn node_at(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_at_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    /// Sum of root subtree sizes after attribution, 0 before
    pub fn total_size(&self) -> f64 {
        self.total_size
    }

    pub(crate) fn set_total_size(&mut self, total: f64) {
        self.total_size = total;
    }

    /// Shared string table holding names and edge labels
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Recompute every node's children and the root set from parent edges
    ///
    /// Only referrers at a node's winning priority that exist in the graph
    /// become tree parents. A node with none of those is a root.
    pub fn rebuild_tree(&mut self) {
        for node in &mut self.nodes {
            node.children.clear();
        }
        self.roots.clear();

        for i in 0..self.nodes.len() {
            let edges = std::mem::take(&mut self.nodes[i].parent_edges);
            let mut attached = false;
            if let Some(winning) = edges.iter().map(|p| p.priority).max() {
                for parent in edges.iter().filter(|p| p.priority == winning) {
                    if let Some(&pid) = self.index.get(&parent.referrer) {
                        self.nodes[pid.0].children.push(ChildLink {
                            node: NodeId(i),
                            edge: Rc::clone(&parent.edge),
                        });
                        attached = true;
                    }
                }
            }
            self.nodes[i].parent_edges = edges;
            if !attached {
                self.roots.push(NodeId(i));
            }
        }

        debug!(
            "Resolved {} roots and {} tree edges",
            self.roots.len(),
            self.edge_count()
        );
    }
}

/// Incremental graph construction from dump records
///
/// Records may arrive in any order; tree edges are resolved once, in
/// [`GraphBuilder::finish`].
#[derive(Debug)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    index: FnvHashMap<u64, NodeId>,
    interner: StringInterner,
    /// (label, referrer) pairs already recorded
    seen_parents: FnvHashSet<(u64, u64)>,
    report: ImportReport,
}

impl GraphBuilder {
    /// Start a graph holding only the NIL root
    pub fn new() -> Self {
        let mut interner = StringInterner::new();
        let nil = Node::new(NIL_LABEL, 0, 0, interner.intern(NIL_NAME));
        let mut index = FnvHashMap::default();
        index.insert(NIL_LABEL, NodeId(0));
        Self {
            nodes: vec![nil],
            index,
            interner,
            seen_parents: FnvHashSet::default(),
            report: ImportReport::default(),
        }
    }

    /// Classify and absorb one raw line, logging it if malformed
    pub fn add_line(&mut self, line: &str) {
        self.report.lines += 1;
        match parse_line(line) {
            // address 0 is reserved for NIL
            ParseOutcome::Record(record) if record.label != NIL_LABEL => self.add_record(&record),
            ParseOutcome::Comment => self.report.comments += 1,
            ParseOutcome::Record(_) | ParseOutcome::Malformed => {
                let line_number = self.report.lines;
                warn!("Failed to parse line {}: {}", line_number, line);
                self.report.malformed.push(MalformedLine {
                    line_number,
                    text: line.to_string(),
                });
            }
        }
    }

    /// Merge one record into the graph
    ///
    /// The first declaration of an address fixes its kind, size and name;
    /// later declarations only contribute referrer edges. A record naming
    /// itself as referrer keeps that edge, so the object is never a root
    /// through it. Records for the NIL address are dropped.
    pub fn add_record(&mut self, record: &DumpRecord<'_>) {
        if record.label == NIL_LABEL {
            warn!("Ignoring record for reserved address 0x0");
            return;
        }
        self.report.records += 1;

        let id = match self.index.get(&record.label) {
            Some(&id) => {
                self.report.duplicates += 1;
                id
            }
            None => {
                let name = if record.name.is_empty() {
                    self.interner.intern(&format!("0x{:x}", record.label))
                } else {
                    self.interner.intern(record.name)
                };
                let id = NodeId(self.nodes.len());
                self.nodes
                    .push(Node::new(record.label, record.kind, record.size, name));
                self.index.insert(record.label, id);
                id
            }
        };

        if self.seen_parents.insert((record.label, record.referrer)) {
            let edge = self.interner.intern(record.edge);
            self.nodes[id.0].parent_edges.push(ParentEdge {
                referrer: record.referrer,
                priority: EdgePriority::classify(record.edge),
                edge,
            });
        }
    }

    /// Resolve tree edges and roots, producing the finished graph
    pub fn finish(self) -> (MemoryGraph, ImportReport) {
        let mut graph = MemoryGraph {
            nodes: self.nodes,
            index: self.index,
            roots: Vec::new(),
            interner: self.interner,
            total_size: 0.0,
        };
        graph.rebuild_tree();

        let report = self.report;
        info!(
            "Imported {} records ({} nodes, {} malformed lines, {} comments)",
            report.records,
            graph.len(),
            report.malformed.len(),
            report.comments
        );
        (graph, report)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
