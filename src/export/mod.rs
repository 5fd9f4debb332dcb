//! Graph export
//!
//! A format strategy ([`GraphFormat`]) knows how to frame a file and how to
//! render one node or one edge. The traversal that decides *what* gets
//! rendered is shared by all formats and lives in [`GraphExporter`]:
//!
//! - every selected starting node is always emitted;
//! - a child is followed only if its subtree reaches
//!   `threshold × total_size` and, in critical-only mode, it is critical;
//! - each node is declared once per run, before any edge touching it;
//! - a node already reached at a shallower or equal level is not expanded
//!   again, and each edge is written once;
//! - expansion stops at the configured depth.
//!
//! ## Output formats
//!
//! - **DOT**: Graphviz, critical nodes filled yellow
//! - **GML**: Graph Modelling Language, sizes as node attributes
//! - **GraphML**: XML with typed data keys

mod dot;
mod gml;
mod graphml;

pub use dot::DotFormat;
pub use gml::GmlFormat;
pub use graphml::GraphMlFormat;

use crate::config::{ExportConfig, ExportFormat};
use crate::error::{DumpError, Result};
use crate::graph::{MemoryGraph, Node, NodeId};
use fnv::{FnvHashMap, FnvHashSet};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::{debug, info};

/// Type code to display name lookup used when rendering nodes
pub type KindLookup = fn(i32) -> &'static str;

/// A graph description format
pub trait GraphFormat {
    /// Denominator for percentages; known only after attribution
    fn set_total_size(&mut self, total: f64);

    /// File header, written once
    fn write_preamble<W: Write>(&mut self, out: &mut W) -> io::Result<()>;

    /// Declare a node. `highlight` marks a critical node outside
    /// critical-only mode.
    fn write_node<W: Write>(&mut self, out: &mut W, node: &Node, highlight: bool)
        -> io::Result<()>;

    /// A directed relation between two declared nodes; `edge` may be empty
    fn write_edge<W: Write>(
        &mut self,
        out: &mut W,
        from: &Node,
        to: &Node,
        edge: &str,
    ) -> io::Result<()>;

    /// File footer, written once
    fn write_appendix<W: Write>(&mut self, out: &mut W) -> io::Result<()>;
}

/// The closed set of format strategies
#[derive(Debug)]
pub enum Exporter {
    Dot(DotFormat),
    Gml(GmlFormat),
    GraphMl(GraphMlFormat),
}

impl Exporter {
    pub fn new(format: ExportFormat, kind_name: KindLookup) -> Self {
        match format {
            ExportFormat::Dot => Exporter::Dot(DotFormat::new(kind_name)),
            ExportFormat::Gml => Exporter::Gml(GmlFormat::new(kind_name)),
            ExportFormat::Graphml => Exporter::GraphMl(GraphMlFormat::new(kind_name)),
        }
    }
}

impl GraphFormat for Exporter {
    fn set_total_size(&mut self, total: f64) {
        match self {
            Exporter::Dot(f) => f.set_total_size(total),
            Exporter::Gml(f) => f.set_total_size(total),
            Exporter::GraphMl(f) => f.set_total_size(total),
        }
    }

    fn write_preamble<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self {
            Exporter::Dot(f) => f.write_preamble(out),
            Exporter::Gml(f) => f.write_preamble(out),
            Exporter::GraphMl(f) => f.write_preamble(out),
        }
    }

    fn write_node<W: Write>(
        &mut self,
        out: &mut W,
        node: &Node,
        highlight: bool,
    ) -> io::Result<()> {
        match self {
            Exporter::Dot(f) => f.write_node(out, node, highlight),
            Exporter::Gml(f) => f.write_node(out, node, highlight),
            Exporter::GraphMl(f) => f.write_node(out, node, highlight),
        }
    }

    fn write_edge<W: Write>(
        &mut self,
        out: &mut W,
        from: &Node,
        to: &Node,
        edge: &str,
    ) -> io::Result<()> {
        match self {
            Exporter::Dot(f) => f.write_edge(out, from, to, edge),
            Exporter::Gml(f) => f.write_edge(out, from, to, edge),
            Exporter::GraphMl(f) => f.write_edge(out, from, to, edge),
        }
    }

    fn write_appendix<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self {
            Exporter::Dot(f) => f.write_appendix(out),
            Exporter::Gml(f) => f.write_appendix(out),
            Exporter::GraphMl(f) => f.write_appendix(out),
        }
    }
}

/// Counts of what an export wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    pub nodes: usize,
    pub edges: usize,
}

/// `part` as a percentage of `total`, 0 when the total is 0
pub fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part * 100.0 / total
    } else {
        0.0
    }
}

/// Depth- and threshold-bounded walk shared by every format
pub struct GraphExporter<'a> {
    graph: &'a MemoryGraph,
    config: &'a ExportConfig,
}

impl<'a> GraphExporter<'a> {
    pub fn new(graph: &'a MemoryGraph, config: &'a ExportConfig) -> Self {
        Self { graph, config }
    }

    /// Smallest subtree size a followed child may have
    pub fn min_size(&self) -> f64 {
        self.graph.total_size() * self.config.threshold
    }

    fn follows(&self, node: &Node, min_size: f64) -> bool {
        node.subtree_size >= min_size && (!self.config.critical_only || node.critical)
    }

    /// Render the subtrees under `roots` into `out`
    pub fn export<F: GraphFormat, W: Write>(
        &self,
        roots: &[NodeId],
        format: &mut F,
        out: &mut W,
    ) -> io::Result<ExportStats> {
        let min_size = self.min_size();
        let mut stats = ExportStats::default();
        let mut declared: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut written_edges: FnvHashSet<(NodeId, NodeId)> = FnvHashSet::default();

        format.set_total_size(self.graph.total_size());
        format.write_preamble(out)?;

        for &root in roots {
            self.declare(root, format, out, &mut declared, &mut stats)?;

            // fresh per starting node: shallowest level each node was expanded at
            let mut expanded_at: FnvHashMap<NodeId, usize> = FnvHashMap::default();
            let mut stack = vec![(root, 0usize)];

            while let Some((id, level)) = stack.pop() {
                if expanded_at.get(&id).is_some_and(|&seen| seen <= level) {
                    continue;
                }
                expanded_at.insert(id, level);
                if self.config.depth.is_some_and(|max| level >= max) {
                    continue;
                }

                let node = self.graph.node_at(id);
                let mut next = Vec::new();
                for link in &node.children {
                    let child = self.graph.node_at(link.node);
                    if !self.follows(child, min_size) {
                        continue;
                    }
                    self.declare(link.node, format, out, &mut declared, &mut stats)?;
                    if written_edges.insert((id, link.node)) {
                        format.write_edge(out, node, child, &link.edge)?;
                        stats.edges += 1;
                    }
                    next.push((link.node, level + 1));
                }
                stack.extend(next.into_iter().rev());
            }
        }

        format.write_appendix(out)?;
        debug!("Exported {} nodes and {} edges", stats.nodes, stats.edges);
        Ok(stats)
    }

    fn declare<F: GraphFormat, W: Write>(
        &self,
        id: NodeId,
        format: &mut F,
        out: &mut W,
        declared: &mut FnvHashSet<NodeId>,
        stats: &mut ExportStats,
    ) -> io::Result<()> {
        if declared.insert(id) {
            let node = self.graph.node_at(id);
            let highlight = node.critical && !self.config.critical_only;
            format.write_node(out, node, highlight)?;
            stats.nodes += 1;
        }
        Ok(())
    }
}

/// Export `roots` to the configured output file in the configured format
///
/// # Errors
///
/// Returns [`DumpError::Io`] if the output file cannot be created or written.
pub fn export_to_file(
    graph: &MemoryGraph,
    roots: &[NodeId],
    config: &ExportConfig,
    kind_name: KindLookup,
) -> Result<ExportStats> {
    let path = config.output_path();
    let file = File::create(&path).map_err(|e| DumpError::io(&path, e))?;
    let mut out = BufWriter::new(file);
    let mut format = Exporter::new(config.format, kind_name);

    let stats = GraphExporter::new(graph, config)
        .export(roots, &mut format, &mut out)
        .and_then(|stats| out.flush().map(|_| stats))
        .map_err(|e| DumpError::io(&path, e))?;

    info!(
        "Exported {} nodes and {} edges to {}",
        stats.nodes,
        stats.edges,
        path.display()
    );
    Ok(stats)
}

/// Export to an in-memory string
pub fn export_to_string(
    graph: &MemoryGraph,
    roots: &[NodeId],
    config: &ExportConfig,
    kind_name: KindLookup,
) -> Result<String> {
    let mut out = Vec::new();
    let mut format = Exporter::new(config.format, kind_name);
    GraphExporter::new(graph, config).export(roots, &mut format, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
