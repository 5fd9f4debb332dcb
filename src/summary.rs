//! Machine-readable run summary (`--summary`)

use crate::critical_path::critical_count;
use crate::export::ExportStats;
use crate::graph::{ImportReport, MemoryGraph};
use crate::selector::Selection;
use serde::{Deserialize, Serialize};

/// A malformed dump line, as reported in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMalformedLine {
    pub line: usize,
    pub text: String,
}

/// Statistics of one import/attribute/export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpSummary {
    /// Nodes in the graph, including the synthetic NIL root
    pub nodes: usize,
    /// Owned parent-child links
    pub tree_edges: usize,
    pub roots: usize,
    /// Sum of the roots' subtree sizes in bytes
    pub total_size: f64,
    pub critical_nodes: usize,
    pub records: usize,
    pub duplicate_records: usize,
    pub comment_lines: usize,
    /// Distinct interned names and edge labels
    pub interned_strings: usize,
    pub interned_bytes: usize,
    pub malformed_lines: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub malformed: Vec<SummaryMalformedLine>,
    pub selected_roots: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unresolved_selectors: Vec<String>,
    pub emitted_nodes: usize,
    pub emitted_edges: usize,
}

impl DumpSummary {
    pub fn new(
        graph: &MemoryGraph,
        report: &ImportReport,
        selection: &Selection,
        stats: ExportStats,
    ) -> Self {
        Self {
            nodes: graph.len(),
            tree_edges: graph.edge_count(),
            roots: graph.roots().len(),
            total_size: graph.total_size(),
            critical_nodes: critical_count(graph),
            records: report.records,
            duplicate_records: report.duplicates,
            comment_lines: report.comments,
            interned_strings: graph.interner().len(),
            interned_bytes: graph.interner().bytes(),
            malformed_lines: report.malformed.len(),
            malformed: report
                .malformed
                .iter()
                .map(|m| SummaryMalformedLine {
                    line: m.line_number,
                    text: m.text.clone(),
                })
                .collect(),
            selected_roots: selection.roots.len(),
            unresolved_selectors: selection.misses.iter().map(|m| m.to_string()).collect(),
            emitted_nodes: stats.nodes,
            emitted_edges: stats.edges,
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
