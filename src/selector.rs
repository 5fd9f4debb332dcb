//! Starting points for export
//!
//! Export starts from the whole root set unless the user narrows it:
//!
//! - **Name paths** (`--node "root;child;grandchild"`): walk down from the
//!   roots, matching one `;`-separated segment per level against node
//!   names. The first match at each level wins.
//! - **Labels** (`--label 0x7f00a0`): direct lookup by address. Labels are
//!   decimal unless prefixed with `0x`.
//!
//! Every selected node is an independent starting point, so a node picked
//! twice is exported twice.

use crate::error::{DumpError, Result};
use crate::graph::{MemoryGraph, NodeId, NIL_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A `;`-separated path of node names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NodePath {
    pub segments: Vec<String>,
    /// Original text, for error reports
    pub literal: String,
}

impl NodePath {
    /// Split `text` on `;`; a trailing empty segment is dropped
    pub fn parse(text: &str) -> Self {
        let mut segments: Vec<String> = text.split(';').map(str::to_string).collect();
        if segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        Self {
            segments,
            literal: text.to_string(),
        }
    }
}

impl From<String> for NodePath {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.literal
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

/// Parse a user-supplied node label: hex with `0x`/`0X`, decimal otherwise
pub fn parse_label(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|_| DumpError::InvalidLabel(text.to_string()))
}

/// A selector that matched nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorMiss {
    Path(String),
    Label(u64),
}

impl fmt::Display for SelectorMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorMiss::Path(literal) => write!(f, "No node found for path {}", literal),
            SelectorMiss::Label(label) => write!(f, "No node found for label 0x{:x}", label),
        }
    }
}

/// Resolved starting points
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub roots: Vec<NodeId>,
    pub misses: Vec<SelectorMiss>,
}

/// Resolve name paths and labels to starting nodes
///
/// With neither given, the full root set is selected. Paths are resolved
/// first, then labels; misses are logged and skipped.
pub fn select(graph: &MemoryGraph, paths: &[NodePath], labels: &[u64]) -> Selection {
    if paths.is_empty() && labels.is_empty() {
        return Selection {
            roots: graph.roots().to_vec(),
            misses: Vec::new(),
        };
    }

    let mut selection = Selection::default();
    for path in paths {
        match find_path(graph, path) {
            Some(id) => selection.roots.push(id),
            None => selection.misses.push(SelectorMiss::Path(path.literal.clone())),
        }
    }
    for &label in labels {
        match graph.id_of(label) {
            Some(id) => selection.roots.push(id),
            None => selection.misses.push(SelectorMiss::Label(label)),
        }
    }

    for miss in &selection.misses {
        warn!("{}", miss);
    }
    selection
}

/// Walk a name path down from the roots
///
/// The NIL root is transparent for the first segment: objects hanging
/// directly under NIL can be named without spelling `NIL;` first. An empty
/// path matches nothing.
pub fn find_path(graph: &MemoryGraph, path: &NodePath) -> Option<NodeId> {
    let mut segments = path.segments.iter();
    let first = segments.next()?;

    let top_level = graph.roots().iter().copied().chain(
        graph
            .node(NIL_LABEL)
            .into_iter()
            .flat_map(|nil| nil.children.iter().map(|c| c.node)),
    );
    let mut current = find_named(graph, top_level, first)?;

    for segment in segments {
        let children = graph.node_at(current).children.iter().map(|c| c.node);
        current = find_named(graph, children, segment)?;
    }
    Some(current)
}

fn find_named(
    graph: &MemoryGraph,
    mut candidates: impl Iterator<Item = NodeId>,
    name: &str,
) -> Option<NodeId> {
    candidates.find(|&id| &*graph.node_at(id).name == name)
}
