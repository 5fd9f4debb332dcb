//! Graphviz DOT output
//!
//! ```text
//! strict digraph dump {
//! N1[label="root\nINTEGER\n200(100)\n100.00%(50.00%)", shape=box];
//! N0 -> N1;
//! N1 -> N2[label = "child_of"];
//! }
//! ```

use super::{percent, GraphFormat, KindLookup};
use crate::graph::Node;
use std::io::{self, Write};

/// DOT format strategy
#[derive(Debug)]
pub struct DotFormat {
    kind_name: KindLookup,
    total: f64,
}

impl DotFormat {
    pub fn new(kind_name: KindLookup) -> Self {
        Self {
            kind_name,
            total: 0.0,
        }
    }

    /// Escape a string for a double-quoted DOT attribute
    fn escape(text: &str) -> String {
        text.replace('\\', "\\\\").replace('"', "\\\"")
    }

    fn node_id(node: &Node) -> String {
        format!("N{:x}", node.label)
    }
}

impl GraphFormat for DotFormat {
    fn set_total_size(&mut self, total: f64) {
        self.total = total;
    }

    fn write_preamble<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "strict digraph dump {{")
    }

    fn write_node<W: Write>(
        &mut self,
        out: &mut W,
        node: &Node,
        highlight: bool,
    ) -> io::Result<()> {
        write!(
            out,
            "{}[label=\"{}\\n{}\\n{}({})\\n{:.2}%({:.2}%)\", shape=box",
            Self::node_id(node),
            Self::escape(&node.name),
            (self.kind_name)(node.kind),
            node.subtree_size as u64,
            node.self_size,
            percent(node.subtree_size, self.total),
            percent(node.self_size as f64, self.total),
        )?;
        if highlight {
            write!(out, ", style=filled, fillcolor=yellow")?;
        }
        writeln!(out, "];")
    }

    fn write_edge<W: Write>(
        &mut self,
        out: &mut W,
        from: &Node,
        to: &Node,
        edge: &str,
    ) -> io::Result<()> {
        if edge.is_empty() {
            return writeln!(out, "{} -> {};", Self::node_id(from), Self::node_id(to));
        }
        writeln!(
            out,
            "{} -> {}[label = \"{}\"];",
            Self::node_id(from),
            Self::node_id(to),
            Self::escape(edge)
        )
    }

    fn write_appendix<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "}}")
    }
}
