//! GML (Graph Modelling Language) output
//!
//! Nodes get sequential integer ids in declaration order; the dump address
//! is kept as a string attribute since GML integers are 32-bit in most
//! readers.

use super::{percent, GraphFormat, KindLookup};
use crate::graph::Node;
use fnv::FnvHashMap;
use std::io::{self, Write};

/// GML format strategy
#[derive(Debug)]
pub struct GmlFormat {
    kind_name: KindLookup,
    total: f64,
    ids: FnvHashMap<u64, usize>,
}

impl GmlFormat {
    pub fn new(kind_name: KindLookup) -> Self {
        Self {
            kind_name,
            total: 0.0,
            ids: FnvHashMap::default(),
        }
    }

    /// GML strings cannot contain `"`; `&` starts an entity
    fn escape(text: &str) -> String {
        text.replace('&', "&amp;").replace('"', "&quot;")
    }

    fn id_for(&mut self, label: u64) -> usize {
        let next = self.ids.len();
        *self.ids.entry(label).or_insert(next)
    }
}

impl GraphFormat for GmlFormat {
    fn set_total_size(&mut self, total: f64) {
        self.total = total;
    }

    fn write_preamble<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "graph [")?;
        writeln!(out, "  directed 1")
    }

    fn write_node<W: Write>(
        &mut self,
        out: &mut W,
        node: &Node,
        highlight: bool,
    ) -> io::Result<()> {
        let id = self.id_for(node.label);
        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", id)?;
        writeln!(out, "    label \"{}\"", Self::escape(&node.name))?;
        writeln!(out, "    address \"0x{:x}\"", node.label)?;
        writeln!(out, "    kind \"{}\"", (self.kind_name)(node.kind))?;
        writeln!(out, "    self_size {}", node.self_size)?;
        writeln!(out, "    subtree_size {}", node.subtree_size as u64)?;
        writeln!(
            out,
            "    self_percent {:.2}",
            percent(node.self_size as f64, self.total)
        )?;
        writeln!(
            out,
            "    subtree_percent {:.2}",
            percent(node.subtree_size, self.total)
        )?;
        writeln!(out, "    critical {}", u8::from(node.critical))?;
        if highlight {
            writeln!(out, "    graphics [ fill \"#FFFF00\" ]")?;
        }
        writeln!(out, "  ]")
    }

    fn write_edge<W: Write>(
        &mut self,
        out: &mut W,
        from: &Node,
        to: &Node,
        edge: &str,
    ) -> io::Result<()> {
        let source = self.id_for(from.label);
        let target = self.id_for(to.label);
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {}", source)?;
        writeln!(out, "    target {}", target)?;
        if !edge.is_empty() {
            writeln!(out, "    label \"{}\"", Self::escape(edge))?;
        }
        writeln!(out, "  ]")
    }

    fn write_appendix<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "]")
    }
}
