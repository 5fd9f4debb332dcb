//! GraphML output

use super::{percent, GraphFormat, KindLookup};
use crate::graph::Node;
use std::io::{self, Write};

const KEYS: &[(&str, &str, &str)] = &[
    ("name", "node", "string"),
    ("kind", "node", "string"),
    ("self_size", "node", "long"),
    ("subtree_size", "node", "long"),
    ("self_percent", "node", "double"),
    ("subtree_percent", "node", "double"),
    ("critical", "node", "boolean"),
    ("fill", "node", "string"),
    ("label", "edge", "string"),
];

/// GraphML format strategy
#[derive(Debug)]
pub struct GraphMlFormat {
    kind_name: KindLookup,
    total: f64,
}

impl GraphMlFormat {
    pub fn new(kind_name: KindLookup) -> Self {
        Self {
            kind_name,
            total: 0.0,
        }
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    fn node_id(node: &Node) -> String {
        format!("N{:x}", node.label)
    }
}

impl GraphFormat for GraphMlFormat {
    fn set_total_size(&mut self, total: f64) {
        self.total = total;
    }

    fn write_preamble<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
        )?;
        for (name, domain, ty) in KEYS {
            writeln!(
                out,
                r#"  <key id="{name}" for="{domain}" attr.name="{name}" attr.type="{ty}"/>"#
            )?;
        }
        writeln!(out, r#"  <graph id="dump" edgedefault="directed">"#)
    }

    fn write_node<W: Write>(
        &mut self,
        out: &mut W,
        node: &Node,
        highlight: bool,
    ) -> io::Result<()> {
        writeln!(out, r#"    <node id="{}">"#, Self::node_id(node))?;
        writeln!(
            out,
            r#"      <data key="name">{}</data>"#,
            Self::escape(&node.name)
        )?;
        writeln!(
            out,
            r#"      <data key="kind">{}</data>"#,
            (self.kind_name)(node.kind)
        )?;
        writeln!(out, r#"      <data key="self_size">{}</data>"#, node.self_size)?;
        writeln!(
            out,
            r#"      <data key="subtree_size">{}</data>"#,
            node.subtree_size as u64
        )?;
        writeln!(
            out,
            r#"      <data key="self_percent">{:.2}</data>"#,
            percent(node.self_size as f64, self.total)
        )?;
        writeln!(
            out,
            r#"      <data key="subtree_percent">{:.2}</data>"#,
            percent(node.subtree_size, self.total)
        )?;
        writeln!(out, r#"      <data key="critical">{}</data>"#, node.critical)?;
        if highlight {
            writeln!(out, r#"      <data key="fill">#FFFF00</data>"#)?;
        }
        writeln!(out, "    </node>")
    }

    fn write_edge<W: Write>(
        &mut self,
        out: &mut W,
        from: &Node,
        to: &Node,
        edge: &str,
    ) -> io::Result<()> {
        writeln!(
            out,
            r#"    <edge source="{}" target="{}">"#,
            Self::node_id(from),
            Self::node_id(to)
        )?;
        if !edge.is_empty() {
            writeln!(
                out,
                r#"      <data key="label">{}</data>"#,
                Self::escape(edge)
            )?;
        }
        writeln!(out, "    </edge>")
    }

    fn write_appendix<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "  </graph>")?;
        writeln!(out, "</graphml>")
    }
}
