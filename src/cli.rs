//! CLI argument parsing for dump2dot

use crate::config::{ExportConfig, ExportFormat};
use crate::error::Result;
use crate::selector::{parse_label, NodePath};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dump2dot")]
#[command(version)]
#[command(
    about = "Convert a heap dump into a size-annotated ownership graph",
    long_about = None
)]
pub struct Cli {
    /// Dump file to import
    #[arg(value_name = "DUMP")]
    pub input: PathBuf,

    /// Output file (default: a.dot, a.gml or a.graphml)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Minimum fraction (0-1) of the total size a subtree needs to be shown
    #[arg(short = 't', long = "threshold", value_name = "FRACTION")]
    pub threshold: Option<f64>,

    /// Maximum depth below each starting node (0 = starting nodes only)
    #[arg(short = 'd', long = "depth", value_name = "LEVELS")]
    pub depth: Option<usize>,

    /// Start from the node at this name path, e.g. "root;system" (repeatable)
    #[arg(short = 'n', long = "node", value_name = "PATH", value_parser = node_path)]
    pub nodes: Vec<NodePath>,

    /// Start from the node with this address, decimal or 0x-prefixed hex (repeatable)
    #[arg(short = 'l', long = "label", value_name = "LABEL", value_parser = label)]
    pub labels: Vec<u64>,

    /// Only show nodes on critical branches
    #[arg(short = 'c', long = "critical")]
    pub critical_only: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<ExportFormat>,

    /// Load export settings from a TOML file; flags override its values
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a JSON run summary to stdout
    #[arg(long = "summary")]
    pub summary: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

fn node_path(text: &str) -> std::result::Result<NodePath, String> {
    Ok(NodePath::parse(text))
}

fn label(text: &str) -> std::result::Result<u64, String> {
    parse_label(text).map_err(|e| e.to_string())
}

impl Cli {
    /// Build the export configuration: config file first, then flags
    ///
    /// Selectors given on the command line replace those from the file.
    pub fn export_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_file(path)?,
            None => ExportConfig::default(),
        };

        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(depth) = self.depth {
            config.depth = Some(depth);
        }
        if !self.nodes.is_empty() || !self.labels.is_empty() {
            config.node_paths = self.nodes.clone();
            config.labels = self.labels.clone();
        }
        if self.critical_only {
            config.critical_only = true;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        Ok(config)
    }
}
