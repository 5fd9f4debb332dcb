//! Export configuration
//!
//! The bundle consumed by the export pipeline. It can be loaded from a TOML
//! file and is then overridden by command line flags.
//!
//! # Example TOML
//!
//! ```toml
//! output = "heap.dot"
//! threshold = 0.01
//! depth = 6
//! node_paths = ["root;system"]
//! labels = [140737488355328]
//! critical_only = true
//! format = "dot"
//! ```

use crate::error::{DumpError, Result};
use crate::selector::NodePath;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Graph description format of the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Graphviz DOT (default)
    #[default]
    Dot,
    /// Graph Modelling Language
    Gml,
    /// GraphML XML
    Graphml,
}

impl ExportFormat {
    /// File extension used for the default output name
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Dot => "dot",
            ExportFormat::Gml => "gml",
            ExportFormat::Graphml => "graphml",
        }
    }

    /// Default output file name for this format
    pub fn default_output(self) -> PathBuf {
        PathBuf::from(format!("a.{}", self.extension()))
    }
}

/// Everything the exporter needs to know about one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Destination file; defaults to `a.<ext>` for the chosen format
    pub output: Option<PathBuf>,

    /// Minimum fraction (0..=1) of the total size a subtree needs to be shown
    pub threshold: f64,

    /// Maximum levels below each starting node; `None` is unlimited
    pub depth: Option<usize>,

    /// Name paths selecting subtrees
    pub node_paths: Vec<NodePath>,

    /// Addresses selecting subtrees
    pub labels: Vec<u64>,

    /// Only emit nodes on critical branches
    pub critical_only: bool,

    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: None,
            threshold: 0.0,
            depth: None,
            node_paths: Vec::new(),
            labels: Vec::new(),
            critical_only: false,
            format: ExportFormat::Dot,
        }
    }
}

impl ExportConfig {
    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`DumpError::Io`] if the file cannot be read and
    /// [`DumpError::Config`] if it is not valid TOML for this structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DumpError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DumpError::Config(e.to_string()))
    }

    /// Reject values that cannot drive an export
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DumpError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }

    /// The output path, falling back to the format's default name
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.format.default_output())
    }
}
