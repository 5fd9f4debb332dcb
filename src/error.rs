//! Error taxonomy for dump import, configuration and export
//!
//! Per-line parse failures and unresolved selectors are not errors: they are
//! reported as data (see [`crate::graph::ImportReport`] and
//! [`crate::selector::Selection`]) so the run can skip and continue.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),

    #[error("Invalid node label '{0}'")]
    InvalidLabel(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),
}

impl DumpError {
    /// Attach a path to an I/O failure
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DumpError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for dump operations
pub type Result<T> = std::result::Result<T, DumpError>;
