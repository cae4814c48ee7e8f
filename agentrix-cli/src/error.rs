//! Errors surfaced by the command line.

use std::path::PathBuf;

use serde_json::Value;

/// Errors that end a CLI invocation with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The SDK rejected the input or the API call failed.
    #[error(transparent)]
    Sdk(#[from] agentrix::AgentrixError),

    /// A payload file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Output could not be rendered as JSON.
    #[error("cannot render output: {0}")]
    Render(#[from] serde_json::Error),

    /// One or more smoke checks failed; the report is still printed.
    #[error("{failed} of {total} smoke checks failed")]
    Smoke {
        /// Per-check results.
        report: Value,
        /// Number of failed checks.
        failed: usize,
        /// Number of checks run.
        total: usize,
    },
}
