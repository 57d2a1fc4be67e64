//! Error taxonomy for the process and properties layers.
//!
//! None of these errors reach the build outcome: the enrichment boundary turns
//! every one of them into an absent fact.

use std::time::Duration;

/// Errors produced while reading build metadata inputs.
#[derive(Debug, thiserror::Error)]
pub enum BuildMetaError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("command `{command}` failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("command `{command}` timed out after {timeout:?}")]
    CommandTimedOut { command: String, timeout: Duration },

    #[error("invalid property escape in line {line}: {reason}")]
    InvalidProperty { line: usize, reason: String },
}

/// Result type for buildmeta operations.
pub type Result<T> = std::result::Result<T, BuildMetaError>;
