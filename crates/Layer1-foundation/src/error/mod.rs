//! Error types for Shadow
//!
//! All user-facing errors are collected here. Layer-local errors
//! (mirror, VCS) convert into [`Error`] at the agent boundary.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Shadow error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Preconditions
    // ========================================================================
    #[error("No repository selected: select a repository first")]
    NoRepositorySelected,

    #[error("Local history is not initialized")]
    HistoryNotInitialized,

    // ========================================================================
    // Filesystem
    // ========================================================================
    #[error("Failed to mirror repository state: {0}")]
    Mirror(String),

    #[error("File error: {0}")]
    File(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // ========================================================================
    // External tools
    // ========================================================================
    #[error("Version control error: {0}")]
    Vcs(String),

    #[error("Assistant execution failed: {reason}\nOutput: {output}")]
    Assistant { reason: String, output: String },

    // ========================================================================
    // Configuration / tasks
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task error: {0}")]
    Task(String),

    // ========================================================================
    // External conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a violated precondition (nothing was attempted)
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::NoRepositorySelected | Error::HistoryNotInitialized)
    }

    /// Assistant failure helper
    pub fn assistant(reason: impl Into<String>, output: impl Into<String>) -> Self {
        Error::Assistant {
            reason: reason.into(),
            output: output.into(),
        }
    }
}
