//! Error types for the selection engine.
//!
//! Nothing here is fatal: every `SessionError` is an expected timing
//! condition or a retryable external failure, and the session is left
//! exactly as it was.

use thiserror::Error;
use wheelspin_env::EnvError;

/// Reasons a session operation was refused.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No entries loaded")]
    NoEntries,

    #[error("A spin is already in progress")]
    AlreadySpinning,

    #[error("No spin in progress")]
    NotSpinning,

    /// Frame callback from a spin that was cancelled or superseded
    #[error("Stale frame for spin #{0}")]
    StaleFrame(u64),

    #[error("No winner to copy")]
    NoWinner,

    #[error("Copy failed: {0}")]
    Clipboard(#[from] EnvError),
}

/// Errors loading or validating a `SpinConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a validation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
