//! Error types for the WheelSpin environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The environment refused the clipboard write (permissions, focus, etc.)
    #[error("Clipboard write denied: {0}")]
    ClipboardDenied(String),

    /// No clipboard is attached to this environment
    #[error("Clipboard unavailable")]
    ClipboardUnavailable,

    /// Context operation failed
    #[error("Context error: {0}")]
    ContextError(String),
}

impl EnvError {
    /// Creates a clipboard denial error.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::ClipboardDenied(reason.into())
    }

    /// Creates a context error.
    pub fn context(msg: impl std::fmt::Display) -> Self {
        Self::ContextError(msg.to_string())
    }
}
