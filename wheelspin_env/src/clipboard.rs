//! Clipboard abstraction for the "copy winner" action.

use async_trait::async_trait;
use crate::error::EnvError;
use std::sync::Mutex;

/// Destination for a copied winner.
///
/// # Implementations
///
/// - **Production**: `MemoryClipboard`, or a platform clipboard supplied by the host UI
/// - **Simulation**: `SimClipboard` with scripted denials
///
/// # Contract
///
/// ```text
/// Session                    Sink
///   |-- write_text(winner) -->|
///   |<-------- Ok(()) --------|   winner removed + recorded
///   |<------- Err(e) ---------|   session untouched, caller may retry
/// ```
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    /// Writes text to the clipboard.
    ///
    /// # Returns
    /// * `Ok(())` - The text is on the clipboard
    /// * `Err(EnvError::ClipboardDenied)` - The environment refused the write
    /// * `Err(EnvError::ClipboardUnavailable)` - Nothing to write to
    async fn write_text(&self, text: &str) -> Result<(), EnvError>;
}

/// In-process clipboard that keeps the last written text.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last written text, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl ClipboardSink for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), EnvError> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| EnvError::context("clipboard lock poisoned"))?;
        *guard = Some(text.to_string());
        Ok(())
    }
}
