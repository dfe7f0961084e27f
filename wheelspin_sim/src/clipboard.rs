//! Simulated clipboard with fault injection.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use wheelspin_env::{ClipboardSink, EnvError};

/// Clipboard that records every successful write and can be told to
/// refuse the next few.
#[derive(Debug, Default)]
pub struct SimClipboard {
    /// Successful writes, oldest first
    writes: Mutex<Vec<String>>,

    /// Remaining writes to refuse
    denials_remaining: AtomicU32,

    /// Every write attempt, refused or not
    attempts: AtomicU64,
}

impl SimClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses the next `count` writes.
    pub fn deny_next(&self, count: u32) {
        self.denials_remaining.store(count, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// All write attempts so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClipboardSink for SimClipboard {
    async fn write_text(&self, text: &str) -> Result<(), EnvError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let denied = self
            .denials_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if denied {
            return Err(EnvError::denied("simulated permission prompt dismissed"));
        }

        self.writes
            .lock()
            .map_err(|_| EnvError::context("clipboard lock poisoned"))?
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_denials_then_success() {
        let clipboard = SimClipboard::new();
        clipboard.deny_next(2);

        assert!(clipboard.write_text("a").await.is_err());
        assert!(clipboard.write_text("a").await.is_err());
        assert!(clipboard.write_text("a").await.is_ok());

        assert_eq!(clipboard.attempts(), 3);
        assert_eq!(clipboard.writes(), vec!["a".to_string()]);
    }
}
