//! The History Ledger - append-only record of resolved winners.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One copied-out winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    /// Order of occurrence, starting at 1
    pub sequence: u64,

    /// The winning entry text
    pub text: String,

    /// When the winner was recorded
    pub recorded_at: SystemTime,
}

impl WinnerRecord {
    /// Milliseconds since the Unix epoch, for display and export.
    pub fn timestamp_ms(&self) -> u64 {
        self.recorded_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Append-only ledger; records are never mutated or reordered.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    /// Oldest first
    records: Vec<WinnerRecord>,
    last_sequence: u64,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a winner and returns the stored record.
    pub fn record(&mut self, text: impl Into<String>, at: SystemTime) -> WinnerRecord {
        self.last_sequence += 1;
        let record = WinnerRecord {
            sequence: self.last_sequence,
            text: text.into(),
            recorded_at: at,
        };
        self.records.push(record.clone());
        record
    }

    /// Snapshot, most recent first.
    pub fn list(&self) -> Vec<WinnerRecord> {
        self.records.iter().rev().cloned().collect()
    }

    /// Most recent record, if any.
    pub fn latest(&self) -> Option<&WinnerRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wipes the ledger. Only a full session reset does this; sequence
    /// numbering restarts at 1 afterwards.
    pub fn clear(&mut self) {
        self.records.clear();
        self.last_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_sequence_starts_at_one_and_increases() {
        let mut ledger = HistoryLedger::new();
        let a = ledger.record("A", at(10));
        let b = ledger.record("B", at(20));
        let c = ledger.record("A", at(30));

        assert_eq!((a.sequence, b.sequence, c.sequence), (1, 2, 3));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let mut ledger = HistoryLedger::new();
        ledger.record("first", at(1));
        ledger.record("second", at(2));

        let list = ledger.list();
        assert_eq!(list[0].text, "second");
        assert_eq!(list[1].text, "first");
        assert_eq!(ledger.latest().map(|r| r.text.as_str()), Some("second"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut ledger = HistoryLedger::new();
        ledger.record("A", at(1));
        let snapshot = ledger.list();
        ledger.record("B", at(2));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_clear_restarts_numbering() {
        let mut ledger = HistoryLedger::new();
        ledger.record("A", at(1));
        ledger.record("B", at(2));
        ledger.clear();

        assert!(ledger.is_empty());
        assert_eq!(ledger.record("C", at(3)).sequence, 1);
    }

    #[test]
    fn test_timestamp_ms() {
        let mut ledger = HistoryLedger::new();
        let r = ledger.record("A", UNIX_EPOCH + Duration::from_millis(1_704_067_200_123));
        assert_eq!(r.timestamp_ms(), 1_704_067_200_123);
    }
}
