//! The Entry Store - ordered, deduplicated wheel entries.
//!
//! Insertion order is render order and also the index space the resolver
//! maps angles into, so every mutation here is structural for the wheel.

use crate::prng::Mulberry32;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered sequence of unique, trimmed, non-empty entries.
///
/// An empty list is valid and means "no wheel".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryList {
    items: Vec<String>,
}

impl EntryList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from raw text, one entry per line.
    ///
    /// Lines are split on `\n` (a trailing `\r` goes with the trim), trimmed,
    /// blank lines dropped, and duplicates removed keeping the first
    /// occurrence. Never fails.
    pub fn parse(raw: &str) -> Self {
        let mut seen = HashSet::new();
        let items = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| seen.insert(*line))
            .map(str::to_string)
            .collect();
        Self { items }
    }

    /// Builds a list from already-split values, applying the same rules as `parse`.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let items = values
            .into_iter()
            .filter_map(|v| {
                let v = v.as_ref().trim();
                (!v.is_empty() && seen.insert(v.to_string())).then(|| v.to_string())
            })
            .collect();
        Self { items }
    }

    /// Fisher–Yates (Knuth) shuffle in place.
    ///
    /// Walks from the last index down, swapping each slot with a uniformly
    /// chosen slot at or below it. After processing index `i` the suffix
    /// `[i..n)` is a uniform permutation of whatever landed there.
    pub fn shuffle_with(&mut self, rng: &mut Mulberry32) {
        for i in (1..self.items.len()).rev() {
            let j = rng.below(i + 1);
            self.items.swap(i, j);
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Removes the first occurrence of `value`.
    ///
    /// Returns `false` (and leaves the list alone) when it is absent.
    pub fn remove_value(&mut self, value: &str) -> bool {
        match self.items.iter().position(|item| item == value) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
