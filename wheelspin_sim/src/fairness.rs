//! Shuffle fairness audit.
//!
//! Shuffles a small labelled list many times, each time with a freshly
//! seeded generator the way a session does, and runs a chi-squared
//! goodness-of-fit test of the observed permutations against the uniform
//! distribution over all `n!` orderings.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::BTreeMap;
use wheelspin_core::{EntryList, Mulberry32};

/// Largest list the audit will enumerate (720 permutations).
pub const MAX_AUDIT_ENTRIES: usize = 6;

/// Outcome of a fairness audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessReport {
    pub entries: usize,
    pub trials: u64,
    pub permutations_possible: u64,
    pub permutations_seen: usize,
    pub chi_squared: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub passed: bool,
}

/// Runs the audit for an `n`-entry list over `trials` shuffles.
///
/// `n` is clamped to `1..=MAX_AUDIT_ENTRIES`. Lists of one entry have a
/// single ordering and pass trivially.
pub fn audit_shuffle_fairness(n: usize, trials: u64, seed: u64, threshold: f64) -> FairnessReport {
    let n = n.clamp(1, MAX_AUDIT_ENTRIES);
    let possible: u64 = (1..=n as u64).product();
    let base = EntryList::from_values((0..n).map(|i| i.to_string()));

    let mut seeds = ChaCha8Rng::seed_from_u64(seed);
    let mut counts: BTreeMap<Vec<String>, u64> = BTreeMap::new();
    for _ in 0..trials {
        let mut list = base.clone();
        list.shuffle_with(&mut Mulberry32::new(seeds.next_u32()));
        *counts.entry(list.as_slice().to_vec()).or_default() += 1;
    }

    let expected = trials as f64 / possible as f64;
    let unseen = possible.saturating_sub(counts.len() as u64) as f64;
    let chi_squared: f64 = counts
        .values()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum::<f64>()
        + unseen * expected;

    let degrees_of_freedom = (possible - 1) as f64;
    let p_value = if possible < 2 || trials == 0 {
        1.0
    } else {
        ChiSquared::new(degrees_of_freedom)
            .map(|dist| dist.sf(chi_squared))
            .unwrap_or(0.0)
    };

    FairnessReport {
        entries: n,
        trials,
        permutations_possible: possible,
        permutations_seen: counts.len(),
        chi_squared,
        degrees_of_freedom,
        p_value,
        passed: p_value >= threshold,
    }
}
