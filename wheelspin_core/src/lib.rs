//! WheelSpin Core - Randomized Selection Engine
//!
//! Picks one entry from a list by spinning a simulated wheel:
//! 1. **Entry Store**: ordered, deduplicated entries with a seeded Fisher–Yates shuffle
//! 2. **Spin Simulator**: frame-rate independent exponential deceleration
//! 3. **Winner Resolver**: angle ↔ sector mapping, with snapping so the rest
//!    position always shows the reported winner
//! 4. **History Ledger**: append-only record of copied-out winners

pub mod config;
pub mod entries;
pub mod error;
pub mod history;
pub mod prng;
pub mod resolver;
pub mod session;
pub mod spin;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use config::SpinConfig;
pub use entries::EntryList;
pub use error::{ConfigError, SessionError};
pub use history::{HistoryLedger, WinnerRecord};
pub use prng::Mulberry32;
pub use session::{FrameOutcome, SpinTicket, WheelSession, WheelSnapshot};
pub use spin::{SpinLaunch, SpinPhase, SpinSimulator, StepOutcome};
