//! WheelSpin Deterministic Simulation Testing (DST) Harness
//!
//! Runs the selection engine against a virtual clock so that every spin,
//! every frame gap and every race between user actions and pending frames
//! is reproducible from a single 64-bit seed.
//!
//! # Core Principle
//!
//! All sources of non-determinism are intercepted and controlled:
//! - **Time**: a virtual clock that only moves when the harness delivers a frame
//! - **Frame delivery**: fixed rate plus seeded jitter, repeats and reordering
//! - **Randomness**: shuffle and spin seeds drawn from a seeded ChaCha8 stream
//! - **Clipboard**: an in-memory sink that can be told to refuse writes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                          │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ SimContext (Virtual Clock + ChaCha8 entropy)         │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │       │                        │                            │
//! │  ┌────▼──────────┐       ┌─────▼────────┐                   │
//! │  │ WheelSession  │◄──────│  FrameClock  │  jitter, replays  │
//! │  └───────┬───────┘       └──────────────┘                   │
//! │          │ copy_winner                                      │
//! │  ┌───────▼───────┐       ┌──────────────┐                   │
//! │  │ SimClipboard  │       │  SimExport   │  per-frame JSON   │
//! │  └───────────────┘       └──────────────┘                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use wheelspin_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42).with_jitter(8.0);
//! let result = runner.run(ScenarioId::ReloadMidSpin).await;
//! assert!(result.passed);
//! ```

mod clipboard;
mod context;
pub mod exporter;
pub mod fairness;
pub mod live;
pub mod runner;
pub mod scenarios;

pub use clipboard::SimClipboard;
pub use context::SimContext;
pub use exporter::{SimEvent, SimExport, SimFrame};
pub use fairness::{audit_shuffle_fairness, FairnessReport, MAX_AUDIT_ENTRIES};
pub use live::{spin_file, LiveError, LiveOutcome};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner, DEFAULT_ENTRIES};
