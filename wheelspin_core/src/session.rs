//! Session Controller - the single owner of all wheel state.
//!
//! Integrates the pure engines (entry store, spin physics, resolver,
//! history) with the environment context (clock, entropy, clipboard).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     WheelSession<Ctx>                       │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Context: WheelContext                    │   │
//! │  │  • now() → frame timestamps                          │   │
//! │  │  • entropy_seed() → shuffle / spin PRNG seeds        │   │
//! │  │  • system_time() → winner record timestamps          │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                              │                               │
//! │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────────────┐   │
//! │  │ ENTRIES │ │  SPIN   │ │ RESOLVER │ │     HISTORY     │   │
//! │  │  Store  │ │Simulator│ │          │ │     Ledger      │   │
//! │  └─────────┘ └─────────┘ └──────────┘ └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Invalidation
//!
//! Every structural change to the entry list (load, shuffle, clear, remove)
//! synchronously cancels any spin, clears the current winner, unrotates the
//! wheel and bumps the spin generation. Frame callbacks carry the
//! [`SpinTicket`] they were issued with, so a callback that was already
//! scheduled for the old spin is rejected instead of resolving against a
//! stale entry count.
//!
//! # Usage
//!
//! ```ignore
//! let mut session = WheelSession::new(SystemContext::shared(), SpinConfig::default());
//! session.load("alice\nbob\ncarol");
//! let ticket = session.spin()?;
//! loop {
//!     ctx.sleep(FRAME).await;
//!     if let FrameOutcome::Resolved(winner) = session.advance(ticket, ctx.now())? {
//!         println!("{winner}");
//!         break;
//!     }
//! }
//! ```

use crate::config::SpinConfig;
use crate::entries::EntryList;
use crate::error::SessionError;
use crate::history::{HistoryLedger, WinnerRecord};
use crate::prng::Mulberry32;
use crate::spin::{SpinLaunch, SpinPhase, SpinSimulator, StepOutcome};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wheelspin_env::{ClipboardSink, SessionId, WheelContext};

/// Token identifying one spin; frame callbacks must present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpinTicket {
    generation: u64,
}

impl SpinTicket {
    /// Spin generation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a frame callback should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Schedule another frame
    Continue,

    /// The wheel stopped on this entry; stop scheduling frames
    Resolved(String),
}

/// Read-only view handed to renderers and other consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelSnapshot {
    pub session_id: SessionId,
    pub entries: Vec<String>,
    pub angle: f64,
    pub velocity: f64,
    pub phase: SpinPhase,
    pub is_spinning: bool,
    pub current_winner: Option<String>,
    pub history: Vec<WinnerRecord>,
}

/// One wheel session.
///
/// Generic over the context so the same controller runs on the wall clock
/// or inside the deterministic simulator.
pub struct WheelSession<Ctx>
where
    Ctx: WheelContext,
{
    /// Session identifier (for logging)
    pub session_id: SessionId,

    /// Environment context
    context: Arc<Ctx>,

    entries: EntryList,

    spin: SpinSimulator,

    current_winner: Option<String>,

    history: HistoryLedger,

    /// Bumped on every spin start and every invalidation
    generation: u64,

    /// Timestamp of the last simulated frame while spinning
    last_frame: Option<Duration>,

    /// Frames applied to the current spin
    frame_count: u64,
}

impl<Ctx> WheelSession<Ctx>
where
    Ctx: WheelContext,
{
    /// Creates an empty session.
    pub fn new(context: Arc<Ctx>, config: SpinConfig) -> Self {
        Self::with_id(SessionId::new(), context, config)
    }

    /// Creates an empty session with a fixed identifier.
    pub fn with_id(session_id: SessionId, context: Arc<Ctx>, config: SpinConfig) -> Self {
        debug!(session = %session_id, seed = context.seed(), "Session created");
        Self {
            session_id,
            context,
            entries: EntryList::new(),
            spin: SpinSimulator::new(config),
            current_winner: None,
            history: HistoryLedger::new(),
            generation: 0,
            last_frame: None,
            frame_count: 0,
        }
    }

    // ========== Entry Store ==========

    /// Replaces the entry list from raw text, one entry per line.
    ///
    /// Returns the number of entries kept after trimming and deduplication.
    pub fn load(&mut self, raw: &str) -> usize {
        self.invalidate("load");
        self.entries = EntryList::parse(raw);
        info!(session = %self.session_id, count = self.entries.len(), "Entries loaded");
        self.entries.len()
    }

    /// Shuffles the entries with a freshly seeded PRNG.
    pub fn shuffle(&mut self) {
        self.invalidate("shuffle");
        let seed = self.context.entropy_seed();
        self.entries.shuffle_with(&mut Mulberry32::new(seed));
        debug!(session = %self.session_id, seed, "Entries shuffled");
    }

    /// Full session reset: entries, spin, winner and history.
    pub fn clear(&mut self) {
        self.invalidate("clear");
        self.entries.clear();
        self.history.clear();
        info!(session = %self.session_id, "Session cleared");
    }

    /// Removes the first occurrence of `value`; absent values are a no-op.
    pub fn remove_value(&mut self, value: &str) -> bool {
        if !self.entries.contains(value) {
            return false;
        }
        self.invalidate("remove");
        self.entries.remove_value(value)
    }

    // ========== Spin ==========

    /// Starts a spin.
    ///
    /// Refused with `NoEntries` on an empty wheel and `AlreadySpinning`
    /// while a spin is animating; neither refusal touches any state.
    pub fn spin(&mut self) -> Result<SpinTicket, SessionError> {
        if self.entries.is_empty() {
            warn!(session = %self.session_id, "Spin refused: no entries");
            return Err(SessionError::NoEntries);
        }
        if self.spin.is_spinning() {
            debug!(session = %self.session_id, "Spin refused: already spinning");
            return Err(SessionError::AlreadySpinning);
        }

        let seed = self.context.entropy_seed();
        let SpinLaunch {
            turns,
            duration_secs,
            initial_velocity,
        } = match self.spin.start(&mut Mulberry32::new(seed)) {
            Some(launch) => launch,
            None => return Err(SessionError::AlreadySpinning),
        };

        self.generation += 1;
        self.current_winner = None;
        self.last_frame = Some(self.context.now());
        self.frame_count = 0;

        debug!(
            session = %self.session_id,
            generation = self.generation,
            seed,
            turns,
            duration_secs,
            initial_velocity,
            "Spin started"
        );

        Ok(SpinTicket {
            generation: self.generation,
        })
    }

    /// Applies one frame at timestamp `now`.
    ///
    /// The step size is the time since the previous frame; timestamps that
    /// go backwards count as a zero-length frame. On the frame the wheel
    /// settles, the winner is resolved, the angle snapped onto its sector
    /// and `FrameOutcome::Resolved` returned.
    pub fn advance(&mut self, ticket: SpinTicket, now: Duration) -> Result<FrameOutcome, SessionError> {
        if ticket.generation != self.generation {
            debug!(
                session = %self.session_id,
                stale = ticket.generation,
                current = self.generation,
                "Dropping stale frame"
            );
            return Err(SessionError::StaleFrame(ticket.generation));
        }
        if !self.spin.is_spinning() {
            return Err(SessionError::NotSpinning);
        }

        let last = self.last_frame.unwrap_or(now);
        let dt = now.saturating_sub(last);
        self.last_frame = Some(last.max(now));
        self.frame_count += 1;

        match self.spin.step(dt.as_secs_f64()) {
            StepOutcome::Moving => Ok(FrameOutcome::Continue),
            StepOutcome::Inactive => Err(SessionError::NotSpinning),
            StepOutcome::Settled => self.settle(),
        }
    }

    /// Applies one frame `dt` after the previous one.
    pub fn advance_by(&mut self, ticket: SpinTicket, dt: Duration) -> Result<FrameOutcome, SessionError> {
        let now = self.last_frame.unwrap_or_default() + dt;
        self.advance(ticket, now)
    }

    /// Cancels an in-flight spin without producing a winner.
    ///
    /// Returns `true` if a spin was actually running.
    pub fn cancel_spin(&mut self) -> bool {
        if !self.spin.is_spinning() {
            return false;
        }
        self.generation += 1;
        self.spin.cancel();
        self.last_frame = None;
        info!(session = %self.session_id, frames = self.frame_count, "Spin cancelled");
        true
    }

    /// The display is going away: stop scheduling and drop any pending frame.
    pub fn teardown(&mut self) {
        if !self.cancel_spin() {
            self.generation += 1;
        }
        debug!(session = %self.session_id, "Session torn down");
    }

    fn settle(&mut self) -> Result<FrameOutcome, SessionError> {
        let n = self.entries.len();
        let winner = self
            .spin
            .resolve(n)
            .and_then(|idx| self.entries.get(idx))
            .map(str::to_string);

        self.last_frame = None;

        match winner {
            Some(winner) => {
                info!(
                    session = %self.session_id,
                    winner = %winner,
                    frames = self.frame_count,
                    angle = self.spin.angle(),
                    "Spin resolved"
                );
                self.current_winner = Some(winner.clone());
                Ok(FrameOutcome::Resolved(winner))
            }
            None => {
                self.spin.cancel();
                Err(SessionError::NoEntries)
            }
        }
    }

    // ========== Winner ==========

    /// Copies the current winner out, then removes it and records it.
    ///
    /// On a sink failure nothing changes, so the copy can be retried.
    /// On success the removal and the history entry happen exactly once.
    pub async fn copy_winner<S>(&mut self, sink: &S) -> Result<WinnerRecord, SessionError>
    where
        S: ClipboardSink + ?Sized,
    {
        let winner = self.current_winner.clone().ok_or(SessionError::NoWinner)?;

        if let Err(e) = sink.write_text(&winner).await {
            warn!(session = %self.session_id, winner = %winner, error = %e, "Copy failed");
            return Err(e.into());
        }

        self.remove_value(&winner);
        let record = self.history.record(winner, self.context.system_time());
        self.current_winner = None;
        self.spin.acknowledge();

        info!(
            session = %self.session_id,
            winner = %record.text,
            sequence = record.sequence,
            remaining = self.entries.len(),
            "Winner copied"
        );
        Ok(record)
    }

    // ========== Read-only surface ==========

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn angle(&self) -> f64 {
        self.spin.angle()
    }

    pub fn velocity(&self) -> f64 {
        self.spin.velocity()
    }

    pub fn phase(&self) -> SpinPhase {
        self.spin.phase()
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_spinning()
    }

    pub fn current_winner(&self) -> Option<&str> {
        self.current_winner.as_deref()
    }

    pub fn history(&self) -> Vec<WinnerRecord> {
        self.history.list()
    }

    /// Frames applied to the current or most recent spin.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Magnitudes drawn for the current or most recent spin.
    pub fn launch(&self) -> Option<SpinLaunch> {
        self.spin.launch()
    }

    pub fn context(&self) -> &Arc<Ctx> {
        &self.context
    }

    /// Everything a renderer needs, copied out.
    pub fn snapshot(&self) -> WheelSnapshot {
        WheelSnapshot {
            session_id: self.session_id,
            entries: self.entries.as_slice().to_vec(),
            angle: self.spin.angle(),
            velocity: self.spin.velocity(),
            phase: self.spin.phase(),
            is_spinning: self.spin.is_spinning(),
            current_winner: self.current_winner.clone(),
            history: self.history.list(),
        }
    }

    fn invalidate(&mut self, reason: &str) {
        if self.spin.is_spinning() {
            info!(session = %self.session_id, reason, "Entry change cancelled spin");
        }
        self.generation += 1;
        self.spin.reset();
        self.current_winner = None;
        self.last_frame = None;
        self.frame_count = 0;
    }
}
