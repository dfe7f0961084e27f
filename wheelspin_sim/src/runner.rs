//! Scenario runner - executes deterministic wheel scenarios.

use crate::clipboard::SimClipboard;
use crate::context::SimContext;
use crate::exporter::{SimExport, SimFrame};
use crate::fairness::audit_shuffle_fairness;
use crate::scenarios::ScenarioId;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use wheelspin_core::resolver::resolve_index;
use wheelspin_core::{FrameOutcome, SessionError, SpinConfig, SpinPhase, SpinTicket, WheelSession};
use wheelspin_env::{SessionId, WheelContext};

/// Entry list used when none is supplied.
pub const DEFAULT_ENTRIES: &[&str] = &[
    "Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret",
    "Dennis", "Frances", "Edsger", "Radia", "Guido", "Hedy",
];

/// Replacement list loaded by the reload scenario.
const RELOAD_ENTRIES: &str = "Zed\nYara\nXavi";

/// Minimum jitter (ms) for the jittery-frames scenario.
const MIN_SCENARIO_JITTER_MS: f64 = 25.0;

/// Upper bound on configurable jitter (ms).
const MAX_JITTER_MS: f64 = 1_000.0;

/// Default time budget for a single spin.
const DEFAULT_SPIN_BUDGET: Duration = Duration::from_secs(60);

/// Window (seconds into a spin) in which mid-spin interference happens.
/// Well inside the shortest settle time under the default constants.
const INTERRUPTION_WINDOW_SECS: std::ops::Range<f64> = 0.1..1.5;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Frames applied across all spins
    pub total_frames: u64,

    /// Final virtual time in seconds
    pub final_time_secs: f64,

    /// Last resolved winner, if the scenario produced one
    pub winner: Option<String>,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    pub spins_started: u64,
    pub spins_resolved: u64,

    /// Spins ended by invalidation or teardown
    pub spins_cancelled: u64,

    pub frames_applied: u64,

    /// Frames dropped because their spin was no longer current
    pub stale_frames_rejected: u64,

    /// Spin/copy requests refused as no-ops
    pub refused_requests: u64,

    pub copies: u64,
    pub copy_failures: u64,

    /// Largest gap between consecutive frames (ms)
    pub max_frame_gap_ms: f64,
}

/// Produces frame gaps: a fixed interval plus optional half-normal jitter.
struct FrameClock {
    rng: ChaCha8Rng,
    base_secs: f64,
    jitter: Option<Normal<f64>>,
}

impl FrameClock {
    fn new(seed: u64, hz: u32, jitter_ms: f64) -> Self {
        let jitter = if jitter_ms > 0.0 {
            Normal::new(0.0, jitter_ms / 1000.0).ok()
        } else {
            None
        };
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            base_secs: 1.0 / hz.max(1) as f64,
            jitter,
        }
    }

    fn next_gap(&mut self) -> Duration {
        let extra = match &self.jitter {
            Some(normal) => normal.sample(&mut self.rng).abs(),
            None => 0.0,
        };
        Duration::from_secs_f64(self.base_secs + extra)
    }

    /// How long to let a spin run before interfering with it.
    fn interruption_point(&mut self) -> Duration {
        Duration::from_secs_f64(self.rng.gen_range(INTERRUPTION_WINDOW_SECS))
    }
}

/// One session on a virtual clock, plus everything the scenario observes.
struct Harness {
    ctx: Arc<SimContext>,
    session: WheelSession<SimContext>,
    clock: FrameClock,
    metrics: ScenarioMetrics,
    export: SimExport,
    max_spin: Duration,
}

impl Harness {
    fn time_sec(&self) -> f64 {
        self.ctx.now().as_secs_f64()
    }

    fn event(&mut self, message: impl Into<String>, level: Option<&str>) {
        let t = self.time_sec();
        self.export.add_event(t, message, level);
    }

    fn start_spin(&mut self) -> Result<SpinTicket, SessionError> {
        match self.session.spin() {
            Ok(ticket) => {
                self.metrics.spins_started += 1;
                self.event(format!("spin #{} started", ticket.generation()), None);
                Ok(ticket)
            }
            Err(e) => {
                self.metrics.refused_requests += 1;
                self.event(format!("spin refused: {e}"), Some("warn"));
                Err(e)
            }
        }
    }

    /// Advances the virtual clock by one frame gap and delivers the frame.
    fn frame(&mut self, ticket: SpinTicket) -> Result<FrameOutcome, SessionError> {
        let gap = self.clock.next_gap();
        let gap_ms = gap.as_secs_f64() * 1000.0;
        if gap_ms > self.metrics.max_frame_gap_ms {
            self.metrics.max_frame_gap_ms = gap_ms;
        }
        self.ctx.advance_time(gap);
        self.deliver(ticket, self.ctx.now())
    }

    /// Delivers a frame stamped `at` without moving the clock.
    fn deliver(&mut self, ticket: SpinTicket, at: Duration) -> Result<FrameOutcome, SessionError> {
        let result = self.session.advance(ticket, at);
        match &result {
            Ok(_) => {
                self.metrics.frames_applied += 1;
                let frame = SimFrame::capture(self.time_sec(), &self.session.snapshot());
                self.export.add_frame(frame);
            }
            Err(SessionError::StaleFrame(_)) => self.metrics.stale_frames_rejected += 1,
            Err(_) => {}
        }
        result
    }

    /// Runs frames until the wheel resolves or the time budget runs out.
    fn run_to_resolution(&mut self, ticket: SpinTicket) -> Result<String, String> {
        let deadline = self.ctx.now().saturating_add(self.max_spin);
        loop {
            if self.ctx.now() > deadline {
                return Err(format!(
                    "spin did not settle within {:.1}s",
                    self.max_spin.as_secs_f64()
                ));
            }
            let before = self.session.velocity();
            match self.frame(ticket) {
                Ok(FrameOutcome::Continue) => {
                    if self.session.velocity() > before {
                        return Err(format!(
                            "velocity increased from {:.4} to {:.4}",
                            before,
                            self.session.velocity()
                        ));
                    }
                }
                Ok(FrameOutcome::Resolved(winner)) => {
                    self.metrics.spins_resolved += 1;
                    self.event(format!("resolved: {winner}"), None);
                    return Ok(winner);
                }
                Err(e) => return Err(format!("frame rejected mid-spin: {e}")),
            }
        }
    }

    /// Lets the spin run; it must still be running afterwards.
    ///
    /// Frames keep coming until `span` of virtual time has passed, at least
    /// one. Returns the number of frames delivered.
    fn run_frames(&mut self, ticket: SpinTicket, span: Duration) -> Result<u64, String> {
        let until = self.ctx.now().saturating_add(span);
        let mut count = 0u64;
        while count == 0 || self.ctx.now() < until {
            count += 1;
            match self.frame(ticket) {
                Ok(FrameOutcome::Continue) => {}
                Ok(FrameOutcome::Resolved(w)) => {
                    return Err(format!("spin resolved to {w} before the interruption point"));
                }
                Err(e) => return Err(format!("frame rejected: {e}")),
            }
        }
        Ok(count)
    }

    /// The displayed rest position must agree with the reported winner.
    fn check_rest_position(&self, winner: &str) -> Result<(), String> {
        let n = self.session.entries().len();
        if n == 0 {
            return Err("resolved against an empty wheel".to_string());
        }
        let idx = resolve_index(self.session.angle(), n);
        let shown = self.session.entries().get(idx);
        if shown != Some(winner) {
            return Err(format!("pointer shows {:?} but winner is {winner}", shown));
        }
        if self.session.velocity() != 0.0 || self.session.phase() != SpinPhase::Resolved {
            return Err("wheel not at rest after resolution".to_string());
        }
        Ok(())
    }

    /// After an invalidation: idle, unrotated, no winner, old frames dropped.
    fn check_invalidated(&mut self, stale: SpinTicket) -> Result<(), String> {
        if self.session.phase() != SpinPhase::Idle || self.session.angle() != 0.0 {
            return Err(format!("expected idle unrotated wheel, got {:?}", self.session.phase()));
        }
        if let Some(w) = self.session.current_winner() {
            return Err(format!("stale winner {w} survived invalidation"));
        }
        match self.frame(stale) {
            Err(SessionError::StaleFrame(_)) => Ok(()),
            other => Err(format!("late frame was not rejected: {:?}", other)),
        }
    }

    fn finish(
        mut self,
        scenario: ScenarioId,
        seed: u64,
        outcome: Result<Option<String>, String>,
    ) -> (ScenarioResult, SimExport) {
        let final_time_secs = self.time_sec();
        let (passed, winner, failure_reason) = match outcome {
            Ok(winner) => (true, winner, None),
            Err(reason) => (false, None, Some(reason)),
        };
        self.export.finalize(passed, winner.clone());

        let result = ScenarioResult {
            scenario,
            seed,
            passed,
            total_frames: self.metrics.frames_applied,
            final_time_secs,
            winner,
            failure_reason,
            metrics: self.metrics,
        };
        (result, self.export)
    }
}

/// Runs wheel scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Frame rate in Hz
    tick_rate_hz: u32,

    /// Standard deviation of extra frame delay (ms)
    jitter_ms: f64,

    /// Time budget for a single spin
    max_duration: Duration,

    config: SpinConfig,

    entries: Vec<String>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tick_rate_hz: 60,
            jitter_ms: 0.0,
            max_duration: DEFAULT_SPIN_BUDGET,
            config: SpinConfig::default(),
            entries: DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Sets the frame rate.
    pub fn with_frame_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz.max(1);
        self
    }

    /// Sets frame jitter (ms), clamped to `0..=1000`.
    pub fn with_jitter(mut self, jitter_ms: f64) -> Self {
        if jitter_ms.is_finite() {
            self.jitter_ms = jitter_ms.clamp(0.0, MAX_JITTER_MS);
        } else {
            warn!("Ignoring non-finite jitter {}; frames stay at a fixed rate", jitter_ms);
            self.jitter_ms = 0.0;
        }
        self
    }

    /// Sets the per-spin time budget in seconds.
    ///
    /// Values that are not a positive, representable duration are ignored
    /// and the current budget is kept.
    pub fn with_duration(mut self, secs: f64) -> Self {
        match Duration::try_from_secs_f64(secs) {
            Ok(budget) if !budget.is_zero() => self.max_duration = budget,
            _ => warn!(
                "Ignoring spin budget {}s; keeping {:.1}s",
                secs,
                self.max_duration.as_secs_f64()
            ),
        }
        self
    }

    /// Sets the spin physics.
    pub fn with_config(mut self, config: SpinConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the entry list; fewer than two entries keeps the current list.
    pub fn with_entries(mut self, entries: Vec<String>) -> Self {
        if entries.len() >= 2 {
            self.entries = entries;
        } else {
            warn!(
                "Scenarios need at least 2 entries, got {}; keeping the {} current entries",
                entries.len(),
                self.entries.len()
            );
        }
        self
    }

    /// Per-spin time budget.
    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Entries loaded by each scenario.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Runs a scenario and returns the result.
    pub async fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_exported(scenario).await.0
    }

    /// Runs a scenario and also returns its frame-by-frame export.
    pub async fn run_exported(&self, scenario: ScenarioId) -> (ScenarioResult, SimExport) {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let mut h = self.harness(scenario);
        let outcome = match scenario {
            ScenarioId::ClassicSpin => self.run_classic_spin(&mut h),
            ScenarioId::JitteryFrames => self.run_jittery_frames(&mut h),
            ScenarioId::ReloadMidSpin => self.run_reload_mid_spin(&mut h),
            ScenarioId::ClearMidSpin => self.run_clear_mid_spin(&mut h),
            ScenarioId::TeardownMidSpin => self.run_teardown_mid_spin(&mut h),
            ScenarioId::SpinWhileSpinning => self.run_spin_while_spinning(&mut h),
            ScenarioId::DrainWheel => self.run_drain_wheel(&mut h).await,
            ScenarioId::ClipboardDenied => self.run_clipboard_denied(&mut h).await,
            ScenarioId::ShuffleFairness => self.run_shuffle_fairness(&mut h),
        };

        if let Err(reason) = &outcome {
            warn!("{} failed: {}", scenario.name(), reason);
        }
        h.finish(scenario, self.seed, outcome)
    }

    fn harness(&self, scenario: ScenarioId) -> Harness {
        // Separate streams so changing frame timing never changes spin seeds
        let context_seed = self.seed;
        let clock_seed = self.seed.wrapping_mul(0x9e3779b97f4a7c15);

        let jitter_ms = if scenario == ScenarioId::JitteryFrames {
            self.jitter_ms.max(MIN_SCENARIO_JITTER_MS)
        } else {
            self.jitter_ms
        };

        let ctx = SimContext::shared(context_seed);
        let session = WheelSession::with_id(
            SessionId::from_seed(self.seed),
            ctx.clone(),
            self.config.clone(),
        );

        let mut export = SimExport::new(scenario.name(), self.seed);
        export.entries = self.entries.clone();

        Harness {
            ctx,
            session,
            clock: FrameClock::new(clock_seed, self.tick_rate_hz, jitter_ms),
            metrics: ScenarioMetrics::default(),
            export,
            max_spin: self.max_duration,
        }
    }

    fn entries_text(&self) -> String {
        self.entries.join("\n")
    }

    /// DST-001: ClassicSpin - load, shuffle, spin to rest.
    ///
    /// **Assertion**: the pointer rests on the reported winner, velocity 0.
    fn run_classic_spin(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-001: ClassicSpin - steady {}Hz frames", self.tick_rate_hz);

        h.session.load(&self.entries_text());
        h.session.shuffle();
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let winner = h.run_to_resolution(ticket)?;
        h.check_rest_position(&winner)?;

        info!(
            "✓ ClassicSpin complete: {} after {} frames ({:.2}s)",
            winner,
            h.metrics.frames_applied,
            h.time_sec()
        );
        Ok(Some(winner))
    }

    /// DST-002: JitteryFrames - irregular gaps, repeated and backwards stamps.
    ///
    /// **Assertion**: repeated/backwards timestamps are zero-length frames,
    /// velocity never increases, the rest position matches the winner.
    fn run_jittery_frames(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-002: JitteryFrames - irregular frame delivery");

        h.session.load(&self.entries_text());
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let deadline = h.ctx.now().saturating_add(self.max_duration);

        let mut frame_no = 0u64;
        let winner = loop {
            if h.ctx.now() > deadline {
                return Err("spin did not settle under jitter".to_string());
            }
            frame_no += 1;

            let before = h.session.velocity();
            match h.frame(ticket) {
                Ok(FrameOutcome::Resolved(w)) => {
                    h.metrics.spins_resolved += 1;
                    break w;
                }
                Ok(FrameOutcome::Continue) if h.session.velocity() > before => {
                    return Err("velocity increased under jitter".to_string());
                }
                Ok(FrameOutcome::Continue) => {}
                Err(e) => return Err(format!("frame rejected mid-spin: {e}")),
            }

            let replay_at = match frame_no {
                n if n % 11 == 0 => Some(h.ctx.now().saturating_sub(Duration::from_millis(5))),
                n if n % 7 == 0 => Some(h.ctx.now()),
                _ => None,
            };
            if let Some(at) = replay_at {
                let (angle, velocity) = (h.session.angle(), h.session.velocity());
                match h.deliver(ticket, at) {
                    Ok(FrameOutcome::Continue) => {}
                    other => return Err(format!("replayed timestamp produced {:?}", other)),
                }
                if (h.session.angle(), h.session.velocity()) != (angle, velocity) {
                    return Err(format!("replayed timestamp moved the wheel at frame {frame_no}"));
                }
            }

            if frame_no % 60 == 0 {
                debug!("  t={:.1}s | ω={:.3} rad/s", h.time_sec(), h.session.velocity());
            }
        };

        h.check_rest_position(&winner)?;
        info!(
            "✓ JitteryFrames complete: {} (max gap {:.1}ms)",
            winner, h.metrics.max_frame_gap_ms
        );
        Ok(Some(winner))
    }

    /// DST-003: ReloadMidSpin - replace the list while the wheel turns.
    ///
    /// **Assertion**: no winner from the old list; the next spin resolves
    /// against the new list.
    fn run_reload_mid_spin(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-003: ReloadMidSpin - entry file replaced mid-spin");

        h.session.load(&self.entries_text());
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let span = h.clock.interruption_point();
        let k = h.run_frames(ticket, span)?;

        info!("  ⚡ Reloading entries after {} frames", k);
        h.session.load(RELOAD_ENTRIES);
        h.metrics.spins_cancelled += 1;
        h.event("entries reloaded mid-spin", Some("warn"));
        h.check_invalidated(ticket)?;

        let ticket = h.start_spin().map_err(|e| format!("respin refused: {e}"))?;
        let winner = h.run_to_resolution(ticket)?;
        h.check_rest_position(&winner)?;
        if !RELOAD_ENTRIES.lines().any(|l| l == winner) {
            return Err(format!("winner {winner} is not from the reloaded list"));
        }

        info!("✓ ReloadMidSpin complete: {}", winner);
        Ok(Some(winner))
    }

    /// DST-004: ClearMidSpin - clear the session while the wheel turns.
    ///
    /// **Assertion**: idle, no winner, late frames dropped, spin refused.
    fn run_clear_mid_spin(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-004: ClearMidSpin - session cleared mid-spin");

        h.session.load(&self.entries_text());
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let span = h.clock.interruption_point();
        let k = h.run_frames(ticket, span)?;

        h.session.clear();
        h.metrics.spins_cancelled += 1;
        h.event("session cleared mid-spin", Some("warn"));
        h.check_invalidated(ticket)?;

        match h.start_spin() {
            Err(SessionError::NoEntries) => {}
            other => return Err(format!("spin on a cleared wheel returned {:?}", other)),
        }

        info!("✓ ClearMidSpin complete after {} frames", k);
        Ok(None)
    }

    /// DST-005: TeardownMidSpin - the display goes away, frames keep coming.
    ///
    /// **Assertion**: every late frame is rejected, no winner; the entries
    /// survive and a fresh spin still works.
    fn run_teardown_mid_spin(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-005: TeardownMidSpin - display discarded mid-spin");

        h.session.load(&self.entries_text());
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let span = h.clock.interruption_point();
        let k = h.run_frames(ticket, span)?;

        h.session.teardown();
        h.metrics.spins_cancelled += 1;
        h.event("display torn down", Some("warn"));

        // Five seconds of frames that were already scheduled
        let late_frames = self.tick_rate_hz as u64 * 5;
        for _ in 0..late_frames {
            match h.frame(ticket) {
                Err(SessionError::StaleFrame(_)) => {}
                other => return Err(format!("late frame after teardown returned {:?}", other)),
            }
        }
        if h.session.current_winner().is_some() || h.session.phase() != SpinPhase::Idle {
            return Err("teardown produced a result".to_string());
        }

        let ticket = h.start_spin().map_err(|e| format!("spin after teardown refused: {e}"))?;
        let winner = h.run_to_resolution(ticket)?;
        h.check_rest_position(&winner)?;

        info!(
            "✓ TeardownMidSpin complete: torn down after {} frames, {} late frames dropped",
            k, h.metrics.stale_frames_rejected
        );
        Ok(Some(winner))
    }

    /// DST-006: SpinWhileSpinning - spin pressed on every frame.
    ///
    /// Runs a shadow session with the same seed and no extra presses.
    /// **Assertion**: both trajectories are identical frame for frame.
    fn run_spin_while_spinning(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-006: SpinWhileSpinning - repeated spin requests");

        let shadow_ctx = SimContext::shared(self.seed);
        let mut shadow = WheelSession::with_id(
            SessionId::from_seed(self.seed),
            shadow_ctx.clone(),
            self.config.clone(),
        );

        h.session.load(&self.entries_text());
        shadow.load(&self.entries_text());
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let shadow_ticket = shadow.spin().map_err(|e| format!("shadow spin refused: {e}"))?;

        let deadline = h.ctx.now().saturating_add(self.max_duration);
        let winner = loop {
            if h.ctx.now() > deadline {
                return Err("spin did not settle".to_string());
            }
            match h.start_spin() {
                Err(SessionError::AlreadySpinning) => {}
                other => return Err(format!("repeat spin returned {:?}", other)),
            }

            let outcome = h.frame(ticket).map_err(|e| format!("frame rejected: {e}"))?;
            shadow_ctx.set_time(h.ctx.time_ns());
            let shadow_outcome = shadow
                .advance(shadow_ticket, shadow_ctx.now())
                .map_err(|e| format!("shadow frame rejected: {e}"))?;

            if outcome != shadow_outcome
                || h.session.angle() != shadow.angle()
                || h.session.velocity() != shadow.velocity()
            {
                return Err(format!(
                    "trajectory diverged at t={:.3}s: angle {} vs {}",
                    h.time_sec(),
                    h.session.angle(),
                    shadow.angle()
                ));
            }

            if let FrameOutcome::Resolved(w) = outcome {
                h.metrics.spins_resolved += 1;
                break w;
            }
        };

        h.check_rest_position(&winner)?;
        info!(
            "✓ SpinWhileSpinning complete: {} presses ignored",
            h.metrics.refused_requests
        );
        Ok(Some(winner))
    }

    /// DST-007: DrainWheel - spin and copy until nothing is left.
    ///
    /// **Assertion**: each entry wins exactly once, sequence numbers run
    /// 1..=n, the clipboard saw every winner once.
    async fn run_drain_wheel(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-007: DrainWheel - {} entries", self.entries.len());

        let clipboard = SimClipboard::new();
        h.session.load(&self.entries_text());
        let total = h.session.entries().len();

        let mut last = None;
        for expected_seq in 1..=total as u64 {
            let ticket = h.start_spin().map_err(|e| format!("spin {expected_seq} refused: {e}"))?;
            let winner = h.run_to_resolution(ticket)?;
            h.check_rest_position(&winner)?;

            let record = h
                .session
                .copy_winner(&clipboard)
                .await
                .map_err(|e| format!("copy failed: {e}"))?;
            h.metrics.copies += 1;
            h.event(format!("copied #{} {}", record.sequence, record.text), None);

            if record.sequence != expected_seq || record.text != winner {
                return Err(format!(
                    "expected record #{expected_seq} {winner}, got #{} {}",
                    record.sequence, record.text
                ));
            }
            if h.session.entries().contains(&winner) {
                return Err(format!("{winner} still on the wheel after copy"));
            }
            last = Some(winner);
        }

        let history = h.session.history();
        let distinct: HashSet<&str> = history.iter().map(|r| r.text.as_str()).collect();
        if history.len() != total || distinct.len() != total {
            return Err(format!(
                "history has {} records ({} distinct), expected {}",
                history.len(),
                distinct.len(),
                total
            ));
        }
        if clipboard.writes().len() != total {
            return Err(format!("clipboard saw {} writes", clipboard.writes().len()));
        }
        match h.start_spin() {
            Err(SessionError::NoEntries) => {}
            other => return Err(format!("spin on drained wheel returned {:?}", other)),
        }

        info!("✓ DrainWheel complete: {} winners recorded", history.len());
        Ok(last)
    }

    /// DST-008: ClipboardDenied - copy refused twice, then accepted.
    ///
    /// **Assertion**: refusals change nothing; the accepted copy removes
    /// and records the winner exactly once.
    async fn run_clipboard_denied(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-008: ClipboardDenied - retry after denial");

        let clipboard = SimClipboard::new();
        h.session.load(&self.entries_text());
        let total = h.session.entries().len();
        let ticket = h.start_spin().map_err(|e| format!("spin refused: {e}"))?;
        let winner = h.run_to_resolution(ticket)?;

        clipboard.deny_next(2);
        for attempt in 1..=2 {
            match h.session.copy_winner(&clipboard).await {
                Err(SessionError::Clipboard(_)) => h.metrics.copy_failures += 1,
                other => return Err(format!("denied copy #{attempt} returned {:?}", other)),
            }
            if h.session.current_winner() != Some(winner.as_str())
                || h.session.entries().len() != total
                || !h.session.history().is_empty()
            {
                return Err(format!("denied copy #{attempt} changed session state"));
            }
        }

        let record = h
            .session
            .copy_winner(&clipboard)
            .await
            .map_err(|e| format!("retry failed: {e}"))?;
        h.metrics.copies += 1;

        if record.sequence != 1 || record.text != winner {
            return Err(format!("unexpected record #{} {}", record.sequence, record.text));
        }
        if clipboard.writes() != vec![winner.clone()] || h.session.history().len() != 1 {
            return Err("winner was not recorded exactly once".to_string());
        }
        match h.session.copy_winner(&clipboard).await {
            Err(SessionError::NoWinner) => h.metrics.refused_requests += 1,
            other => return Err(format!("second copy returned {:?}", other)),
        }

        info!(
            "✓ ClipboardDenied complete: {} after {} denials",
            winner, h.metrics.copy_failures
        );
        Ok(Some(winner))
    }

    /// DST-009: ShuffleFairness - chi-squared over 4-entry permutations.
    fn run_shuffle_fairness(&self, h: &mut Harness) -> Result<Option<String>, String> {
        info!("DST-009: ShuffleFairness - permutation uniformity");

        let report = audit_shuffle_fairness(4, 24_000, self.seed, 0.001);
        h.event(
            format!(
                "chi2={:.2} df={} p={:.4} seen={}/{}",
                report.chi_squared,
                report.degrees_of_freedom,
                report.p_value,
                report.permutations_seen,
                report.permutations_possible
            ),
            None,
        );

        if !report.passed {
            return Err(format!(
                "shuffle failed uniformity: chi2={:.2}, p={:.5}",
                report.chi_squared, report.p_value
            ));
        }

        info!("✓ ShuffleFairness complete: p={:.4}", report.p_value);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_frame_gap_never_below_base(seed in any::<u64>(), hz in 1u32..240, jitter in 0.0f64..50.0) {
            let mut clock = FrameClock::new(seed, hz, jitter);
            let base = Duration::from_secs_f64(1.0 / hz as f64);
            for _ in 0..50 {
                prop_assert!(clock.next_gap() >= base);
            }
        }
    }

    #[tokio::test]
    async fn test_all_scenarios_pass_default_seed() {
        let runner = ScenarioRunner::new(42);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario).await;
            assert!(
                result.passed,
                "{} failed: {:?}",
                scenario,
                result.failure_reason
            );
        }
    }

    #[tokio::test]
    async fn test_classic_spin_many_seeds() {
        for seed in 0..25 {
            let result = ScenarioRunner::new(seed).run(ScenarioId::ClassicSpin).await;
            assert!(result.passed, "seed {seed}: {:?}", result.failure_reason);
            assert!(result.winner.is_some());
        }
    }

    #[tokio::test]
    async fn test_same_seed_same_outcome() {
        let a = ScenarioRunner::new(7).with_jitter(10.0).run(ScenarioId::ClassicSpin).await;
        let b = ScenarioRunner::new(7).with_jitter(10.0).run(ScenarioId::ClassicSpin).await;
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.total_frames, b.total_frames);
        assert_eq!(a.final_time_secs, b.final_time_secs);
    }

    #[tokio::test]
    async fn test_low_frame_rate_still_resolves() {
        let result = ScenarioRunner::new(3)
            .with_frame_rate(12)
            .run(ScenarioId::JitteryFrames)
            .await;
        assert!(result.passed, "{:?}", result.failure_reason);
    }

    #[tokio::test]
    async fn test_teardown_counts_stale_frames() {
        let result = ScenarioRunner::new(5).run(ScenarioId::TeardownMidSpin).await;
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.stale_frames_rejected >= 300);
        assert_eq!(result.metrics.spins_cancelled, 1);
    }

    #[tokio::test]
    async fn test_drain_wheel_small_list() {
        let entries = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let result = ScenarioRunner::new(11)
            .with_entries(entries)
            .run(ScenarioId::DrainWheel)
            .await;
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.copies, 3);
        assert_eq!(result.metrics.spins_resolved, 3);
    }

    #[tokio::test]
    async fn test_export_has_frames_and_events() {
        let (result, export) = ScenarioRunner::new(9)
            .run_exported(ScenarioId::ReloadMidSpin)
            .await;
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(export.frames.len() as u64, result.total_frames);
        assert!(export.events.iter().any(|e| e.message.contains("reloaded")));
        assert_eq!(export.winner, result.winner);
        assert!(export.frames.last().map(|f| f.winner.is_some()).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_mid_spin_scenarios_at_low_frame_rates() {
        let mid_spin = [
            ScenarioId::ReloadMidSpin,
            ScenarioId::ClearMidSpin,
            ScenarioId::TeardownMidSpin,
        ];
        for hz in [1, 5, 12] {
            for seed in 0..20 {
                let runner = ScenarioRunner::new(seed).with_frame_rate(hz);
                for scenario in mid_spin {
                    let result = runner.run(scenario).await;
                    assert!(
                        result.passed,
                        "{scenario} at {hz}Hz seed {seed}: {:?}",
                        result.failure_reason
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_mid_spin_scenarios_under_heavy_jitter() {
        for seed in 0..10 {
            let runner = ScenarioRunner::new(seed).with_jitter(500.0);
            for scenario in [ScenarioId::ReloadMidSpin, ScenarioId::ClearMidSpin] {
                let result = runner.run(scenario).await;
                assert!(result.passed, "{scenario} seed {seed}: {:?}", result.failure_reason);
            }
        }
    }

    #[test]
    fn test_interruption_point_inside_window() {
        let mut clock = FrameClock::new(99, 60, 0.0);
        for _ in 0..500 {
            let secs = clock.interruption_point().as_secs_f64();
            let window = INTERRUPTION_WINDOW_SECS;
            assert!(secs >= window.start && secs <= window.end, "{secs}");
        }
    }

    #[tokio::test]
    async fn test_invalid_duration_keeps_budget() {
        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e300] {
            let runner = ScenarioRunner::new(1).with_duration(bad);
            assert_eq!(runner.max_duration(), DEFAULT_SPIN_BUDGET, "budget {bad}");

            let result = runner.run(ScenarioId::ClassicSpin).await;
            assert!(result.passed, "budget {bad}: {:?}", result.failure_reason);
        }
    }

    #[test]
    fn test_valid_duration_is_applied() {
        let runner = ScenarioRunner::new(1).with_duration(2.5);
        assert_eq!(runner.max_duration(), Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn test_non_finite_jitter_is_ignored() {
        let result = ScenarioRunner::new(4)
            .with_jitter(f64::INFINITY)
            .run(ScenarioId::ClassicSpin)
            .await;
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.metrics.max_frame_gap_ms < 17.0);
    }

    #[test]
    fn test_short_entry_list_keeps_current() {
        let runner = ScenarioRunner::new(1).with_entries(vec!["solo".to_string()]);
        assert_eq!(runner.entries().len(), DEFAULT_ENTRIES.len());

        let runner = runner.with_entries(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(runner.entries(), ["x".to_string(), "y".to_string()]);
    }

    #[tokio::test]
    async fn test_short_budget_reports_failure() {
        let result = ScenarioRunner::new(1)
            .with_duration(0.5)
            .run(ScenarioId::ClassicSpin)
            .await;
        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("did not settle"));
    }
}
