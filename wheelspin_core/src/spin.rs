//! The Spin Simulator - exponential-decay wheel physics.
//!
//! Advances a rotation angle by variable time steps. The per-step friction
//! factor is `friction^(dt · reference_fps)`, which makes the speed
//! half-life independent of how often frames actually arrive.
//!
//! # State Machine
//!
//! ```text
//!          start()            step() → Settled, resolve(n)
//!   Idle ──────────► Spinning ───────────────────────────► Resolved
//!    ▲                 │  ▲                                   │
//!    │    cancel()     │  └──────────── start() ──────────────┤
//!    └─────────────────┘                                      │
//!    └──────────────────────── acknowledge() / reset() ───────┘
//! ```

use crate::config::SpinConfig;
use crate::prng::Mulberry32;
use crate::resolver::{resolve_index, snap_angle};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Lifecycle phase of the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    Idle,
    Spinning,
    Resolved,
}

/// Random magnitudes drawn when a spin starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinLaunch {
    /// Full turns the spin was sized for
    pub turns: f64,

    /// Nominal duration in seconds
    pub duration_secs: f64,

    /// Initial angular velocity, `2π · turns / duration` (rad/s)
    pub initial_velocity: f64,
}

/// Result of a single physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still above the stopping threshold
    Moving,

    /// Dropped below the stopping threshold; resolve now
    Settled,

    /// Not spinning; nothing was simulated
    Inactive,
}

/// Time-stepped model of a decelerating wheel.
#[derive(Debug, Clone)]
pub struct SpinSimulator {
    phase: SpinPhase,

    /// Rotation in radians, kept in (-2π, 2π) while spinning
    angle: f64,

    /// Angular velocity in rad/s
    velocity: f64,

    /// Magnitudes of the current or most recent spin
    launch: Option<SpinLaunch>,

    config: SpinConfig,
}

impl SpinSimulator {
    pub fn new(config: SpinConfig) -> Self {
        Self {
            phase: SpinPhase::Idle,
            angle: 0.0,
            velocity: 0.0,
            launch: None,
            config,
        }
    }

    /// Starts a spin from Idle or Resolved.
    ///
    /// Returns `None` without touching any state when already spinning.
    pub fn start(&mut self, rng: &mut Mulberry32) -> Option<SpinLaunch> {
        if self.phase == SpinPhase::Spinning {
            return None;
        }

        let turns = rng.in_range(self.config.turns.start, self.config.turns.end);
        let duration_secs =
            rng.in_range(self.config.duration_secs.start, self.config.duration_secs.end);
        let initial_velocity = TAU * turns / duration_secs;

        let launch = SpinLaunch {
            turns,
            duration_secs,
            initial_velocity,
        };
        self.velocity = initial_velocity;
        self.phase = SpinPhase::Spinning;
        self.launch = Some(launch);
        Some(launch)
    }

    /// Advances the wheel by `dt` seconds.
    ///
    /// Negative or non-finite steps are treated as zero.
    pub fn step(&mut self, dt: f64) -> StepOutcome {
        if self.phase != SpinPhase::Spinning {
            return StepOutcome::Inactive;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.angle = (self.angle + self.velocity * dt) % TAU;
        self.velocity *= self.config.friction.powf(dt * self.config.reference_fps);

        if self.velocity < self.config.stop_threshold {
            StepOutcome::Settled
        } else {
            StepOutcome::Moving
        }
    }

    /// Finishes a spin against an `n`-entry wheel.
    ///
    /// Picks the sector under the pointer, snaps the angle onto that
    /// sector's centre and moves to Resolved. With `n == 0` the spin is
    /// cancelled instead and `None` is returned.
    pub fn resolve(&mut self, n: usize) -> Option<usize> {
        if self.phase != SpinPhase::Spinning {
            return None;
        }
        if n == 0 {
            self.cancel();
            return None;
        }

        let index = resolve_index(self.angle, n);
        self.angle = snap_angle(index, n);
        self.velocity = 0.0;
        self.phase = SpinPhase::Resolved;
        Some(index)
    }

    /// Stops immediately without producing a result.
    pub fn cancel(&mut self) {
        self.velocity = 0.0;
        self.phase = SpinPhase::Idle;
    }

    /// Returns from Resolved to Idle, keeping the rest angle.
    pub fn acknowledge(&mut self) {
        if self.phase == SpinPhase::Resolved {
            self.phase = SpinPhase::Idle;
        }
    }

    /// Back to a fresh, unrotated wheel.
    pub fn reset(&mut self) {
        self.cancel();
        self.angle = 0.0;
        self.launch = None;
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == SpinPhase::Spinning
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn launch(&self) -> Option<SpinLaunch> {
        self.launch
    }

    pub fn config(&self) -> &SpinConfig {
        &self.config
    }
}

impl Default for SpinSimulator {
    fn default() -> Self {
        Self::new(SpinConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn spinning(seed: u32) -> SpinSimulator {
        let mut sim = SpinSimulator::default();
        sim.start(&mut Mulberry32::new(seed)).unwrap();
        sim
    }

    #[test]
    fn test_start_draws_within_ranges() {
        for seed in 0..200 {
            let mut sim = SpinSimulator::default();
            let launch = sim.start(&mut Mulberry32::new(seed)).unwrap();

            assert!((4.0..8.0).contains(&launch.turns));
            assert!((4.0..5.2).contains(&launch.duration_secs));
            assert_relative_eq!(
                launch.initial_velocity,
                TAU * launch.turns / launch.duration_secs,
                epsilon = 1e-12
            );
            assert_eq!(sim.phase(), SpinPhase::Spinning);
            assert!(sim.velocity() > 0.0);
        }
    }

    #[test]
    fn test_start_while_spinning_is_rejected() {
        let mut sim = spinning(1);
        let before = (sim.angle(), sim.velocity(), sim.launch());

        assert!(sim.start(&mut Mulberry32::new(999)).is_none());
        assert_eq!((sim.angle(), sim.velocity(), sim.launch()), before);
    }

    #[test]
    fn test_velocity_decays_monotonically() {
        let mut sim = spinning(5);
        let mut last = sim.velocity();
        for _ in 0..120 {
            sim.step(1.0 / 60.0);
            assert!(sim.velocity() < last);
            last = sim.velocity();
        }
    }

    #[test]
    fn test_decay_independent_of_frame_rate() {
        let mut at_60 = spinning(9);
        let mut at_24 = spinning(9);

        for _ in 0..60 {
            at_60.step(1.0 / 60.0);
        }
        for _ in 0..24 {
            at_24.step(1.0 / 24.0);
        }

        assert_relative_eq!(at_60.velocity(), at_24.velocity(), max_relative = 1e-9);
    }

    #[test]
    fn test_one_reference_frame_applies_friction_once() {
        let mut sim = spinning(2);
        let v0 = sim.velocity();
        sim.step(1.0 / 60.0);
        assert_relative_eq!(sim.velocity(), v0 * 0.995, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_and_negative_steps_change_nothing() {
        let mut sim = spinning(3);
        let before = (sim.angle(), sim.velocity());

        assert_eq!(sim.step(0.0), StepOutcome::Moving);
        assert_eq!(sim.step(-0.5), StepOutcome::Moving);
        assert_eq!(sim.step(f64::NAN), StepOutcome::Moving);
        assert_eq!((sim.angle(), sim.velocity()), before);
    }

    #[test]
    fn test_angle_stays_within_one_turn() {
        let mut sim = spinning(4);
        while sim.step(0.05) == StepOutcome::Moving {
            assert!(sim.angle().abs() < TAU);
        }
    }

    #[test]
    fn test_settles_then_resolves_to_snapped_angle() {
        let mut sim = spinning(77);
        let mut elapsed = 0.0;
        while sim.step(1.0 / 60.0) == StepOutcome::Moving {
            elapsed += 1.0 / 60.0;
            assert!(elapsed < 30.0, "spin never settled");
        }

        let n = 5;
        let index = sim.resolve(n).unwrap();
        assert!(index < n);
        assert_eq!(sim.phase(), SpinPhase::Resolved);
        assert_eq!(sim.velocity(), 0.0);
        assert_relative_eq!(sim.angle(), snap_angle(index, n));
        assert_eq!(resolve_index(sim.angle(), n), index);
    }

    #[test]
    fn test_resolve_uses_pointer_position() {
        let mut sim = spinning(1);
        // Pointer at 0.1 rad on a 4-entry wheel => entry 0
        sim.angle = -0.1 - FRAC_PI_2;
        assert_eq!(sim.resolve(4), Some(0));
        assert_eq!(resolve_index(sim.angle(), 4), 0);
    }

    #[test]
    fn test_resolve_empty_wheel_cancels() {
        let mut sim = spinning(1);
        assert_eq!(sim.resolve(0), None);
        assert_eq!(sim.phase(), SpinPhase::Idle);
        assert_eq!(sim.velocity(), 0.0);
    }

    #[test]
    fn test_cancel_stops_stepping() {
        let mut sim = spinning(8);
        sim.step(0.1);
        sim.cancel();
        let angle = sim.angle();

        assert_eq!(sim.step(0.1), StepOutcome::Inactive);
        assert_eq!(sim.angle(), angle);
        assert_eq!(sim.resolve(3), None);
    }

    #[test]
    fn test_restart_from_resolved() {
        let mut sim = spinning(12);
        sim.step(100.0);
        sim.resolve(3).unwrap();

        assert!(sim.start(&mut Mulberry32::new(13)).is_some());
        assert!(sim.is_spinning());
    }

    #[test]
    fn test_reset_unrotates() {
        let mut sim = spinning(6);
        sim.step(0.3);
        sim.reset();
        assert_eq!(sim.phase(), SpinPhase::Idle);
        assert_eq!(sim.angle(), 0.0);
        assert!(sim.launch().is_none());
    }
}
