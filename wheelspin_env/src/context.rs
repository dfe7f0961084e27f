//! Core environment context trait for WheelSpin sessions.

use async_trait::async_trait;
use std::time::{Duration, SystemTime};

/// The central interface for Environment Interaction.
///
/// This trait abstracts the "real world" so that a wheel session can run
/// against the wall clock (tokio) or inside the deterministic simulator.
///
/// # Implementations
///
/// - **Production**: `SystemContext` - wraps `tokio::time`, `OsRng`
/// - **Simulation**: `SimContext` - virtual clock, `ChaCha8Rng(seed)`
///
/// # Determinism
///
/// Everything that would normally introduce non-determinism
/// (frame timestamps, shuffle and spin seeds) is supplied by the implementation.
#[async_trait]
pub trait WheelContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// Frame timestamps handed to the spin simulator come from here.
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Returns the wall-clock time used to stamp winner records.
    ///
    /// In simulation, this is derived from virtual clock + epoch offset.
    fn system_time(&self) -> SystemTime;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances virtual clock
    async fn sleep(&self, duration: Duration);

    /// Draws a fresh 32-bit seed for a shuffle or spin.
    ///
    /// Production mixes OS entropy with the current time; simulation draws
    /// from a generator derived from the master seed, so a whole run is
    /// reproducible from one number.
    fn entropy_seed(&self) -> u32;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}
