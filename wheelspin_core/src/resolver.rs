//! The Winner Resolver - angle to index, and back.
//!
//! The pointer sits at the top of the wheel, which is `-π/2` in the
//! wheel's own rotated frame. Entry `i` owns the sector
//! `[i·step, (i+1)·step)` with `step = 2π/n`.
//!
//! ```text
//!              pointer
//!                 ▼
//!            ┌─────────┐
//!          ╱  i = 0     ╲
//!         │ n-1      1   │   rotation = angle (radians)
//!          ╲     ...    ╱
//!            └─────────┘
//! ```
//!
//! `resolve_index` and `snap_angle` are mutually consistent: snapping to a
//! sector and resolving the result always gives the same index back.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::Range;

/// Maps any real radian value into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Angular width of one sector on an `n`-entry wheel.
pub fn sector_width(n: usize) -> f64 {
    TAU / n as f64
}

/// Index of the entry under the pointer for a wheel rotated by `angle`.
///
/// `n` must be at least 1; the spin simulator guarantees this at resolution
/// time. Use [`try_resolve_index`] when that is not already established.
pub fn resolve_index(angle: f64, n: usize) -> usize {
    debug_assert!(n > 0, "resolve_index on an empty wheel");
    let pointer = normalize_angle(-angle - FRAC_PI_2);
    let idx = (pointer / sector_width(n)).floor() as usize;
    idx % n
}

/// Checked variant of [`resolve_index`]: `None` for an empty wheel.
pub fn try_resolve_index(angle: f64, n: usize) -> Option<usize> {
    (n > 0).then(|| resolve_index(angle, n))
}

/// Wheel rotation that centres sector `index` exactly under the pointer.
pub fn snap_angle(index: usize, n: usize) -> f64 {
    let center = (index as f64 + 0.5) * sector_width(n);
    -(center + FRAC_PI_2)
}

/// Sector bounds for entry `index`, in the wheel's own frame.
pub fn sector_of(index: usize, n: usize) -> Range<f64> {
    let step = sector_width(n);
    (index as f64 * step)..((index + 1) as f64 * step)
}
