//! Deterministic wheel scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// DST-001: Plain spin at a steady frame rate
    ClassicSpin,

    /// DST-002: Irregular frame gaps, duplicate and backwards timestamps
    JitteryFrames,

    /// DST-003: New entry file loaded while the wheel is turning
    ReloadMidSpin,

    /// DST-004: Session cleared while the wheel is turning
    ClearMidSpin,

    /// DST-005: Display torn down mid-spin, frames keep arriving
    TeardownMidSpin,

    /// DST-006: Spin button hammered during a spin
    SpinWhileSpinning,

    /// DST-007: Spin and copy until the wheel is empty
    DrainWheel,

    /// DST-008: Clipboard refuses, then accepts
    ClipboardDenied,

    /// DST-009: Chi-squared audit of the shuffle
    ShuffleFairness,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::ClassicSpin,
            ScenarioId::JitteryFrames,
            ScenarioId::ReloadMidSpin,
            ScenarioId::ClearMidSpin,
            ScenarioId::TeardownMidSpin,
            ScenarioId::SpinWhileSpinning,
            ScenarioId::DrainWheel,
            ScenarioId::ClipboardDenied,
            ScenarioId::ShuffleFairness,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::ClassicSpin => "classic_spin",
            ScenarioId::JitteryFrames => "jittery_frames",
            ScenarioId::ReloadMidSpin => "reload_mid_spin",
            ScenarioId::ClearMidSpin => "clear_mid_spin",
            ScenarioId::TeardownMidSpin => "teardown_mid_spin",
            ScenarioId::SpinWhileSpinning => "spin_while_spinning",
            ScenarioId::DrainWheel => "drain_wheel",
            ScenarioId::ClipboardDenied => "clipboard_denied",
            ScenarioId::ShuffleFairness => "shuffle_fairness",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::ClassicSpin => "Spin at a steady frame rate, rest angle must match the winner",
            ScenarioId::JitteryFrames => "Random frame gaps plus repeated/backwards timestamps",
            ScenarioId::ReloadMidSpin => "Load a new list mid-spin, old frames must be dropped",
            ScenarioId::ClearMidSpin => "Clear mid-spin, no winner and no further spins",
            ScenarioId::TeardownMidSpin => "Tear down mid-spin, late frames must not resolve",
            ScenarioId::SpinWhileSpinning => "Repeated spin requests must not alter the trajectory",
            ScenarioId::DrainWheel => "Spin and copy until empty, every entry wins exactly once",
            ScenarioId::ClipboardDenied => "Denied copies leave state intact, retry succeeds once",
            ScenarioId::ShuffleFairness => "Shuffle permutations pass a chi-squared uniformity test",
        }
    }

    /// Returns true if this scenario drives the copy action.
    pub fn uses_clipboard(&self) -> bool {
        matches!(self, ScenarioId::DrainWheel | ScenarioId::ClipboardDenied)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic_spin" | "classic" | "dst-001" => Ok(ScenarioId::ClassicSpin),
            "jittery_frames" | "jitter" | "dst-002" => Ok(ScenarioId::JitteryFrames),
            "reload_mid_spin" | "reload" | "dst-003" => Ok(ScenarioId::ReloadMidSpin),
            "clear_mid_spin" | "clear" | "dst-004" => Ok(ScenarioId::ClearMidSpin),
            "teardown_mid_spin" | "teardown" | "dst-005" => Ok(ScenarioId::TeardownMidSpin),
            "spin_while_spinning" | "double_spin" | "dst-006" => Ok(ScenarioId::SpinWhileSpinning),
            "drain_wheel" | "drain" | "dst-007" => Ok(ScenarioId::DrainWheel),
            "clipboard_denied" | "clipboard" | "dst-008" => Ok(ScenarioId::ClipboardDenied),
            "shuffle_fairness" | "fairness" | "dst-009" => Ok(ScenarioId::ShuffleFairness),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert_eq!(scenario.to_string(), scenario.name());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("DST-003".parse::<ScenarioId>(), Ok(ScenarioId::ReloadMidSpin));
        assert_eq!("Teardown".parse::<ScenarioId>(), Ok(ScenarioId::TeardownMidSpin));
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }
}
