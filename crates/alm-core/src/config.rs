//! Solver configuration.

/// How soft constraints of different priorities are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// One linear program; every penalty is summed into a single objective
    /// and priorities are ignored.
    #[default]
    Weighted,
    /// One linear program per priority tier, highest first. Each tier's
    /// optimum is pinned before the next tier is optimized.
    Lexicographic,
}

/// Tuning knobs for [`Strategy`] selection and the numeric backend.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    pub strategy: Strategy,
    /// Values with magnitude below this are treated as zero.
    pub tolerance: f64,
    /// Relative slack allowed when pinning a tier's optimum.
    pub tier_slack: f64,
    /// Pivot cap for a single linear program.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Weighted,
            tolerance: 1e-9,
            tier_slack: 1e-7,
            max_iterations: 10_000,
        }
    }
}

impl SolverConfig {
    pub fn lexicographic() -> Self {
        Self {
            strategy: Strategy::Lexicographic,
            ..Self::default()
        }
    }
}
