//! Error types for the ALM engine.

use std::time::Duration;

use thiserror::Error;

use crate::types::Axis;

/// Errors raised while building or solving a layout specification.
///
/// Everything except `Infeasible`, `Unbounded`, `StaleSolution`, `Timeout`
/// and `Solver` is detected locally at construction time and never needs a
/// solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Invalid range [{min}, {max}]: no finite value lies in it")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid penalty weight {weight}: must be finite and non-negative")]
    InvalidWeight { weight: f64 },

    #[error("Invalid coefficient {value}: must be finite")]
    InvalidCoefficient { value: f64 },

    #[error("Constraint has no terms")]
    EmptyConstraint,

    #[error("Variable {variable} belongs to a different specification")]
    ForeignVariable { variable: String },

    #[error("Cannot combine a {left} tab with a {right} tab")]
    AxisMismatch { left: Axis, right: Axis },

    #[error("Unknown variable: {variable}")]
    UnknownVariable { variable: String },

    #[error("Unknown constraint: {constraint}")]
    UnknownConstraint { constraint: String },

    #[error("Specification is closed")]
    Closed,

    #[error("Hard constraints are infeasible")]
    Infeasible,

    #[error("Objective is unbounded")]
    Unbounded,

    #[error("Solution is stale; call solve() after mutating the specification")]
    StaleSolution,

    #[error("Solve did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Solver failure: {0}")]
    Solver(String),
}

impl LayoutError {
    /// Whether the caller can recover by relaxing constraints and solving again.
    pub fn is_unsolvable(&self) -> bool {
        matches!(
            self,
            LayoutError::Infeasible | LayoutError::Unbounded | LayoutError::Timeout(_)
        )
    }
}

pub type LayoutResult<T> = Result<T, LayoutError>;
