//! Linear layout specifications for the ALM engine.
//!
//! This crate implements:
//! - Variables and axis-tagged tabs owned by a [`LinearSpec`]
//! - Hard and soft linear constraints with priority tiers
//! - Solving through any [`LpSolver`] backend, with immutable published
//!   [`Solution`] snapshots
//! - Detached and time-limited solves for callers that must stay responsive

mod assemble;
mod constraint;
mod job;
mod shared;
mod solution;
mod spec;
mod tab;
mod variable;

pub use constraint::{Constraint, ConstraintView};
pub use job::{SolveJob, SolveOutcome};
pub use shared::SharedSpec;
pub use solution::{SolveReport, Solution};
pub use spec::{LinearSpec, SpecState};
pub use tab::{Tab, XTab, YTab};
pub use variable::{SpecId, Summand, Variable, VariableData};

pub use alm_core::{
    Axis, Bounds, LayoutError, LayoutResult, Operator, Optimization, Penalty, SolverConfig,
    Strategy,
};
pub use alm_simplex::{LpSolver, Simplex};
