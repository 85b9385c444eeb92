//! Linear programming backend for ALM layout specifications.
//!
//! This crate implements:
//! - The [`LinearProgram`] exchange format (objective, sparse rows, bounds)
//! - The [`LpSolver`] adapter trait
//! - [`Simplex`], a bounded two-phase simplex solver

mod problem;
mod simplex;

pub use problem::{LinearProgram, LinearRow, LpError, LpSolution, Relation};
pub use simplex::Simplex;

/// A numeric backend able to minimize a [`LinearProgram`].
///
/// Implementations must be deterministic: the same program always yields
/// the same assignment.
pub trait LpSolver {
    /// Minimize `program.objective` subject to its rows and bounds.
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, LpError>;
}

impl<S: LpSolver + ?Sized> LpSolver for &S {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, LpError> {
        (**self).solve(program)
    }
}
