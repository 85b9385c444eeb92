//! Detached solves.
//!
//! [`LinearSpec::prepare`](crate::LinearSpec::prepare) snapshots the
//! specification into a [`SolveJob`] that owns everything the solver needs,
//! so the job can run on another thread while the specification stays
//! available. [`LinearSpec::publish`](crate::LinearSpec::publish) accepts
//! the resulting [`SolveOutcome`] only if nothing was mutated in between.

use std::time::{Duration, Instant};

use alm_core::{LayoutResult, SolverConfig};
use alm_simplex::{LpSolver, Simplex};
use log::debug;

use crate::assemble::{Assembly, Assignment};
use crate::variable::SpecId;

/// A self-contained solve of one specification generation.
#[derive(Debug, Clone)]
pub struct SolveJob {
    pub(crate) spec: SpecId,
    pub(crate) generation: u64,
    pub(crate) assembly: Assembly,
    pub(crate) config: SolverConfig,
}

impl SolveJob {
    /// Generation of the specification this job was prepared from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The default backend, configured from the specification's config.
    pub fn solver(&self) -> Simplex {
        Simplex::new()
            .with_tolerance(self.config.tolerance)
            .with_max_iterations(self.config.max_iterations)
    }

    /// Run the job. Pure: touches nothing but the job itself.
    pub fn run<S: LpSolver + ?Sized>(self, solver: &S) -> SolveOutcome {
        debug!(
            "solving generation {}: {} variables, {} columns, {} rows",
            self.generation,
            self.assembly.variables.len(),
            self.assembly.num_columns(),
            self.assembly.num_rows()
        );

        let started = Instant::now();
        let result = self.assembly.run(solver);

        SolveOutcome {
            spec: self.spec,
            generation: self.generation,
            variables: self.assembly.variables,
            result,
            elapsed: started.elapsed(),
        }
    }
}

/// Result of running a [`SolveJob`], waiting to be published.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub(crate) spec: SpecId,
    pub(crate) generation: u64,
    pub(crate) variables: Vec<u32>,
    pub(crate) result: LayoutResult<Assignment>,
    pub(crate) elapsed: Duration,
}

impl SolveOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use crate::{LinearSpec, Operator, SolverConfig};

    #[test]
    fn test_solver_follows_config() {
        let mut spec = LinearSpec::with_config(SolverConfig {
            max_iterations: 7,
            ..SolverConfig::default()
        });
        spec.add_variable().unwrap();

        let solver = spec.prepare().unwrap().solver();
        assert_eq!(solver.max_iterations(), 7);
    }

    #[test]
    fn test_job_outlives_mutation() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.add_constraint([(1.0, x)], Operator::Ge, 3.0).unwrap();

        let job = spec.prepare().unwrap();
        assert_eq!(job.generation(), spec.generation());
        spec.add_constraint([(1.0, x)], Operator::Le, 1.0).unwrap();

        // The job still solves the contents it was prepared from
        let outcome = job.run(&alm_simplex::Simplex::new());
        assert!(outcome.is_success());
        assert!(outcome.generation() < spec.generation());
    }

    #[test]
    fn test_failed_outcome() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.add_constraint([(1.0, x)], Operator::Ge, 3.0).unwrap();
        spec.add_constraint([(1.0, x)], Operator::Le, 1.0).unwrap();

        let job = spec.prepare().unwrap();
        let solver = job.solver();
        assert!(!job.run(&solver).is_success());
    }
}
