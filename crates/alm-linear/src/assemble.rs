//! Assembly of a specification into linear programs.
//!
//! Hard constraints become rows unchanged. A soft constraint gets one
//! non-negative slack column (two for equalities) that absorbs its
//! violation; the slack's cost is the constraint's penalty weight. A
//! preferred value is a soft equality in tier 0.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use alm_core::{LayoutError, LayoutResult, Operator, Optimization, SolverConfig, Strategy};
use alm_simplex::{LinearProgram, LinearRow, LpError, LpSolution, LpSolver, Relation};
use indexmap::IndexMap;
use log::trace;
use smallvec::SmallVec;

use crate::constraint::{ConstraintData, Objective};
use crate::variable::VariableData;

type RowTerms = SmallVec<[(usize, f64); 4]>;

/// Result of running an [`Assembly`].
#[derive(Debug, Clone)]
pub(crate) struct Assignment {
    /// One value per specification variable, in column order
    pub(crate) values: Vec<f64>,
    pub(crate) iterations: usize,
    pub(crate) stages: usize,
    /// Total penalty plus caller objective, in minimization form
    pub(crate) objective: f64,
}

/// A specification flattened into solver columns and rows.
#[derive(Debug, Clone)]
pub(crate) struct Assembly {
    /// Variable id of each leading column
    pub(crate) variables: Vec<u32>,
    /// Rows and bounds; the objective is filled in per stage
    program: LinearProgram,
    /// Slack costs per priority tier, highest priority first
    tiers: BTreeMap<Reverse<i32>, Vec<(usize, f64)>>,
    /// Caller objective in minimization form
    objective: Vec<(usize, f64)>,
    strategy: Strategy,
    tier_slack: f64,
}

impl Assembly {
    pub(crate) fn build(
        variables: &IndexMap<u32, VariableData>,
        constraints: &IndexMap<u32, ConstraintData>,
        objective: Option<&Objective>,
        config: &SolverConfig,
    ) -> Self {
        let mut assembly = Self {
            variables: variables.keys().copied().collect(),
            program: LinearProgram::new(),
            tiers: BTreeMap::new(),
            objective: Vec::new(),
            strategy: config.strategy,
            tier_slack: config.tier_slack,
        };

        for data in variables.values() {
            assembly
                .program
                .add_column(0.0, data.bounds.min, data.bounds.max);
        }

        let columns = |terms: &[crate::Summand]| -> RowTerms {
            terms
                .iter()
                .filter_map(|term| {
                    variables
                        .get_index_of(&term.variable.id)
                        .map(|column| (column, term.coefficient))
                })
                .collect()
        };

        for constraint in constraints.values() {
            let terms = columns(&constraint.terms[..]);
            let relation = relation(constraint.op);
            match constraint.penalty {
                None => {
                    assembly
                        .program
                        .add_row(LinearRow::new(terms, relation, constraint.rhs));
                }
                Some(penalty) => {
                    assembly.add_soft_row(terms, relation, constraint.rhs, penalty.weight, penalty.priority);
                }
            }
        }

        for (column, data) in variables.values().enumerate() {
            if let Some(preferred) = data.preferred {
                let mut terms = RowTerms::new();
                terms.push((column, 1.0));
                assembly.add_soft_row(terms, Relation::Equal, preferred, data.penalty, 0);
            }
        }

        if let Some(objective) = objective {
            let sign = match objective.direction {
                Optimization::Minimize => 1.0,
                Optimization::Maximize => -1.0,
            };
            assembly.objective = columns(&objective.terms[..])
                .into_iter()
                .map(|(column, coefficient)| (column, sign * coefficient))
                .collect();
        }

        assembly
    }

    fn add_soft_row(&mut self, mut terms: RowTerms, relation: Relation, rhs: f64, weight: f64, priority: i32) {
        let costs = self.tiers.entry(Reverse(priority)).or_default();
        match relation {
            Relation::LessOrEqual => {
                let slack = self.program.add_column(0.0, 0.0, f64::INFINITY);
                terms.push((slack, -1.0));
                costs.push((slack, weight));
            }
            Relation::GreaterOrEqual => {
                let slack = self.program.add_column(0.0, 0.0, f64::INFINITY);
                terms.push((slack, 1.0));
                costs.push((slack, weight));
            }
            Relation::Equal => {
                let under = self.program.add_column(0.0, 0.0, f64::INFINITY);
                let over = self.program.add_column(0.0, 0.0, f64::INFINITY);
                terms.push((under, 1.0));
                terms.push((over, -1.0));
                costs.push((under, weight));
                costs.push((over, weight));
            }
        }
        self.program.add_row(LinearRow::new(terms, relation, rhs));
    }

    pub(crate) fn num_columns(&self) -> usize {
        self.program.num_columns()
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.program.rows.len()
    }

    /// Solve the assembled program with `solver` according to the strategy.
    pub(crate) fn run<S: LpSolver + ?Sized>(&self, solver: &S) -> LayoutResult<Assignment> {
        let mut program = self.program.clone();
        let mut iterations = 0;
        let mut stages = 0;

        let mut stage = |program: &LinearProgram| -> LayoutResult<LpSolution> {
            let solution = solver.solve(program).map_err(lp_error)?;
            iterations += solution.iterations;
            stages += 1;
            Ok(solution)
        };

        let solution = match self.strategy {
            Strategy::Weighted => {
                for &(column, cost) in self.tiers.values().flatten().chain(&self.objective) {
                    program.objective[column] += cost;
                }
                stage(&program)?
            }
            Strategy::Lexicographic => {
                let mut last = None;
                for (Reverse(priority), costs) in &self.tiers {
                    if costs.iter().all(|&(_, weight)| weight == 0.0) {
                        continue;
                    }

                    program.objective.fill(0.0);
                    for &(column, weight) in costs {
                        program.objective[column] += weight;
                    }
                    let solution = stage(&program)?;
                    let optimum = solution.objective;
                    trace!("tier {priority}: optimal penalty {optimum}");

                    // Pin this tier before optimizing lower ones
                    let limit = optimum + self.tier_slack * (1.0 + optimum.abs());
                    program.add_row(LinearRow::new(costs.iter().copied(), Relation::LessOrEqual, limit));
                    last = Some(solution);
                }

                match last {
                    Some(solution) if self.objective.is_empty() => solution,
                    _ => {
                        program.objective.fill(0.0);
                        for &(column, cost) in &self.objective {
                            program.objective[column] += cost;
                        }
                        stage(&program)?
                    }
                }
            }
        };

        let objective = self
            .tiers
            .values()
            .flatten()
            .chain(&self.objective)
            .map(|&(column, cost)| cost * solution.values[column])
            .sum();

        Ok(Assignment {
            values: solution.values[..self.variables.len()].to_vec(),
            iterations,
            stages,
            objective,
        })
    }
}

fn relation(op: Operator) -> Relation {
    match op {
        Operator::Le => Relation::LessOrEqual,
        Operator::Eq => Relation::Equal,
        Operator::Ge => Relation::GreaterOrEqual,
    }
}

/// Map a backend failure onto the layout error taxonomy.
pub(crate) fn lp_error(err: LpError) -> LayoutError {
    match err {
        LpError::Infeasible => LayoutError::Infeasible,
        LpError::Unbounded => LayoutError::Unbounded,
        other => LayoutError::Solver(other.to_string()),
    }
}
