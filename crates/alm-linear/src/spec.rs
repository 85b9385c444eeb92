//! The linear specification: owner of variables, tabs, and constraints.

use std::sync::Arc;

use alm_core::{
    validate_coefficient, validate_weight, Axis, Bounds, LayoutError, LayoutResult, Operator,
    Optimization, Penalty, SolverConfig,
};
use alm_simplex::LpSolver;
use indexmap::IndexMap;
use log::{debug, warn};

use crate::assemble::Assembly;
use crate::constraint::{Constraint, ConstraintData, ConstraintView, Objective, Terms};
use crate::job::{SolveJob, SolveOutcome};
use crate::solution::{SolveReport, Solution};
use crate::tab::{Tab, XTab, YTab};
use crate::variable::{SpecId, Summand, Variable, VariableData};

/// Lifecycle of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecState {
    /// Nothing registered yet
    Empty,
    /// Mutated since the last successful solve
    Built,
    /// The published solution matches the current contents
    Solved,
}

/// Owner of one layout problem.
///
/// Variables and constraints live in insertion-ordered arenas; handles
/// refer to them by id. A variable's solver column is its position in the
/// arena when the problem is assembled.
///
/// Staleness is signalled, never hidden: after any mutation [`value`]
/// fails with [`LayoutError::StaleSolution`] until [`solve`] succeeds
/// again, while [`last_solution`] keeps returning the last published
/// snapshot.
///
/// [`value`]: LinearSpec::value
/// [`solve`]: LinearSpec::solve
/// [`last_solution`]: LinearSpec::last_solution
#[derive(Debug)]
pub struct LinearSpec {
    id: SpecId,
    config: SolverConfig,
    variables: IndexMap<u32, VariableData>,
    constraints: IndexMap<u32, ConstraintData>,
    objective: Option<Objective>,
    next_variable: u32,
    next_constraint: u32,
    state: SpecState,
    /// Bumped on every mutation
    generation: u64,
    solution: Option<Arc<Solution>>,
    closed: bool,
}

impl Default for LinearSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearSpec {
    /// Create an empty specification with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            id: SpecId::next(),
            config,
            variables: IndexMap::new(),
            constraints: IndexMap::new(),
            objective: None,
            next_variable: 0,
            next_constraint: 0,
            state: SpecState::Empty,
            generation: 0,
            solution: None,
            closed: false,
        }
    }

    pub fn id(&self) -> SpecId {
        self.id
    }

    pub fn state(&self) -> SpecState {
        self.state
    }

    /// Mutation counter; solutions record the generation they were solved at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SolverConfig) -> LayoutResult<()> {
        self.ensure_open()?;
        self.config = config;
        self.touch();
        Ok(())
    }

    /// Refuse any further mutation. Reads and solves keep working, so a
    /// specification closed with pending changes can still be solved.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        let spec = self.id;
        self.variables.keys().map(move |&id| Variable { spec, id })
    }

    pub fn constraints(&self) -> impl Iterator<Item = Constraint> + '_ {
        let spec = self.id;
        self.constraints.keys().map(move |&id| Constraint { spec, id })
    }

    // Variables

    /// Register a new unbounded variable.
    pub fn add_variable(&mut self) -> LayoutResult<Variable> {
        self.insert_variable(None)
    }

    /// Register a new vertical grid line.
    pub fn add_x_tab(&mut self) -> LayoutResult<XTab> {
        self.insert_variable(Some(Axis::Vertical)).map(XTab::new)
    }

    /// Register a new horizontal grid line.
    pub fn add_y_tab(&mut self) -> LayoutResult<YTab> {
        self.insert_variable(Some(Axis::Horizontal)).map(YTab::new)
    }

    /// Register a new grid line on `axis`.
    pub fn add_tab(&mut self, axis: Axis) -> LayoutResult<Tab> {
        match axis {
            Axis::Vertical => self.add_x_tab().map(Tab::X),
            Axis::Horizontal => self.add_y_tab().map(Tab::Y),
        }
    }

    fn insert_variable(&mut self, axis: Option<Axis>) -> LayoutResult<Variable> {
        self.ensure_open()?;
        let id = self.next_variable;
        self.next_variable += 1;
        self.variables.insert(id, VariableData::new(axis));
        self.touch();
        Ok(Variable { spec: self.id, id })
    }

    /// Per-variable state.
    pub fn variable(&self, variable: impl Into<Variable>) -> LayoutResult<&VariableData> {
        let variable = variable.into();
        self.check_owner(variable)?;
        self.variables
            .get(&variable.id)
            .ok_or_else(|| LayoutError::UnknownVariable {
                variable: variable.to_string(),
            })
    }

    fn variable_mut(&mut self, variable: Variable) -> LayoutResult<&mut VariableData> {
        self.ensure_open()?;
        self.check_owner(variable)?;
        self.variables
            .get_mut(&variable.id)
            .ok_or_else(|| LayoutError::UnknownVariable {
                variable: variable.to_string(),
            })
    }

    /// Restrict a variable to `[min, max]`. Infinite ends are unbounded.
    pub fn set_range(&mut self, variable: impl Into<Variable>, min: f64, max: f64) -> LayoutResult<()> {
        let bounds = Bounds::new(min, max)?;
        self.variable_mut(variable.into())?.bounds = bounds;
        self.touch();
        Ok(())
    }

    pub fn set_min(&mut self, variable: impl Into<Variable>, min: f64) -> LayoutResult<()> {
        let variable = variable.into();
        let max = self.variable(variable)?.bounds.max;
        self.set_range(variable, min, max)
    }

    pub fn set_max(&mut self, variable: impl Into<Variable>, max: f64) -> LayoutResult<()> {
        let variable = variable.into();
        let min = self.variable(variable)?.bounds.min;
        self.set_range(variable, min, max)
    }

    /// Pull a variable towards `value`, or stop pulling with `None`.
    pub fn set_preferred_value(&mut self, variable: impl Into<Variable>, value: Option<f64>) -> LayoutResult<()> {
        let value = value.map(validate_coefficient).transpose()?;
        self.variable_mut(variable.into())?.preferred = value;
        self.touch();
        Ok(())
    }

    /// Cost per unit of deviation from the preferred value.
    pub fn set_penalty(&mut self, variable: impl Into<Variable>, weight: f64) -> LayoutResult<()> {
        let weight = validate_weight(weight)?;
        self.variable_mut(variable.into())?.penalty = weight;
        self.touch();
        Ok(())
    }

    /// Attach a name used when displaying constraints.
    pub fn set_label(&mut self, variable: impl Into<Variable>, label: impl Into<String>) -> LayoutResult<()> {
        self.variable_mut(variable.into())?.label = Some(label.into());
        Ok(())
    }

    /// Remove a variable together with every constraint that references it.
    pub fn remove_variable(&mut self, variable: impl Into<Variable>) -> LayoutResult<()> {
        let variable = variable.into();
        self.variable_mut(variable)?;
        self.variables.shift_remove(&variable.id);

        let before = self.constraints.len();
        self.constraints.retain(|_, data| !data.references(variable));
        debug!(
            "removed {variable} and {} dependent constraints",
            before - self.constraints.len()
        );

        if let Some(objective) = &mut self.objective {
            objective.terms.retain(|term| term.variable != variable);
            if objective.terms.is_empty() {
                self.objective = None;
            }
        }

        self.touch();
        Ok(())
    }

    // Constraints

    /// Add a hard constraint `Σ terms op rhs`.
    pub fn add_constraint<S: Into<Summand>>(
        &mut self,
        terms: impl IntoIterator<Item = S>,
        op: Operator,
        rhs: f64,
    ) -> LayoutResult<Constraint> {
        self.insert_constraint(terms, op, rhs, None)
    }

    /// Add a soft constraint whose violation costs `penalty.weight` per unit.
    pub fn add_soft_constraint<S: Into<Summand>>(
        &mut self,
        terms: impl IntoIterator<Item = S>,
        op: Operator,
        rhs: f64,
        penalty: Penalty,
    ) -> LayoutResult<Constraint> {
        validate_weight(penalty.weight)?;
        self.insert_constraint(terms, op, rhs, Some(penalty))
    }

    /// `a = b`
    pub fn is_equal(&mut self, a: impl Into<Variable>, b: impl Into<Variable>) -> LayoutResult<Constraint> {
        let (a, b): (Variable, Variable) = (a.into(), b.into());
        self.add_constraint([(1.0, a), (-1.0, b)], Operator::Eq, 0.0)
    }

    /// `a <= b`
    pub fn is_smaller_or_equal(&mut self, a: impl Into<Variable>, b: impl Into<Variable>) -> LayoutResult<Constraint> {
        let (a, b): (Variable, Variable) = (a.into(), b.into());
        self.add_constraint([(1.0, a), (-1.0, b)], Operator::Le, 0.0)
    }

    /// `a >= b`
    pub fn is_greater_or_equal(&mut self, a: impl Into<Variable>, b: impl Into<Variable>) -> LayoutResult<Constraint> {
        let (a, b): (Variable, Variable) = (a.into(), b.into());
        self.add_constraint([(1.0, a), (-1.0, b)], Operator::Ge, 0.0)
    }

    fn insert_constraint<S: Into<Summand>>(
        &mut self,
        terms: impl IntoIterator<Item = S>,
        op: Operator,
        rhs: f64,
        penalty: Option<Penalty>,
    ) -> LayoutResult<Constraint> {
        self.ensure_open()?;
        let terms = self.resolve_terms(terms, true)?;
        if terms.is_empty() {
            return Err(LayoutError::EmptyConstraint);
        }
        let rhs = validate_coefficient(rhs)?;

        let id = self.next_constraint;
        self.next_constraint += 1;
        self.constraints.insert(
            id,
            ConstraintData {
                terms,
                op,
                rhs,
                penalty,
            },
        );
        self.touch();
        Ok(Constraint { spec: self.id, id })
    }

    /// Validate terms: finite coefficients, known variables of this
    /// specification, and (when `same_axis`) no mix of vertical and
    /// horizontal tabs.
    fn resolve_terms<S: Into<Summand>>(
        &self,
        terms: impl IntoIterator<Item = S>,
        same_axis: bool,
    ) -> LayoutResult<Terms> {
        let mut resolved = Terms::new();
        let mut axis: Option<Axis> = None;

        for term in terms {
            let term = term.into();
            validate_coefficient(term.coefficient)?;
            let data = self.variable(term.variable)?;

            if let (true, Some(found)) = (same_axis, data.axis) {
                match axis {
                    Some(first) if first != found => {
                        return Err(LayoutError::AxisMismatch {
                            left: first,
                            right: found,
                        });
                    }
                    _ => axis = Some(found),
                }
            }
            resolved.push(term);
        }

        Ok(resolved)
    }

    /// Read-only view of a constraint.
    pub fn constraint(&self, constraint: Constraint) -> LayoutResult<ConstraintView<'_>> {
        self.check_constraint_owner(constraint)?;
        let data = self
            .constraints
            .get(&constraint.id)
            .ok_or_else(|| LayoutError::UnknownConstraint {
                constraint: constraint.to_string(),
            })?;
        Ok(ConstraintView {
            data,
            variables: &self.variables,
        })
    }

    fn constraint_mut(&mut self, constraint: Constraint) -> LayoutResult<&mut ConstraintData> {
        self.ensure_open()?;
        self.check_constraint_owner(constraint)?;
        self.constraints
            .get_mut(&constraint.id)
            .ok_or_else(|| LayoutError::UnknownConstraint {
                constraint: constraint.to_string(),
            })
    }

    /// Make a constraint soft with the given weight and priority tier.
    pub fn set_constraint_penalty(&mut self, constraint: Constraint, weight: f64, priority: i32) -> LayoutResult<()> {
        let penalty = Penalty::new(weight, priority)?;
        self.constraint_mut(constraint)?.penalty = Some(penalty);
        self.touch();
        Ok(())
    }

    /// Make a constraint hard again.
    pub fn make_hard(&mut self, constraint: Constraint) -> LayoutResult<()> {
        self.constraint_mut(constraint)?.penalty = None;
        self.touch();
        Ok(())
    }

    pub fn set_rhs(&mut self, constraint: Constraint, rhs: f64) -> LayoutResult<()> {
        let rhs = validate_coefficient(rhs)?;
        self.constraint_mut(constraint)?.rhs = rhs;
        self.touch();
        Ok(())
    }

    pub fn set_operator(&mut self, constraint: Constraint, op: Operator) -> LayoutResult<()> {
        self.constraint_mut(constraint)?.op = op;
        self.touch();
        Ok(())
    }

    /// Detach a constraint. Referenced variables stay registered.
    pub fn remove_constraint(&mut self, constraint: Constraint) -> LayoutResult<()> {
        self.constraint_mut(constraint)?;
        self.constraints.shift_remove(&constraint.id);
        self.touch();
        Ok(())
    }

    // Objective

    /// Install a caller objective. An empty term list clears it.
    pub fn set_objective<S: Into<Summand>>(
        &mut self,
        terms: impl IntoIterator<Item = S>,
        direction: Optimization,
    ) -> LayoutResult<()> {
        self.ensure_open()?;
        let terms = self.resolve_terms(terms, false)?;
        self.objective = (!terms.is_empty()).then_some(Objective { terms, direction });
        self.touch();
        Ok(())
    }

    pub fn clear_objective(&mut self) -> LayoutResult<()> {
        self.ensure_open()?;
        self.objective = None;
        self.touch();
        Ok(())
    }

    // Solving

    /// Solve with the built-in simplex backend.
    pub fn solve(&mut self) -> LayoutResult<SolveReport> {
        let job = self.prepare()?;
        let solver = job.solver();
        self.publish(job.run(&solver))
    }

    /// Solve with a caller-provided backend.
    pub fn solve_with<S: LpSolver + ?Sized>(&mut self, solver: &S) -> LayoutResult<SolveReport> {
        let job = self.prepare()?;
        self.publish(job.run(solver))
    }

    /// Snapshot the current contents into a job that can run elsewhere.
    pub fn prepare(&self) -> LayoutResult<SolveJob> {
        Ok(SolveJob {
            spec: self.id,
            generation: self.generation,
            assembly: Assembly::build(
                &self.variables,
                &self.constraints,
                self.objective.as_ref(),
                &self.config,
            ),
            config: self.config,
        })
    }

    /// Publish the outcome of a job prepared from this specification.
    ///
    /// Fails with [`LayoutError::StaleSolution`] if the specification was
    /// mutated after the job was prepared. A failed solve leaves the
    /// published values untouched.
    pub fn publish(&mut self, outcome: SolveOutcome) -> LayoutResult<SolveReport> {
        if outcome.spec != self.id || outcome.generation != self.generation {
            warn!(
                "discarding solve of generation {}; specification is at generation {}",
                outcome.generation, self.generation
            );
            return Err(LayoutError::StaleSolution);
        }

        let assignment = match outcome.result {
            Ok(assignment) => assignment,
            Err(err) => {
                warn!("solve of generation {} failed: {err}", outcome.generation);
                return Err(err);
            }
        };

        let report = SolveReport {
            iterations: assignment.iterations,
            stages: assignment.stages,
            objective: assignment.objective,
            elapsed: outcome.elapsed,
        };
        let mut solution = Solution::empty(self.id, self.generation);
        solution.values = outcome.variables.into_iter().zip(assignment.values).collect();
        solution.report = report;

        debug!(
            "published generation {}: {} values, {} stages, {} pivots in {:?}",
            self.generation,
            solution.len(),
            report.stages,
            report.iterations,
            report.elapsed
        );

        self.solution = Some(Arc::new(solution));
        self.state = SpecState::Solved;
        Ok(report)
    }

    /// Solved value of a variable or tab.
    pub fn value(&self, variable: impl Into<Variable>) -> LayoutResult<f64> {
        let variable = variable.into();
        self.variable(variable)?;
        if self.state != SpecState::Solved {
            return Err(LayoutError::StaleSolution);
        }
        self.solution
            .as_ref()
            .and_then(|solution| solution.value(variable))
            .ok_or(LayoutError::StaleSolution)
    }

    /// The last published snapshot, stale or not.
    pub fn last_solution(&self) -> Option<Arc<Solution>> {
        self.solution.clone()
    }

    /// The published snapshot if it matches the current contents.
    pub fn solution(&self) -> LayoutResult<Arc<Solution>> {
        match (&self.solution, self.state) {
            (Some(solution), SpecState::Solved) => Ok(Arc::clone(solution)),
            _ => Err(LayoutError::StaleSolution),
        }
    }

    // Helpers

    fn ensure_open(&self) -> LayoutResult<()> {
        if self.closed {
            Err(LayoutError::Closed)
        } else {
            Ok(())
        }
    }

    fn check_owner(&self, variable: Variable) -> LayoutResult<()> {
        if variable.spec == self.id {
            Ok(())
        } else {
            Err(LayoutError::ForeignVariable {
                variable: variable.to_string(),
            })
        }
    }

    fn check_constraint_owner(&self, constraint: Constraint) -> LayoutResult<()> {
        if constraint.spec == self.id {
            Ok(())
        } else {
            Err(LayoutError::UnknownConstraint {
                constraint: constraint.to_string(),
            })
        }
    }

    /// Record a mutation: bump the generation and leave the solved state.
    fn touch(&mut self) {
        self.generation += 1;
        self.state = if self.variables.is_empty() && self.constraints.is_empty() && self.objective.is_none() {
            SpecState::Empty
        } else {
            SpecState::Built
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alm_core::Strategy;
    use proptest::prelude::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_state_machine() {
        let mut spec = LinearSpec::new();
        assert_eq!(spec.state(), SpecState::Empty);

        let x = spec.add_variable().unwrap();
        assert_eq!(spec.state(), SpecState::Built);

        spec.solve().unwrap();
        assert_eq!(spec.state(), SpecState::Solved);

        spec.set_range(x, 0.0, 1.0).unwrap();
        assert_eq!(spec.state(), SpecState::Built);

        spec.remove_variable(x).unwrap();
        assert_eq!(spec.state(), SpecState::Empty);
    }

    #[test]
    fn test_solve_empty() {
        let mut spec = LinearSpec::new();
        let report = spec.solve().unwrap();
        assert_eq!(report.stages, 1);
        assert_eq!(spec.state(), SpecState::Solved);
        assert!(spec.solution().unwrap().is_empty());
    }

    #[test]
    fn test_tab_difference_scenario() {
        let mut spec = LinearSpec::new();
        let a = spec.add_x_tab().unwrap();
        let b = spec.add_x_tab().unwrap();
        spec.set_range(a, 0.0, f64::INFINITY).unwrap();
        spec.add_constraint([(1.0, b), (-1.0, a)], Operator::Eq, 100.0)
            .unwrap();

        spec.solve().unwrap();
        assert_eq!(spec.value(a).unwrap(), 0.0);
        assert_close(spec.value(b).unwrap(), 100.0);
        assert_close(spec.value(b).unwrap() - spec.value(a).unwrap(), 100.0);

        // A conflicting hard constraint is infeasible and keeps the old values
        spec.add_constraint([(1.0, b), (-1.0, a)], Operator::Eq, 50.0)
            .unwrap();
        assert_eq!(spec.solve(), Err(LayoutError::Infeasible));
        assert_eq!(spec.state(), SpecState::Built);
        assert_eq!(spec.value(a), Err(LayoutError::StaleSolution));

        let last = spec.last_solution().unwrap();
        assert_eq!(last.value(a), Some(0.0));
        assert_close(last.value(b).unwrap(), 100.0);
    }

    #[test]
    fn test_relax_after_infeasible() {
        let mut spec = LinearSpec::new();
        let a = spec.add_x_tab().unwrap();
        let b = spec.add_x_tab().unwrap();
        spec.set_range(a, 0.0, f64::INFINITY).unwrap();
        spec.add_constraint([(1.0, b), (-1.0, a)], Operator::Eq, 100.0)
            .unwrap();
        let conflict = spec
            .add_constraint([(1.0, b), (-1.0, a)], Operator::Eq, 50.0)
            .unwrap();
        assert_eq!(spec.solve(), Err(LayoutError::Infeasible));

        spec.set_constraint_penalty(conflict, 1.0, 0).unwrap();
        spec.solve().unwrap();
        assert_close(spec.value(b).unwrap() - spec.value(a).unwrap(), 100.0);
    }

    #[test]
    fn test_idempotent_solve() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        let y = spec.add_variable().unwrap();
        spec.add_constraint([(1.0, x), (1.0, y)], Operator::Eq, 10.0)
            .unwrap();
        spec.set_preferred_value(x, Some(3.0)).unwrap();

        spec.solve().unwrap();
        let first = spec.solution().unwrap();
        let generation = spec.generation();

        spec.solve().unwrap();
        let second = spec.solution().unwrap();

        assert_eq!(first.iter().collect::<Vec<_>>(), second.iter().collect::<Vec<_>>());
        assert_eq!(spec.state(), SpecState::Solved);
        assert_eq!(spec.generation(), generation);
    }

    #[test]
    fn test_foreign_variable() {
        let mut spec = LinearSpec::new();
        let mut other = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        let foreign = other.add_variable().unwrap();

        let result = spec.add_constraint([(1.0, x), (1.0, foreign)], Operator::Le, 1.0);
        assert!(matches!(result, Err(LayoutError::ForeignVariable { .. })));
        assert_eq!(spec.variable_count(), 1);
        assert_eq!(spec.constraint_count(), 0);
        assert!(matches!(
            spec.set_range(foreign, 0.0, 1.0),
            Err(LayoutError::ForeignVariable { .. })
        ));
    }

    #[test]
    fn test_axis_mismatch() {
        let mut spec = LinearSpec::new();
        let x = spec.add_x_tab().unwrap();
        let y = spec.add_y_tab().unwrap();
        let plain = spec.add_variable().unwrap();

        assert_eq!(
            spec.is_equal(x, y),
            Err(LayoutError::AxisMismatch {
                left: Axis::Vertical,
                right: Axis::Horizontal,
            })
        );
        assert_eq!(spec.constraint_count(), 0);
        assert_eq!(spec.state(), SpecState::Built);

        // Untagged variables combine with either axis
        assert!(spec.is_equal(x, plain).is_ok());
        assert!(spec.is_equal(y, plain).is_ok());
    }

    #[test]
    fn test_construction_errors() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();

        assert_eq!(
            spec.add_constraint(Vec::<Summand>::new(), Operator::Eq, 0.0),
            Err(LayoutError::EmptyConstraint)
        );
        assert_eq!(
            spec.set_range(x, 2.0, 1.0),
            Err(LayoutError::InvalidRange { min: 2.0, max: 1.0 })
        );
        assert_eq!(
            spec.set_penalty(x, -1.0),
            Err(LayoutError::InvalidWeight { weight: -1.0 })
        );
        assert!(matches!(
            spec.add_constraint([(f64::NAN, x)], Operator::Eq, 0.0),
            Err(LayoutError::InvalidCoefficient { .. })
        ));
        assert_eq!(spec.constraint_count(), 0);

        assert!(matches!(
            spec.set_range(x, f64::INFINITY, f64::INFINITY),
            Err(LayoutError::InvalidRange { .. })
        ));
        assert!(matches!(
            spec.set_max(x, f64::NEG_INFINITY),
            Err(LayoutError::InvalidRange { .. })
        ));
        assert!(spec.variable(x).unwrap().bounds().is_unbounded());
    }

    #[test]
    fn test_remove_variable_removes_constraints() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        let y = spec.add_variable().unwrap();
        let z = spec.add_variable().unwrap();
        spec.is_equal(x, y).unwrap();
        let kept = spec.is_smaller_or_equal(y, z).unwrap();
        spec.add_constraint([(1.0, x)], Operator::Ge, 0.0).unwrap();

        spec.remove_variable(x).unwrap();
        assert_eq!(spec.variable_count(), 2);
        assert_eq!(spec.constraints().collect::<Vec<_>>(), vec![kept]);
        assert!(matches!(spec.value(x), Err(LayoutError::UnknownVariable { .. })));
        assert!(matches!(
            spec.remove_variable(x),
            Err(LayoutError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn test_remove_constraint_keeps_others() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.set_range(x, 0.0, 100.0).unwrap();
        let low = spec.add_constraint([(1.0, x)], Operator::Ge, 10.0).unwrap();
        let high = spec.add_constraint([(1.0, x)], Operator::Le, 20.0).unwrap();
        spec.set_objective([(1.0, x)], Optimization::Maximize).unwrap();

        spec.remove_constraint(low).unwrap();
        assert!(spec.constraint(high).is_ok());
        assert!(matches!(
            spec.remove_constraint(low),
            Err(LayoutError::UnknownConstraint { .. })
        ));

        spec.solve().unwrap();
        assert_close(spec.value(x).unwrap(), 20.0);
    }

    #[test]
    fn test_unbounded_objective() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.set_objective([(1.0, x)], Optimization::Maximize).unwrap();

        assert_eq!(spec.solve(), Err(LayoutError::Unbounded));
        assert!(spec.last_solution().is_none());
    }

    #[test]
    fn test_soft_weight_monotonicity() {
        // x pulled to 0 with weight 1 and to 10 with a growing weight
        let mut previous = f64::INFINITY;
        for weight in [0.25, 0.5, 2.0, 8.0] {
            let mut spec = LinearSpec::new();
            let x = spec.add_variable().unwrap();
            spec.add_soft_constraint([(1.0, x)], Operator::Eq, 0.0, Penalty::weight(1.0).unwrap())
                .unwrap();
            let pull = spec
                .add_soft_constraint([(1.0, x)], Operator::Eq, 10.0, Penalty::weight(weight).unwrap())
                .unwrap();

            spec.solve().unwrap();
            let solution = spec.solution().unwrap();
            let violation = spec
                .constraint(pull)
                .unwrap()
                .violation(|v| solution.value(v).unwrap_or(0.0));
            assert!(violation <= previous + 1e-9, "weight {weight}: {violation} > {previous}");
            previous = violation;
        }
        assert_close(previous, 0.0);
    }

    #[test]
    fn test_lexicographic_priority_beats_weight() {
        let mut spec = LinearSpec::with_config(SolverConfig::lexicographic());
        let x = spec.add_variable().unwrap();
        spec.add_soft_constraint([(1.0, x)], Operator::Eq, 40.0, Penalty::new(1_000.0, 0).unwrap())
            .unwrap();
        spec.add_soft_constraint([(1.0, x)], Operator::Le, 25.0, Penalty::new(1.0, 5).unwrap())
            .unwrap();

        spec.solve().unwrap();
        assert_close(spec.value(x).unwrap(), 25.0);

        spec.set_config(SolverConfig {
            strategy: Strategy::Weighted,
            ..SolverConfig::default()
        })
        .unwrap();
        spec.solve().unwrap();
        assert_close(spec.value(x).unwrap(), 40.0);
    }

    #[test]
    fn test_preferred_value_within_range() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.set_range(x, 0.0, 50.0).unwrap();
        spec.set_preferred_value(x, Some(80.0)).unwrap();

        spec.solve().unwrap();
        assert_close(spec.value(x).unwrap(), 50.0);

        spec.set_preferred_value(x, Some(30.0)).unwrap();
        spec.solve().unwrap();
        assert_close(spec.value(x).unwrap(), 30.0);
    }

    #[test]
    fn test_set_min_and_max() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.set_min(x, 5.0).unwrap();
        spec.set_max(x, 8.0).unwrap();
        assert_eq!(spec.variable(x).unwrap().bounds(), Bounds::new(5.0, 8.0).unwrap());
        assert!(matches!(spec.set_max(x, 1.0), Err(LayoutError::InvalidRange { .. })));
    }

    #[test]
    fn test_closed_spec() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.solve().unwrap();
        spec.close();

        assert_eq!(spec.add_variable(), Err(LayoutError::Closed));
        assert_eq!(spec.add_x_tab(), Err(LayoutError::Closed));
        assert_eq!(spec.set_range(x, 0.0, 1.0), Err(LayoutError::Closed));
        assert_eq!(spec.variable_count(), 1);
        assert!(spec.value(x).is_ok());
    }

    #[test]
    fn test_solve_after_close() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.set_range(x, 4.0, 8.0).unwrap();
        spec.close();

        assert_eq!(spec.state(), SpecState::Built);
        assert_eq!(spec.value(x), Err(LayoutError::StaleSolution));
        spec.solve().unwrap();
        assert_eq!(spec.state(), SpecState::Solved);
        assert_close(spec.value(x).unwrap(), 4.0);
    }

    #[test]
    fn test_stale_outcome_rejected() {
        let mut spec = LinearSpec::new();
        let x = spec.add_variable().unwrap();
        spec.set_range(x, 1.0, 2.0).unwrap();

        let job = spec.prepare().unwrap();
        spec.add_variable().unwrap();
        let outcome = job.run(&alm_simplex::Simplex::new());
        assert!(outcome.is_success());
        assert_eq!(spec.publish(outcome), Err(LayoutError::StaleSolution));
        assert!(spec.last_solution().is_none());
    }

    #[test]
    fn test_constraint_display() {
        let mut spec = LinearSpec::new();
        let a = spec.add_x_tab().unwrap();
        let b = spec.add_x_tab().unwrap();
        spec.set_label(b, "right").unwrap();
        let hard = spec.add_constraint([(1.0, b), (-1.0, a)], Operator::Eq, 100.0)
            .unwrap();
        let soft = spec
            .add_soft_constraint([(-2.5, a)], Operator::Le, 4.0, Penalty::new(3.0, 1).unwrap())
            .unwrap();

        insta::assert_snapshot!(spec.constraint(hard).unwrap().to_string(), @"1 right - 1 x0 = 100");
        insta::assert_snapshot!(spec.constraint(soft).unwrap().to_string(), @"-2.5 x0 <= 4 [soft w=3 p=1]");
    }

    proptest! {
        #[test]
        fn prop_values_respect_ranges(
            ranges in prop::collection::vec((-500.0f64..500.0, 0.0f64..200.0, -1_000.0f64..1_000.0), 1..8)
        ) {
            let mut spec = LinearSpec::new();
            let mut vars = Vec::new();
            for &(min, width, preferred) in &ranges {
                let x = spec.add_variable().unwrap();
                spec.set_range(x, min, min + width).unwrap();
                spec.set_preferred_value(x, Some(preferred)).unwrap();
                vars.push(x);
            }

            spec.solve().unwrap();
            for (x, &(min, width, _)) in vars.iter().zip(&ranges) {
                let value = spec.value(*x).unwrap();
                prop_assert!(value >= min && value <= min + width, "{value} outside [{min}, {}]", min + width);
            }
        }
    }
}
