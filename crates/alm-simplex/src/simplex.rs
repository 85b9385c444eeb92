//! Bounded two-phase simplex solver.
//!
//! Program columns are mapped onto non-negative tableau columns: a column
//! with a finite lower bound is shifted, a column bounded only from above is
//! mirrored, and a free column is split into a positive and a negative part.
//! Finite upper bounds of shifted columns become ordinary rows.
//!
//! Phase one minimizes the sum of artificial columns to reach a feasible
//! basis; phase two minimizes the real objective. Entering and leaving
//! columns are picked with Bland's rule, so the same program always pivots
//! the same way.

use log::trace;

use crate::problem::{LinearProgram, LpError, LpSolution, Relation};
use crate::LpSolver;

/// Tolerance for floating-point comparisons.
const EPSILON: f64 = 1e-9;

/// Default pivot cap.
const MAX_ITERATIONS: usize = 10_000;

/// Column types used internally in the tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// Stands for (part of) a program column
    Structural,
    /// Slack or surplus of an inequality row
    Slack,
    /// Phase-one helper, never allowed back into the basis in phase two
    Artificial,
}

/// How a program column maps onto tableau columns.
#[derive(Debug, Clone, Copy)]
enum Mapping {
    /// x = lower + t
    Shifted { column: usize, lower: f64, upper: f64 },
    /// x = upper - t
    Mirrored { column: usize, upper: f64 },
    /// x = t⁺ - t⁻
    Split { positive: usize, negative: usize },
}

/// A row of the tableau: Σ(cells[j] * t[j]) = constant.
///
/// The objective row reuses the type; there `cells` holds reduced costs and
/// `constant` the negated objective value.
#[derive(Debug, Clone)]
struct Row {
    constant: f64,
    cells: Vec<f64>,
}

impl Row {
    fn new(constant: f64, width: usize) -> Self {
        Self {
            constant,
            cells: vec![0.0; width],
        }
    }

    fn coefficient(&self, column: usize) -> f64 {
        self.cells[column]
    }

    fn add(&mut self, column: usize, coefficient: f64) {
        self.cells[column] += coefficient;
    }

    fn negate(&mut self) {
        self.constant = -self.constant;
        for c in &mut self.cells {
            *c = -*c;
        }
    }

    /// Scale the row so `column` has coefficient one.
    fn solve_for(&mut self, column: usize) {
        let multiplier = 1.0 / self.cells[column];
        self.constant *= multiplier;
        for c in &mut self.cells {
            *c *= multiplier;
        }
        self.cells[column] = 1.0;
    }

    /// Eliminate `column` using `row`, whose coefficient for it is one.
    fn substitute(&mut self, column: usize, row: &Row, tolerance: f64) {
        let coeff = self.cells[column];
        if coeff == 0.0 {
            return;
        }
        self.constant -= coeff * row.constant;
        if self.constant.abs() < tolerance {
            self.constant = 0.0;
        }
        for (c, r) in self.cells.iter_mut().zip(&row.cells) {
            *c -= coeff * r;
            if c.abs() < tolerance {
                *c = 0.0;
            }
        }
        self.cells[column] = 0.0;
    }
}

/// The simplex tableau in canonical form.
#[derive(Debug)]
struct Tableau {
    rows: Vec<Row>,
    /// Basic column of each row
    basis: Vec<usize>,
    kinds: Vec<ColumnKind>,
    tolerance: f64,
    iterations: usize,
    max_iterations: usize,
}

impl Tableau {
    fn width(&self) -> usize {
        self.kinds.len()
    }

    /// Express `costs` in terms of the non-basic columns.
    fn price(&self, costs: &[f64]) -> Row {
        let mut objective = Row {
            constant: 0.0,
            cells: costs.to_vec(),
        };
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            objective.substitute(basic, row, self.tolerance);
        }
        objective
    }

    fn pivot(&mut self, row: usize, column: usize, objective: &mut Row) {
        let mut pivot_row = std::mem::replace(&mut self.rows[row], Row::new(0.0, 0));
        pivot_row.solve_for(column);

        for (index, other) in self.rows.iter_mut().enumerate() {
            if index != row {
                other.substitute(column, &pivot_row, self.tolerance);
            }
        }
        objective.substitute(column, &pivot_row, self.tolerance);

        self.rows[row] = pivot_row;
        self.basis[row] = column;
        self.iterations += 1;
    }

    /// Run simplex iterations until `objective` is optimal.
    fn optimize(&mut self, objective: &mut Row, allow_artificial: bool) -> Result<(), LpError> {
        loop {
            // Bland's rule: lowest-index column with a negative reduced cost
            let entering = (0..self.width()).find(|&column| {
                (allow_artificial || self.kinds[column] != ColumnKind::Artificial)
                    && objective.coefficient(column) < -self.tolerance
            });

            let Some(entering) = entering else {
                return Ok(());
            };

            if self.iterations >= self.max_iterations {
                return Err(LpError::IterationLimit(self.max_iterations));
            }

            let Some(leaving) = self.leaving_row(entering) else {
                return Err(LpError::Unbounded);
            };

            self.pivot(leaving, entering, objective);
        }
    }

    /// Minimum ratio test; ties go to the row with the lowest basic column.
    fn leaving_row(&self, entering: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (index, row) in self.rows.iter().enumerate() {
            let coeff = row.coefficient(entering);
            if coeff <= self.tolerance {
                continue;
            }

            let ratio = row.constant.max(0.0) / coeff;
            best = match best {
                None => Some((index, ratio)),
                Some((current, min_ratio)) => {
                    let smaller = ratio < min_ratio - self.tolerance;
                    let tied = ratio <= min_ratio + self.tolerance;
                    if smaller || (tied && self.basis[index] < self.basis[current]) {
                        Some((index, ratio))
                    } else {
                        Some((current, min_ratio))
                    }
                }
            };
        }

        best.map(|(index, _)| index)
    }

    /// Pivot artificial columns out of the basis after phase one. Rows that
    /// only contain artificial columns are redundant and dropped.
    fn evict_artificials(&mut self, objective: &mut Row) {
        let mut redundant = Vec::new();

        for index in 0..self.rows.len() {
            if self.kinds[self.basis[index]] != ColumnKind::Artificial {
                continue;
            }

            let replacement = (0..self.width()).find(|&column| {
                self.kinds[column] != ColumnKind::Artificial
                    && self.rows[index].coefficient(column).abs() > self.tolerance
            });

            match replacement {
                Some(column) => self.pivot(index, column, objective),
                None => redundant.push(index),
            }
        }

        for index in redundant.into_iter().rev() {
            self.rows.remove(index);
            self.basis.remove(index);
        }
    }

    /// Current value of every tableau column.
    fn column_values(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.width()];
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            values[basic] = row.constant.max(0.0);
        }
        values
    }
}

/// The bounded two-phase simplex solver.
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    tolerance: f64,
    max_iterations: usize,
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplex {
    /// Create a solver with default tolerance and pivot cap.
    pub fn new() -> Self {
        Self {
            tolerance: EPSILON,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Map program columns onto non-negative tableau columns.
    fn map_columns(program: &LinearProgram, kinds: &mut Vec<ColumnKind>) -> Vec<Mapping> {
        let mut mappings = Vec::with_capacity(program.num_columns());

        for &(lower, upper) in &program.bounds {
            let column = kinds.len();
            let mapping = if lower.is_finite() {
                kinds.push(ColumnKind::Structural);
                Mapping::Shifted { column, lower, upper }
            } else if upper.is_finite() {
                kinds.push(ColumnKind::Structural);
                Mapping::Mirrored { column, upper }
            } else {
                kinds.push(ColumnKind::Structural);
                kinds.push(ColumnKind::Structural);
                Mapping::Split {
                    positive: column,
                    negative: column + 1,
                }
            };
            mappings.push(mapping);
        }

        mappings
    }

    /// Build the initial tableau. Every row starts with a slack or an
    /// artificial column as its basic column.
    fn build(&self, program: &LinearProgram, mappings: &[Mapping], mut kinds: Vec<ColumnKind>) -> Tableau {
        let structural = kinds.len();

        let mut pending: Vec<(Row, Relation)> = Vec::with_capacity(program.rows.len());
        for row in &program.rows {
            let mut tableau_row = Row::new(row.rhs, structural);
            for &(column, coeff) in &row.terms {
                match mappings[column] {
                    Mapping::Shifted { column, lower, .. } => {
                        tableau_row.add(column, coeff);
                        tableau_row.constant -= coeff * lower;
                    }
                    Mapping::Mirrored { column, upper } => {
                        tableau_row.add(column, -coeff);
                        tableau_row.constant -= coeff * upper;
                    }
                    Mapping::Split { positive, negative } => {
                        tableau_row.add(positive, coeff);
                        tableau_row.add(negative, -coeff);
                    }
                }
            }
            pending.push((tableau_row, row.relation));
        }

        for mapping in mappings {
            if let Mapping::Shifted { column, lower, upper } = *mapping {
                if upper.is_finite() {
                    let mut row = Row::new(upper - lower, structural);
                    row.add(column, 1.0);
                    pending.push((row, Relation::LessOrEqual));
                }
            }
        }

        // Ensure every constant is non-negative
        for (row, relation) in &mut pending {
            if row.constant < 0.0 {
                row.negate();
                *relation = relation.flipped();
            }
        }

        // Allocate slack and artificial columns
        let mut helpers = Vec::with_capacity(pending.len());
        for (_, relation) in &pending {
            let mut push = |kind| {
                kinds.push(kind);
                kinds.len() - 1
            };
            let helper = match relation {
                Relation::LessOrEqual => (Some(push(ColumnKind::Slack)), None),
                Relation::GreaterOrEqual => {
                    let surplus = push(ColumnKind::Slack);
                    (Some(surplus), Some(push(ColumnKind::Artificial)))
                }
                Relation::Equal => (None, Some(push(ColumnKind::Artificial))),
            };
            helpers.push(helper);
        }

        let width = kinds.len();
        let mut rows = Vec::with_capacity(pending.len());
        let mut basis = Vec::with_capacity(pending.len());
        for ((mut row, relation), (slack, artificial)) in pending.into_iter().zip(helpers) {
            row.cells.resize(width, 0.0);
            if let Some(slack) = slack {
                let sign = if relation == Relation::LessOrEqual { 1.0 } else { -1.0 };
                row.add(slack, sign);
            }
            if let Some(artificial) = artificial {
                row.add(artificial, 1.0);
            }
            basis.push(artificial.or(slack).unwrap_or_default());
            rows.push(row);
        }

        Tableau {
            rows,
            basis,
            kinds,
            tolerance: self.tolerance,
            iterations: 0,
            max_iterations: self.max_iterations,
        }
    }
}

impl LpSolver for Simplex {
    fn solve(&self, program: &LinearProgram) -> Result<LpSolution, LpError> {
        program.validate()?;

        let mut kinds = Vec::with_capacity(program.num_columns() * 2);
        let mappings = Self::map_columns(program, &mut kinds);
        let mut tableau = self.build(program, &mappings, kinds);
        let scale = tableau.rows.iter().map(|row| row.constant.abs()).fold(1.0, f64::max);

        // Phase one
        if tableau.kinds.contains(&ColumnKind::Artificial) {
            let costs: Vec<f64> = tableau
                .kinds
                .iter()
                .map(|kind| if *kind == ColumnKind::Artificial { 1.0 } else { 0.0 })
                .collect();
            let mut objective = tableau.price(&costs);
            tableau.optimize(&mut objective, true)?;

            let infeasibility = -objective.constant;
            trace!(
                "phase one: {} rows, {} columns, {} pivots, infeasibility {infeasibility}",
                tableau.rows.len(),
                tableau.width(),
                tableau.iterations
            );
            if infeasibility > self.tolerance * 1e3 * scale {
                return Err(LpError::Infeasible);
            }
            tableau.evict_artificials(&mut objective);
        }

        // Phase two
        let mut costs = vec![0.0; tableau.width()];
        for (mapping, &cost) in mappings.iter().zip(&program.objective) {
            match *mapping {
                Mapping::Shifted { column, .. } => costs[column] = cost,
                Mapping::Mirrored { column, .. } => costs[column] = -cost,
                Mapping::Split { positive, negative } => {
                    costs[positive] = cost;
                    costs[negative] = -cost;
                }
            }
        }
        let mut objective = tableau.price(&costs);
        tableau.optimize(&mut objective, false)?;
        trace!("phase two: {} pivots in total", tableau.iterations);

        let columns = tableau.column_values();
        let values: Vec<f64> = mappings
            .iter()
            .map(|mapping| match *mapping {
                Mapping::Shifted { column, lower, upper } => (lower + columns[column]).min(upper),
                Mapping::Mirrored { column, upper } => upper - columns[column],
                Mapping::Split { positive, negative } => columns[positive] - columns[negative],
            })
            .collect();

        Ok(LpSolution {
            objective: program.objective_value(&values),
            values,
            iterations: tableau.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LinearRow;
    use proptest::prelude::*;

    const INF: f64 = f64::INFINITY;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_two_variable_optimum() {
        // min -x - y  s.t.  x + 2y <= 4, 3x + y <= 6
        let mut lp = LinearProgram::new();
        let x = lp.add_column(-1.0, 0.0, INF);
        let y = lp.add_column(-1.0, 0.0, INF);
        lp.add_row(LinearRow::new([(x, 1.0), (y, 2.0)], Relation::LessOrEqual, 4.0));
        lp.add_row(LinearRow::new([(x, 3.0), (y, 1.0)], Relation::LessOrEqual, 6.0));

        let solution = Simplex::new().solve(&lp).unwrap();
        assert_close(solution.values[x], 1.6);
        assert_close(solution.values[y], 1.2);
        assert_close(solution.objective, -2.8);
    }

    #[test]
    fn test_free_column_goes_negative() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(1.0, -INF, INF);
        lp.add_row(LinearRow::new([(x, 1.0)], Relation::GreaterOrEqual, -5.0));

        let solution = Simplex::new().solve(&lp).unwrap();
        assert_close(solution.values[x], -5.0);
    }

    #[test]
    fn test_upper_bound_only() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(-1.0, -INF, 3.0);

        let solution = Simplex::new().solve(&lp).unwrap();
        assert_close(solution.values[x], 3.0);
    }

    #[test]
    fn test_boxed_column() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(-1.0, 1.0, 4.0);
        let y = lp.add_column(1.0, 1.0, 4.0);

        let solution = Simplex::new().solve(&lp).unwrap();
        assert_close(solution.values[x], 4.0);
        assert_close(solution.values[y], 1.0);
    }

    #[test]
    fn test_equality_difference() {
        // b - a = 100 with a >= 0 and b free lands on a = 0
        let mut lp = LinearProgram::new();
        let a = lp.add_column(0.0, 0.0, INF);
        let b = lp.add_column(0.0, -INF, INF);
        lp.add_row(LinearRow::new([(b, 1.0), (a, -1.0)], Relation::Equal, 100.0));

        let solution = Simplex::new().solve(&lp).unwrap();
        assert_eq!(solution.values[a], 0.0);
        assert_close(solution.values[b], 100.0);
    }

    #[test]
    fn test_infeasible() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(0.0, 0.0, INF);
        lp.add_row(LinearRow::new([(x, 1.0)], Relation::LessOrEqual, -1.0));

        assert_eq!(Simplex::new().solve(&lp), Err(LpError::Infeasible));
    }

    #[test]
    fn test_conflicting_equalities() {
        let mut lp = LinearProgram::new();
        let a = lp.add_column(0.0, 0.0, INF);
        let b = lp.add_column(0.0, -INF, INF);
        lp.add_row(LinearRow::new([(b, 1.0), (a, -1.0)], Relation::Equal, 100.0));
        lp.add_row(LinearRow::new([(b, 1.0), (a, -1.0)], Relation::Equal, 50.0));

        assert_eq!(Simplex::new().solve(&lp), Err(LpError::Infeasible));
    }

    #[test]
    fn test_unbounded() {
        let mut lp = LinearProgram::new();
        lp.add_column(-1.0, 0.0, INF);

        assert_eq!(Simplex::new().solve(&lp), Err(LpError::Unbounded));
    }

    #[test]
    fn test_redundant_equalities() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(1.0, 0.0, INF);
        let y = lp.add_column(0.0, 0.0, INF);
        lp.add_row(LinearRow::new([(x, 1.0), (y, 1.0)], Relation::Equal, 2.0));
        lp.add_row(LinearRow::new([(x, 1.0), (y, 1.0)], Relation::Equal, 2.0));

        let solution = Simplex::new().solve(&lp).unwrap();
        assert_close(solution.values[x], 0.0);
        assert_close(solution.values[y], 2.0);
    }

    #[test]
    fn test_empty_row() {
        let mut lp = LinearProgram::new();
        lp.add_column(0.0, 0.0, INF);
        lp.add_row(LinearRow::new([], Relation::Equal, 0.0));
        assert!(Simplex::new().solve(&lp).is_ok());

        lp.add_row(LinearRow::new([], Relation::Equal, 1.0));
        assert_eq!(Simplex::new().solve(&lp), Err(LpError::Infeasible));
    }

    #[test]
    fn test_iteration_limit() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(-1.0, 0.0, INF);
        lp.add_row(LinearRow::new([(x, 1.0)], Relation::LessOrEqual, 4.0));

        let solver = Simplex::new().with_max_iterations(0);
        assert_eq!(solver.solve(&lp), Err(LpError::IterationLimit(0)));
    }

    #[test]
    fn test_deterministic() {
        let mut lp = LinearProgram::new();
        let x = lp.add_column(0.0, 0.0, INF);
        let y = lp.add_column(0.0, 0.0, INF);
        let z = lp.add_column(0.0, 0.0, INF);
        lp.add_row(LinearRow::new([(x, 1.0), (y, 1.0), (z, 1.0)], Relation::Equal, 9.0));

        let first = Simplex::new().solve(&lp).unwrap();
        let second = Simplex::new().solve(&lp).unwrap();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_boxed_columns_stay_in_bounds(
            columns in prop::collection::vec((-100.0f64..100.0, 0.0f64..50.0, -5.0f64..5.0), 1..6)
        ) {
            let mut lp = LinearProgram::new();
            for &(lower, width, cost) in &columns {
                lp.add_column(cost, lower, lower + width);
            }
            let all: Vec<(usize, f64)> = (0..columns.len()).map(|c| (c, 1.0)).collect();
            lp.add_row(LinearRow::new(all, Relation::LessOrEqual, 1_000.0));

            let solution = Simplex::new().solve(&lp).unwrap();
            for (value, &(lower, width, _)) in solution.values.iter().zip(&columns) {
                prop_assert!(*value >= lower - 1e-9);
                prop_assert!(*value <= lower + width + 1e-9);
            }
        }
    }
}
