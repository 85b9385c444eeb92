//! Linear program exchange format.

use smallvec::SmallVec;
use thiserror::Error;

/// The relation of a row (equality or inequality).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Relation::LessOrEqual => Relation::GreaterOrEqual,
            Relation::Equal => Relation::Equal,
            Relation::GreaterOrEqual => Relation::LessOrEqual,
        }
    }
}

/// One row: Σ(coefficient * x[column]) relation rhs.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRow {
    pub terms: SmallVec<[(usize, f64); 4]>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearRow {
    pub fn new(
        terms: impl IntoIterator<Item = (usize, f64)>,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            relation,
            rhs,
        }
    }
}

/// A minimization problem over `bounds.len()` columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearProgram {
    /// Objective coefficient per column
    pub objective: Vec<f64>,
    /// Constraint rows
    pub rows: Vec<LinearRow>,
    /// Lower and upper bound per column; infinite ends are unbounded
    pub bounds: Vec<(f64, f64)>,
}

impl LinearProgram {
    /// Create an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column and return its index.
    pub fn add_column(&mut self, cost: f64, lower: f64, upper: f64) -> usize {
        self.objective.push(cost);
        self.bounds.push((lower, upper));
        self.objective.len() - 1
    }

    /// Append a row and return its index.
    pub fn add_row(&mut self, row: LinearRow) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn num_columns(&self) -> usize {
        self.bounds.len()
    }

    /// Evaluate the objective at `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Check the program is well formed.
    pub(crate) fn validate(&self) -> Result<(), LpError> {
        if self.objective.len() != self.bounds.len() {
            return Err(LpError::InvalidProgram(format!(
                "{} objective coefficients for {} columns",
                self.objective.len(),
                self.bounds.len()
            )));
        }
        if let Some(c) = self.objective.iter().find(|c| !c.is_finite()) {
            return Err(LpError::InvalidProgram(format!("objective coefficient {c}")));
        }
        for (column, &(lower, upper)) in self.bounds.iter().enumerate() {
            if lower.is_nan() || upper.is_nan() || lower > upper || lower == f64::INFINITY || upper == f64::NEG_INFINITY {
                return Err(LpError::InvalidProgram(format!(
                    "column {column} has bounds [{lower}, {upper}]"
                )));
            }
        }
        for (index, row) in self.rows.iter().enumerate() {
            if !row.rhs.is_finite() {
                return Err(LpError::InvalidProgram(format!("row {index} has rhs {}", row.rhs)));
            }
            for &(column, coefficient) in &row.terms {
                if column >= self.bounds.len() || !coefficient.is_finite() {
                    return Err(LpError::InvalidProgram(format!(
                        "row {index} has term {coefficient} * x{column}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// An optimal assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// Value per column, indexed like the program's columns
    pub values: Vec<f64>,
    /// Objective value at `values`
    pub objective: f64,
    /// Number of pivots performed
    pub iterations: usize,
}

/// Errors reported by a backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LpError {
    #[error("The rows have no feasible assignment")]
    Infeasible,

    #[error("The objective is unbounded below")]
    Unbounded,

    #[error("Iteration limit of {0} pivots reached")]
    IterationLimit(usize),

    #[error("Malformed program: {0}")]
    InvalidProgram(String),
}
