//! Linear constraints and objectives.

use std::fmt;

use alm_core::{Operator, Optimization, Penalty};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::variable::{SpecId, Summand, Variable, VariableData};

pub(crate) type Terms = SmallVec<[Summand; 4]>;

/// Handle to a constraint owned by a [`LinearSpec`](crate::LinearSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub(crate) spec: SpecId,
    pub(crate) id: u32,
}

impl Constraint {
    /// The specification this constraint belongs to.
    pub fn spec(&self) -> SpecId {
        self.spec
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.id)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstraintData {
    pub(crate) terms: Terms,
    pub(crate) op: Operator,
    pub(crate) rhs: f64,
    pub(crate) penalty: Option<Penalty>,
}

impl ConstraintData {
    pub(crate) fn references(&self, variable: Variable) -> bool {
        self.terms.iter().any(|term| term.variable == variable)
    }
}

/// A caller-supplied objective.
#[derive(Debug, Clone)]
pub(crate) struct Objective {
    pub(crate) terms: Terms,
    pub(crate) direction: Optimization,
}

/// Read-only view of a constraint.
///
/// Displays as `1 x1 - 1 x0 = 100`, with a `[soft w=.. p=..]` suffix for
/// soft constraints.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintView<'a> {
    pub(crate) data: &'a ConstraintData,
    pub(crate) variables: &'a IndexMap<u32, VariableData>,
}

impl<'a> ConstraintView<'a> {
    pub fn terms(&self) -> &'a [Summand] {
        let data: &'a ConstraintData = self.data;
        &data.terms
    }

    pub fn operator(&self) -> Operator {
        self.data.op
    }

    pub fn rhs(&self) -> f64 {
        self.data.rhs
    }

    pub fn penalty(&self) -> Option<Penalty> {
        self.data.penalty
    }

    pub fn is_soft(&self) -> bool {
        self.data.penalty.is_some()
    }

    /// Left-hand side evaluated with the given variable values.
    pub fn evaluate(&self, value: impl Fn(Variable) -> f64) -> f64 {
        self.data
            .terms
            .iter()
            .map(|term| term.coefficient * value(term.variable))
            .sum()
    }

    /// How far the left-hand side is from satisfying the relation.
    pub fn violation(&self, value: impl Fn(Variable) -> f64) -> f64 {
        let lhs = self.evaluate(value);
        match self.data.op {
            Operator::Le => (lhs - self.data.rhs).max(0.0),
            Operator::Ge => (self.data.rhs - lhs).max(0.0),
            Operator::Eq => (lhs - self.data.rhs).abs(),
        }
    }

    fn name(&self, variable: Variable) -> String {
        self.variables
            .get(&variable.id)
            .map(|data| data.name(variable.id))
            .unwrap_or_else(|| variable.to_string())
    }
}

impl fmt::Display for ConstraintView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, term) in self.data.terms.iter().enumerate() {
            let name = self.name(term.variable);
            let magnitude = term.coefficient.abs();
            match (index, term.coefficient < 0.0) {
                (0, false) => write!(f, "{magnitude} {name}")?,
                (0, true) => write!(f, "-{magnitude} {name}")?,
                (_, false) => write!(f, " + {magnitude} {name}")?,
                (_, true) => write!(f, " - {magnitude} {name}")?,
            }
        }
        write!(f, " {} {}", self.data.op, self.data.rhs)?;
        if let Some(penalty) = self.data.penalty {
            write!(f, " [soft w={} p={}]", penalty.weight, penalty.priority)?;
        }
        Ok(())
    }
}
