//! Variables and summands.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use alm_core::{Axis, Bounds};

static NEXT_SPEC_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`LinearSpec`](crate::LinearSpec). Handles carry it so a
/// specification can reject handles created by another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecId(u64);

impl SpecId {
    pub(crate) fn next() -> Self {
        Self(NEXT_SPEC_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a variable owned by a [`LinearSpec`](crate::LinearSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub(crate) spec: SpecId,
    pub(crate) id: u32,
}

impl Variable {
    /// The specification this variable belongs to.
    pub fn spec(&self) -> SpecId {
        self.spec
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.id)
    }
}

/// Per-variable state kept by the specification.
#[derive(Debug, Clone)]
pub struct VariableData {
    pub(crate) axis: Option<Axis>,
    pub(crate) bounds: Bounds,
    pub(crate) preferred: Option<f64>,
    pub(crate) penalty: f64,
    pub(crate) label: Option<String>,
}

impl VariableData {
    pub(crate) fn new(axis: Option<Axis>) -> Self {
        Self {
            axis,
            bounds: Bounds::UNBOUNDED,
            preferred: None,
            penalty: 1.0,
            label: None,
        }
    }

    /// Axis of the variable if it is a tab.
    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Value the solver is pulled towards, if any.
    pub fn preferred(&self) -> Option<f64> {
        self.preferred
    }

    /// Cost per unit of deviation from the preferred value.
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Name used in diagnostics: the label, or an axis-specific default.
    pub(crate) fn name(&self, id: u32) -> String {
        match (&self.label, self.axis) {
            (Some(label), _) => label.clone(),
            (None, Some(Axis::Vertical)) => format!("x{id}"),
            (None, Some(Axis::Horizontal)) => format!("y{id}"),
            (None, None) => format!("v{id}"),
        }
    }
}

/// One `coefficient * variable` term of a linear expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summand {
    pub coefficient: f64,
    pub variable: Variable,
}

impl Summand {
    pub fn new(coefficient: f64, variable: impl Into<Variable>) -> Self {
        Self {
            coefficient,
            variable: variable.into(),
        }
    }
}

impl<V: Into<Variable>> From<(f64, V)> for Summand {
    fn from((coefficient, variable): (f64, V)) -> Self {
        Self::new(coefficient, variable)
    }
}
