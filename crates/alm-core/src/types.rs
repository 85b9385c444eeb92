//! Core value types for layout specifications.

use std::fmt;

use crate::errors::{LayoutError, LayoutResult};

/// Axis of a grid line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Vertical grid line (x-tab), positions left/right edges
    Vertical,
    /// Horizontal grid line (y-tab), positions top/bottom edges
    Horizontal,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Vertical => write!(f, "vertical"),
            Axis::Horizontal => write!(f, "horizontal"),
        }
    }
}

/// Relational operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    Le,
    Eq,
    Ge,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Le => write!(f, "<="),
            Operator::Eq => write!(f, "="),
            Operator::Ge => write!(f, ">="),
        }
    }
}

/// Direction of a caller-supplied objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Optimization {
    #[default]
    Minimize,
    Maximize,
}

/// Penalty attached to a soft constraint.
///
/// A violation of `v` costs `weight * v` in the objective. Tiers with a
/// higher `priority` are minimized first by the lexicographic strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Penalty {
    pub weight: f64,
    pub priority: i32,
}

impl Penalty {
    pub fn new(weight: f64, priority: i32) -> LayoutResult<Self> {
        Ok(Self {
            weight: validate_weight(weight)?,
            priority,
        })
    }

    /// A penalty in the default tier.
    pub fn weight(weight: f64) -> LayoutResult<Self> {
        Self::new(weight, 0)
    }
}

/// Closed interval a variable must lie in. Infinite ends are unbounded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    /// Fails for NaN ends, `min > max`, and ranges with no finite point
    /// (`min = +inf` or `max = -inf`).
    pub fn new(min: f64, max: f64) -> LayoutResult<Self> {
        if min.is_nan() || max.is_nan() || min > max || min == f64::INFINITY || max == f64::NEG_INFINITY {
            return Err(LayoutError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == f64::NEG_INFINITY && self.max == f64::INFINITY
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Check a penalty weight: finite and non-negative.
pub fn validate_weight(weight: f64) -> LayoutResult<f64> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(LayoutError::InvalidWeight { weight })
    }
}

/// Check a coefficient or constant: finite.
pub fn validate_coefficient(value: f64) -> LayoutResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::InvalidCoefficient { value })
    }
}
