//! Grid lines.
//!
//! A tab is a variable tagged with an axis. Tabs have no public constructor:
//! [`LinearSpec::add_x_tab`](crate::LinearSpec::add_x_tab) and
//! [`LinearSpec::add_y_tab`](crate::LinearSpec::add_y_tab) are the only
//! producers, so every tab is registered before use.

use std::fmt;

use alm_core::Axis;

use crate::variable::Variable;

/// Vertical grid line (x-tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XTab(Variable);

/// Horizontal grid line (y-tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YTab(Variable);

impl XTab {
    pub(crate) fn new(variable: Variable) -> Self {
        Self(variable)
    }

    pub fn variable(&self) -> Variable {
        self.0
    }
}

impl YTab {
    pub(crate) fn new(variable: Variable) -> Self {
        Self(variable)
    }

    pub fn variable(&self) -> Variable {
        self.0
    }
}

impl From<XTab> for Variable {
    fn from(tab: XTab) -> Self {
        tab.0
    }
}

impl From<YTab> for Variable {
    fn from(tab: YTab) -> Self {
        tab.0
    }
}

/// A tab of either axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    X(XTab),
    Y(YTab),
}

impl Tab {
    pub fn axis(&self) -> Axis {
        match self {
            Tab::X(_) => Axis::Vertical,
            Tab::Y(_) => Axis::Horizontal,
        }
    }

    pub fn variable(&self) -> Variable {
        match self {
            Tab::X(tab) => tab.variable(),
            Tab::Y(tab) => tab.variable(),
        }
    }

    pub fn as_x(&self) -> Option<XTab> {
        match self {
            Tab::X(tab) => Some(*tab),
            Tab::Y(_) => None,
        }
    }

    pub fn as_y(&self) -> Option<YTab> {
        match self {
            Tab::Y(tab) => Some(*tab),
            Tab::X(_) => None,
        }
    }
}

impl From<XTab> for Tab {
    fn from(tab: XTab) -> Self {
        Tab::X(tab)
    }
}

impl From<YTab> for Tab {
    fn from(tab: YTab) -> Self {
        Tab::Y(tab)
    }
}

impl From<Tab> for Variable {
    fn from(tab: Tab) -> Self {
        tab.variable()
    }
}

impl fmt::Display for XTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0.id)
    }
}

impl fmt::Display for YTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y{}", self.0.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinearSpec;

    #[test]
    fn test_tab_axis() {
        let mut spec = LinearSpec::new();
        let x = spec.add_x_tab().unwrap();
        let y = spec.add_y_tab().unwrap();

        assert_eq!(Tab::from(x).axis(), Axis::Vertical);
        assert_eq!(Tab::from(y).axis(), Axis::Horizontal);
        assert_eq!(Tab::from(x).as_x(), Some(x));
        assert_eq!(Tab::from(x).as_y(), None);
        assert_eq!(Variable::from(x), x.variable());
    }

    #[test]
    fn test_tabs_are_registered() {
        let mut spec = LinearSpec::new();
        let x = spec.add_x_tab().unwrap();
        let data = spec.variable(x).unwrap();
        assert_eq!(data.axis(), Some(Axis::Vertical));
        assert_eq!(spec.variable_count(), 1);
    }
}
