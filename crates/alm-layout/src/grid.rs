//! Columns, rows, and areas.
//!
//! These are plain handles made of tabs. They can only be obtained from an
//! [`AlmLayout`](crate::AlmLayout), which registers their tabs first.

use alm_core::Axis;
use alm_linear::{Solution, SpecId, Tab, XTab, YTab};

/// Edge of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    pub fn axis(&self) -> Axis {
        match self {
            Edge::Left | Edge::Right => Axis::Vertical,
            Edge::Top | Edge::Bottom => Axis::Horizontal,
        }
    }
}

/// A vertical strip between two x-tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub(crate) left: XTab,
    pub(crate) right: XTab,
}

impl Column {
    pub fn left(&self) -> XTab {
        self.left
    }

    pub fn right(&self) -> XTab {
        self.right
    }

    /// Solved width, if both tabs are in the solution.
    pub fn width(&self, solution: &Solution) -> Option<f64> {
        Some(solution.value(self.right)? - solution.value(self.left)?)
    }
}

/// A horizontal strip between two y-tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Row {
    pub(crate) top: YTab,
    pub(crate) bottom: YTab,
}

impl Row {
    pub fn top(&self) -> YTab {
        self.top
    }

    pub fn bottom(&self) -> YTab {
        self.bottom
    }

    /// Solved height, if both tabs are in the solution.
    pub fn height(&self, solution: &Solution) -> Option<f64> {
        Some(solution.value(self.bottom)? - solution.value(self.top)?)
    }
}

/// Handle to a rectangle spanned by a column and a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    pub(crate) layout: SpecId,
    pub(crate) id: u32,
    pub(crate) column: Column,
    pub(crate) row: Row,
}

impl Area {
    /// Specification of the layout that created this area.
    pub fn spec(&self) -> SpecId {
        self.layout
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn row(&self) -> Row {
        self.row
    }

    pub fn left(&self) -> XTab {
        self.column.left
    }

    pub fn right(&self) -> XTab {
        self.column.right
    }

    pub fn top(&self) -> YTab {
        self.row.top
    }

    pub fn bottom(&self) -> YTab {
        self.row.bottom
    }

    /// The tab positioning `edge`.
    pub fn edge(&self, edge: Edge) -> Tab {
        match edge {
            Edge::Left => Tab::X(self.left()),
            Edge::Right => Tab::X(self.right()),
            Edge::Top => Tab::Y(self.top()),
            Edge::Bottom => Tab::Y(self.bottom()),
        }
    }
}
