//! Tab-based layout built on a [`LinearSpec`].

use alm_core::{LayoutError, LayoutResult, Operator, Penalty, SolverConfig};
use alm_linear::{Constraint, LinearSpec, SolveReport, Tab, XTab, YTab};
use indexmap::IndexMap;
use log::debug;

use crate::frame::Frame;
use crate::grid::{Area, Column, Edge, Row};

/// Default weight of a preferred-size pull.
pub const DEFAULT_PREFERRED_WEIGHT: f64 = 0.5;

/// Size constraints owned by an area, one per dimension and kind.
#[derive(Debug, Default)]
struct AreaConstraints {
    min_width: Option<Constraint>,
    min_height: Option<Constraint>,
    max_width: Option<Constraint>,
    max_height: Option<Constraint>,
    preferred_width: Option<Constraint>,
    preferred_height: Option<Constraint>,
}

impl AreaConstraints {
    /// Width and height slots of one kind of limit.
    fn slots(&mut self, limit: Limit) -> (&mut Option<Constraint>, &mut Option<Constraint>) {
        match limit {
            Limit::Min => (&mut self.min_width, &mut self.min_height),
            Limit::Max => (&mut self.max_width, &mut self.max_height),
            Limit::Preferred(_) => (&mut self.preferred_width, &mut self.preferred_height),
        }
    }

    fn all(&self) -> impl Iterator<Item = Constraint> {
        [
            self.min_width,
            self.min_height,
            self.max_width,
            self.max_height,
            self.preferred_width,
            self.preferred_height,
        ]
        .into_iter()
        .flatten()
    }
}

/// Kind of size limit placed on an area.
#[derive(Clone, Copy)]
enum Limit {
    Min,
    Max,
    Preferred(Penalty),
}

impl Limit {
    fn operator(self) -> Operator {
        match self {
            Limit::Min => Operator::Ge,
            Limit::Max => Operator::Le,
            Limit::Preferred(_) => Operator::Eq,
        }
    }

    fn penalty(self) -> Option<Penalty> {
        match self {
            Limit::Preferred(penalty) => Some(penalty),
            Limit::Min | Limit::Max => None,
        }
    }
}

/// Which span of an area a size constraint measures.
#[derive(Clone, Copy)]
enum Span {
    Width,
    Height,
}

/// A layout whose geometry is the solution of a linear specification.
///
/// The layout owns its border tabs. `left` and `top` are pinned at zero,
/// `right` and `bottom` follow [`AlmLayout::set_size`].
#[derive(Debug)]
pub struct AlmLayout {
    spec: LinearSpec,
    left: XTab,
    right: XTab,
    top: YTab,
    bottom: YTab,
    width: Option<Constraint>,
    height: Option<Constraint>,
    areas: IndexMap<u32, (Area, AreaConstraints)>,
    next_area: u32,
}

impl AlmLayout {
    pub fn new() -> LayoutResult<Self> {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> LayoutResult<Self> {
        let mut spec = LinearSpec::with_config(config);

        let left = spec.add_x_tab()?;
        let right = spec.add_x_tab()?;
        let top = spec.add_y_tab()?;
        let bottom = spec.add_y_tab()?;
        spec.set_label(left, "left")?;
        spec.set_label(right, "right")?;
        spec.set_label(top, "top")?;
        spec.set_label(bottom, "bottom")?;

        spec.set_range(left, 0.0, 0.0)?;
        spec.set_range(top, 0.0, 0.0)?;
        spec.is_smaller_or_equal(left, right)?;
        spec.is_smaller_or_equal(top, bottom)?;

        Ok(Self {
            spec,
            left,
            right,
            top,
            bottom,
            width: None,
            height: None,
            areas: IndexMap::new(),
            next_area: 0,
        })
    }

    pub fn spec(&self) -> &LinearSpec {
        &self.spec
    }

    pub fn spec_mut(&mut self) -> &mut LinearSpec {
        &mut self.spec
    }

    pub fn left(&self) -> XTab {
        self.left
    }

    pub fn right(&self) -> XTab {
        self.right
    }

    pub fn top(&self) -> YTab {
        self.top
    }

    pub fn bottom(&self) -> YTab {
        self.bottom
    }

    /// Pin the layout to `width` x `height`.
    pub fn set_size(&mut self, width: f64, height: f64) -> LayoutResult<()> {
        for extent in [width, height] {
            if !extent.is_finite() || extent < 0.0 {
                return Err(LayoutError::InvalidRange { min: 0.0, max: extent });
            }
        }

        self.width = Some(match self.width {
            Some(constraint) => {
                self.spec.set_rhs(constraint, width)?;
                constraint
            }
            None => self
                .spec
                .add_constraint([(1.0, self.right), (-1.0, self.left)], Operator::Eq, width)?,
        });
        self.height = Some(match self.height {
            Some(constraint) => {
                self.spec.set_rhs(constraint, height)?;
                constraint
            }
            None => self
                .spec
                .add_constraint([(1.0, self.bottom), (-1.0, self.top)], Operator::Eq, height)?,
        });

        debug!("layout size set to {width}x{height}");
        Ok(())
    }

    /// Add a column with two fresh tabs.
    pub fn add_column(&mut self) -> LayoutResult<Column> {
        let left = self.spec.add_x_tab()?;
        self.column_between(left)
    }

    /// Add a column directly right of `previous`, sharing its right tab.
    pub fn column_after(&mut self, previous: Column) -> LayoutResult<Column> {
        self.column_between(previous.right)
    }

    fn column_between(&mut self, left: XTab) -> LayoutResult<Column> {
        let right = self.spec.add_x_tab()?;
        self.spec.is_smaller_or_equal(left, right)?;
        Ok(Column { left, right })
    }

    /// Add a row with two fresh tabs.
    pub fn add_row(&mut self) -> LayoutResult<Row> {
        let top = self.spec.add_y_tab()?;
        self.row_between(top)
    }

    /// Add a row directly below `previous`, sharing its bottom tab.
    pub fn row_after(&mut self, previous: Row) -> LayoutResult<Row> {
        self.row_between(previous.bottom)
    }

    fn row_between(&mut self, top: YTab) -> LayoutResult<Row> {
        let bottom = self.spec.add_y_tab()?;
        self.spec.is_smaller_or_equal(top, bottom)?;
        Ok(Row { top, bottom })
    }

    /// Stretch a column between the layout's left and right borders.
    pub fn fill_width(&mut self, column: Column) -> LayoutResult<()> {
        self.spec.is_equal(column.left, self.left)?;
        self.spec.is_equal(column.right, self.right)?;
        Ok(())
    }

    /// Stretch a row between the layout's top and bottom borders.
    pub fn fill_height(&mut self, row: Row) -> LayoutResult<()> {
        self.spec.is_equal(row.top, self.top)?;
        self.spec.is_equal(row.bottom, self.bottom)?;
        Ok(())
    }

    /// Add an area spanning `column` and `row`.
    pub fn add_area(&mut self, column: Column, row: Row) -> LayoutResult<Area> {
        for tab in [column.left.variable(), column.right.variable(), row.top.variable(), row.bottom.variable()] {
            self.spec.variable(tab)?;
        }

        let id = self.next_area;
        self.next_area += 1;
        let area = Area {
            layout: self.spec.id(),
            id,
            column,
            row,
        };
        self.areas.insert(id, (area, AreaConstraints::default()));
        Ok(area)
    }

    /// Remove an area and the size constraints it owns. Its tabs stay.
    ///
    /// Constraints already removed through [`AlmLayout::spec_mut`] are
    /// skipped. The area is only forgotten once all of its constraints
    /// are gone.
    pub fn remove_area(&mut self, area: Area) -> LayoutResult<()> {
        let owned: Vec<Constraint> = self.owned(area)?.all().collect();
        for constraint in owned {
            if self.spec.constraint(constraint).is_ok() {
                self.spec.remove_constraint(constraint)?;
            }
        }
        self.areas.shift_remove(&area.id);
        debug!("removed area {}", area.id);
        Ok(())
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    /// Hard lower limit on the area's size.
    pub fn set_min_size(&mut self, area: Area, width: f64, height: f64) -> LayoutResult<()> {
        self.set_limit(area, Limit::Min, width, height)
    }

    /// Hard upper limit on the area's size.
    pub fn set_max_size(&mut self, area: Area, width: f64, height: f64) -> LayoutResult<()> {
        self.set_limit(area, Limit::Max, width, height)
    }

    /// Soft pull of the area's size towards `width` x `height`.
    pub fn set_preferred_size(&mut self, area: Area, width: f64, height: f64) -> LayoutResult<()> {
        self.set_preferred_size_with(area, width, height, Penalty::new(DEFAULT_PREFERRED_WEIGHT, 0)?)
    }

    pub fn set_preferred_size_with(
        &mut self,
        area: Area,
        width: f64,
        height: f64,
        penalty: Penalty,
    ) -> LayoutResult<()> {
        Penalty::new(penalty.weight, penalty.priority)?;
        self.set_limit(area, Limit::Preferred(penalty), width, height)
    }

    /// Place both size constraints of one kind, or neither.
    fn set_limit(&mut self, area: Area, limit: Limit, width: f64, height: f64) -> LayoutResult<()> {
        for extent in [width, height] {
            if !extent.is_finite() || extent < 0.0 {
                return Err(LayoutError::InvalidRange { min: 0.0, max: extent });
            }
        }

        let (width_slot, height_slot) = {
            let (width_slot, height_slot) = self.owned_mut(area)?.slots(limit);
            (*width_slot, *height_slot)
        };
        let (width_slot, height_slot) = (self.live(width_slot), self.live(height_slot));
        let width_undo = self.snapshot(width_slot)?;

        let width_constraint = self.upsert(width_slot, area, Span::Width, limit, width)?;
        let height_constraint = match self.upsert(height_slot, area, Span::Height, limit, height) {
            Ok(constraint) => constraint,
            Err(err) => {
                self.restore(width_constraint, width_undo)?;
                return Err(err);
            }
        };

        let (width_slot, height_slot) = self.owned_mut(area)?.slots(limit);
        *width_slot = Some(width_constraint);
        *height_slot = Some(height_constraint);
        Ok(())
    }

    /// Tie the area's left edge to an x-tab.
    pub fn bind_left(&mut self, area: Area, tab: XTab) -> LayoutResult<Constraint> {
        self.spec.is_equal(area.left(), tab)
    }

    /// Tie the area's right edge to an x-tab.
    pub fn bind_right(&mut self, area: Area, tab: XTab) -> LayoutResult<Constraint> {
        self.spec.is_equal(area.right(), tab)
    }

    /// Tie the area's top edge to a y-tab.
    pub fn bind_top(&mut self, area: Area, tab: YTab) -> LayoutResult<Constraint> {
        self.spec.is_equal(area.top(), tab)
    }

    /// Tie the area's bottom edge to a y-tab.
    pub fn bind_bottom(&mut self, area: Area, tab: YTab) -> LayoutResult<Constraint> {
        self.spec.is_equal(area.bottom(), tab)
    }

    /// Tie any edge to any tab. Fails with [`LayoutError::AxisMismatch`]
    /// when the tab lies on the other axis.
    pub fn bind_edge(&mut self, area: Area, edge: Edge, tab: impl Into<Tab>) -> LayoutResult<Constraint> {
        self.spec.is_equal(area.edge(edge), tab.into())
    }

    pub fn solve(&mut self) -> LayoutResult<SolveReport> {
        self.spec.solve()
    }

    /// Solved rectangle of an area.
    pub fn frame(&self, area: Area) -> LayoutResult<Frame> {
        self.owned(area)?;
        Ok(Frame::from_edges(
            self.spec.value(area.left())?,
            self.spec.value(area.top())?,
            self.spec.value(area.right())?,
            self.spec.value(area.bottom())?,
        ))
    }

    /// Solved rectangle of the whole layout.
    pub fn bounds(&self) -> LayoutResult<Frame> {
        Ok(Frame::from_edges(
            self.spec.value(self.left)?,
            self.spec.value(self.top)?,
            self.spec.value(self.right)?,
            self.spec.value(self.bottom)?,
        ))
    }

    fn owned(&self, area: Area) -> LayoutResult<&AreaConstraints> {
        self.check_area(area)?;
        self.areas
            .get(&area.id)
            .map(|(_, owned)| owned)
            .ok_or_else(|| unknown_area(area))
    }

    fn owned_mut(&mut self, area: Area) -> LayoutResult<&mut AreaConstraints> {
        self.check_area(area)?;
        self.areas
            .get_mut(&area.id)
            .map(|(_, owned)| owned)
            .ok_or_else(|| unknown_area(area))
    }

    fn check_area(&self, area: Area) -> LayoutResult<()> {
        if area.layout == self.spec.id() {
            Ok(())
        } else {
            Err(LayoutError::ForeignVariable {
                variable: format!("area {}", area.id),
            })
        }
    }

    /// `constraint` if it is still registered in the specification.
    fn live(&self, constraint: Option<Constraint>) -> Option<Constraint> {
        constraint.filter(|&constraint| self.spec.constraint(constraint).is_ok())
    }

    /// Right-hand side and penalty of an existing constraint.
    fn snapshot(&self, constraint: Option<Constraint>) -> LayoutResult<Option<(f64, Option<Penalty>)>> {
        match constraint {
            Some(constraint) => {
                let view = self.spec.constraint(constraint)?;
                Ok(Some((view.rhs(), view.penalty())))
            }
            None => Ok(None),
        }
    }

    /// Undo an [`AlmLayout::upsert`]: drop a fresh constraint, or put back
    /// the previous right-hand side and penalty of an edited one.
    fn restore(&mut self, constraint: Constraint, previous: Option<(f64, Option<Penalty>)>) -> LayoutResult<()> {
        match previous {
            None => self.spec.remove_constraint(constraint),
            Some((rhs, penalty)) => {
                self.spec.set_rhs(constraint, rhs)?;
                match penalty {
                    Some(penalty) => self.spec.set_constraint_penalty(constraint, penalty.weight, penalty.priority),
                    None => self.spec.make_hard(constraint),
                }
            }
        }
    }

    /// Update an existing size constraint in place or add a new one.
    fn upsert(
        &mut self,
        existing: Option<Constraint>,
        area: Area,
        span: Span,
        limit: Limit,
        rhs: f64,
    ) -> LayoutResult<Constraint> {
        if let Some(constraint) = existing {
            self.spec.set_rhs(constraint, rhs)?;
            if let Some(penalty) = limit.penalty() {
                self.spec.set_constraint_penalty(constraint, penalty.weight, penalty.priority)?;
            }
            return Ok(constraint);
        }

        let (low, high) = match span {
            Span::Width => (area.left().variable(), area.right().variable()),
            Span::Height => (area.top().variable(), area.bottom().variable()),
        };
        let terms = [(1.0, high), (-1.0, low)];
        match limit.penalty() {
            Some(penalty) => self.spec.add_soft_constraint(terms, limit.operator(), rhs, penalty),
            None => self.spec.add_constraint(terms, limit.operator(), rhs),
        }
    }
}

fn unknown_area(area: Area) -> LayoutError {
    LayoutError::UnknownConstraint {
        constraint: format!("area {}", area.id),
    }
}
