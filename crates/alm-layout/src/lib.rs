//! Tab-based geometry for the ALM engine.
//!
//! # Architecture
//!
//! - [`AlmLayout`] owns a [`LinearSpec`](alm_linear::LinearSpec) and its border tabs
//! - [`Column`] and [`Row`] are pairs of ordered tabs
//! - [`Area`] spans one column and one row, with min/max/preferred sizes
//! - [`Frame`] is the solved rectangle of an area
//!
//! # Example
//!
//! ```ignore
//! let mut layout = AlmLayout::new()?;
//! layout.set_size(300.0, 200.0)?;
//! let column = layout.add_column()?;
//! let row = layout.add_row()?;
//! layout.fill_width(column)?;
//! layout.fill_height(row)?;
//! let area = layout.add_area(column, row)?;
//! layout.solve()?;
//! let frame = layout.frame(area)?;
//! ```

mod frame;
mod grid;
mod layout;

pub use frame::Frame;
pub use grid::{Area, Column, Edge, Row};
pub use layout::{AlmLayout, DEFAULT_PREFERRED_WEIGHT};
