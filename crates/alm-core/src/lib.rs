//! Core types, errors, and configuration for the ALM layout engine.
//!
//! This crate provides the foundational types used across the other alm crates:
//! - Axis, operator, and penalty value types
//! - Solver configuration
//! - Error types

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
