//! Navigation module
//!
//! Grid-based path search usable as the environment's navigation service.

mod grid;

pub use grid::NavGrid;
