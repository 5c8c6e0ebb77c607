//! # tsgraph-charts
//!
//! Axis machinery for scientific 2D plots.
//!
//! ## Architecture
//!
//! Uses Strategy pattern for:
//! - Axis transforms (linear, log, symlog, data indexed)
//! - Tick generation (nice linear steps, decades)
//!
//! ## Modules
//!
//! - `chartkit` - Transforms and tick generators
//! - `axis` - Axis state: scale, view bounds, internal range
//! - `mapper` - Internal coordinates <-> canvas pixels
//! - `plot` - Line plot data and styling

pub mod axis;
pub mod chartkit;
pub mod mapper;
pub mod plot;

pub use axis::*;
pub use chartkit::*;
pub use mapper::*;
pub use plot::*;

// Re-export colors from tsgraph-core for convenience
pub use tsgraph_core::colors;
