//! # tsgraph-core
//!
//! Core types for the tsgraph plotting widget: numeric containers,
//! datasets, pixel geometry, number formatting and the drawing-surface
//! abstraction every painter goes through.

pub mod array;
pub mod dataset;
pub mod error;
pub mod format;
pub mod geometry;
pub mod render;

pub use array::*;
pub use dataset::*;
pub use error::*;
pub use format::*;
pub use geometry::*;
pub use render::*;

// ============================================================================
// COLOR CONSTANTS
// ============================================================================

pub mod colors {
    pub const BACKGROUND: &str = "#ffffff";
    pub const FRAME: &str = "#000000";
    pub const TEXT: &str = "#000000";
    pub const CROSSHAIR: &str = "#808080";
    pub const HANDLE_OUTLINE: &str = "#ffffff";
    pub const HANDLE: &str = "#000000";

    /// Default line colors, cycled by plot index
    pub const PALETTE: [&str; 8] = [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    ];

    pub fn palette(index: usize) -> &'static str {
        PALETTE[index % PALETTE.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(colors::palette(0), colors::palette(8));
        assert_ne!(colors::palette(0), colors::palette(1));
    }
}
