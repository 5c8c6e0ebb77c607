//! # tsgraph-scene
//!
//! Interactive layer of tsgraph: the graphic-object tree, draggable
//! regions (legend, ROI handles), figures with pan/zoom navigation and the
//! scene root that tiles figures over a content and an overlay surface.
//!
//! ## Architecture
//!
//! - `Scene` is platform independent: it takes pointer events in device
//!   pixels and paints into any [`tsgraph_core::RenderContext`]
//! - `web::WebScene` (wasm32 only) mounts two stacked canvases and feeds
//!   DOM events into a `Scene`
//! - items hold pixel rects while dragging and derive their data position
//!   once the drag ends

pub mod config;
pub mod draggable;
pub mod event;
pub mod figure;
pub mod legend;
pub mod node;
pub mod roi;
pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::*;
pub use draggable::*;
pub use event::*;
pub use figure::*;
pub use legend::*;
pub use node::*;
pub use roi::*;
pub use scene::*;
#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, WebScene};

// Re-export core types for convenience
pub use tsgraph_charts::{Axis, AxisScale, LinePlot, LineStyle, Orientation};
pub use tsgraph_core::colors;
