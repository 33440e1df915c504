//! Heatmap rendering for hazard density grids.
//!
//! - Color ramp over normalized densities
//! - Rasterization of a grid into a georeferenced RGBA image
//! - PNG encoding (indexed or RGBA)
//! - Single-overlay slot for swapping rendered images

pub mod overlay;
pub mod png;
pub mod ramp;
pub mod raster;

pub use overlay::{Overlay, OverlayMetadata, OverlaySlot, RenderTicket};
pub use ramp::{color_for, normalize, Color};
pub use raster::{render, render_grid, RasterImage};
