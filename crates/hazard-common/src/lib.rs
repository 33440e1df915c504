//! Common types shared across the hazard-map crates and services.

pub mod bounds;
pub mod error;
pub mod grid;
pub mod payload;
pub mod report;

pub use bounds::GeoBounds;
pub use error::{HazardError, HazardResult};
pub use grid::{CellValue, DensityGrid, ValueRange};
pub use payload::{ApiEnvelope, ApiStatus, GridInfo, HeatmapPayload};
pub use report::Report;
