//! Density grid construction from hazard reports.
//!
//! Every report spreads its (optionally normalized) trust weight over the
//! grid cells whose centres lie within a fixed radius of the report, using a
//! flat circular kernel:
//!
//! ```text
//! reports ──► bounds (min/max + padding)
//!         ──► trust scaling (min-max, optional)
//!         ──► per report: window of ±delta cells around its cell
//!                 └─► cell centre within radius?  value += |trust| * 10
//!         ──► DensityGrid + GridInfo
//! ```

pub mod kernel;
pub mod options;

pub use kernel::{build_density_grid, points_from_reports, BuiltGrid, ReportPoint};
pub use options::BuildOptions;
