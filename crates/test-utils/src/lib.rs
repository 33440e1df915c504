//! Shared test utilities for the hazard-map workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Density grid generators
//! - Heatmap and report JSON fixtures
//! - Temporary file helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, create_hotspot_rows};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

use std::io::Write;

/// Write `contents` to a fresh temporary file and return its handle.
///
/// The file is deleted when the handle is dropped.
pub fn write_temp_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
