//! Hazard watch service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod client;
pub mod commands;
pub mod config;
pub mod danger;
pub mod output;
pub mod position;
pub mod watch;

pub use client::{HeatmapResponse, ReportStoreClient};
pub use config::{WatchArgs, WatchConfig};
pub use danger::{AlertGate, DangerLevel, DangerReading};
pub use watch::{DangerAlert, GridSnapshot, WatchState, WatchSummary, Watcher};
