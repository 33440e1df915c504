//! Proximity danger classification for observer positions.

use std::fmt;
use std::time::{Duration, Instant};

use hazard_common::{CellValue, DensityGrid, ValueRange};
use renderer::ramp::normalize_in;
use serde::Serialize;

/// Default minimum spacing between two alerts.
pub const DEFAULT_ALERT_COOLDOWN: Duration = Duration::from_secs(30);

/// Danger band of a normalized density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DangerLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl DangerLevel {
    /// Band for a normalized intensity in `[0, 1]`.
    pub fn classify(t: f64) -> Self {
        if t < 0.25 {
            DangerLevel::Low
        } else if t < 0.5 {
            DangerLevel::Medium
        } else if t < 0.75 {
            DangerLevel::High
        } else {
            DangerLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DangerLevel::Low => "LOW",
            DangerLevel::Medium => "MEDIUM",
            DangerLevel::High => "HIGH",
            DangerLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Danger reading for a position that falls on a dense cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DangerReading {
    pub level: DangerLevel,
    /// Raw cell density.
    pub value: f64,
    /// Density normalized against the grid's positive range.
    pub intensity: f64,
    pub row: usize,
    pub col: usize,
}

/// Classify the cell under `(lat, lon)`.
///
/// Positions outside the grid and cells without density have no reading.
pub fn assess(grid: &DensityGrid, lat: f64, lon: f64) -> Option<DangerReading> {
    assess_in(grid, &grid.positive_range(), lat, lon)
}

/// [`assess`] with the grid's positive range already computed.
pub fn assess_in(
    grid: &DensityGrid,
    range: &ValueRange,
    lat: f64,
    lon: f64,
) -> Option<DangerReading> {
    match grid.lookup(lat, lon) {
        CellValue::Inside { row, col, value } if value > 0.0 => {
            let intensity = normalize_in(value, range);
            Some(DangerReading {
                level: DangerLevel::classify(intensity),
                value,
                intensity,
                row,
                col,
            })
        }
        _ => None,
    }
}

/// Rate limiter for alerts.
#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown: Duration,
    last_fired: Option<Instant>,
}

impl Default for AlertGate {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_COOLDOWN)
    }
}

impl AlertGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether an alert may fire at `now`. Records `now` when it may.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        let open = match self.last_fired {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
        };
        if open {
            self.last_fired = Some(now);
        }
        open
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
