//! Wire shapes of the Report Store's heatmap endpoint.
//!
//! The endpoint answers either with a bare payload
//! `{bounds, resolution | grid_info, heatmap}` or with the same payload wrapped
//! in an envelope `{status, message?, data}`. Both are accepted. Structural
//! problems are reported as [`HazardError::DataError`], never as panics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DensityGrid, GeoBounds, HazardError, HazardResult};

/// Response status used by the Report Store API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Ok,
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

impl ApiStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiStatus::Ok | ApiStatus::Success)
    }
}

/// Generic `{status, message, data}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope around `data`.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Ok,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Error envelope without data.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Unwrap the data of an `ok` envelope.
    pub fn into_data(self) -> HazardResult<T> {
        if !self.status.is_ok() {
            return Err(HazardError::DataError(
                self.message
                    .unwrap_or_else(|| "upstream reported an error".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| HazardError::DataError("envelope is missing 'data'".to_string()))
    }
}

/// Metadata describing how a heatmap grid was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridInfo {
    pub resolution: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_degrees: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_points: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_i: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_j: Option<usize>,
}

impl GridInfo {
    /// Minimal metadata carrying only the resolution.
    pub fn with_resolution(resolution: usize) -> Self {
        Self {
            resolution,
            radius_degrees: None,
            lat_step: None,
            lon_step: None,
            num_points: None,
            normalized: None,
            delta_i: None,
            delta_j: None,
        }
    }
}

/// Heatmap payload, every field optional so that missing fields become data
/// errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatmapPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GeoBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_info: Option<GridInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<Vec<Vec<f64>>>,
}

impl HeatmapPayload {
    /// Parse a bare or enveloped heatmap response body.
    pub fn parse(body: &str) -> HazardResult<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }

    /// Same as [`HeatmapPayload::parse`] for an already decoded JSON value.
    pub fn from_value(value: Value) -> HazardResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| HazardError::DataError("heatmap response is not an object".to_string()))?;

        if obj.contains_key("status") {
            let envelope: ApiEnvelope<HeatmapPayload> = serde_json::from_value(value)?;
            envelope.into_data()
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    /// Payload describing `grid`, with optional production metadata.
    pub fn from_grid(grid: &DensityGrid, grid_info: Option<GridInfo>) -> Self {
        Self {
            bounds: Some(*grid.bounds()),
            resolution: Some(grid.resolution()),
            grid_info,
            heatmap: Some(grid.to_rows()),
        }
    }

    /// The declared resolution, reconciling `resolution` and `grid_info.resolution`.
    pub fn declared_resolution(&self) -> HazardResult<usize> {
        let from_info = self.grid_info.as_ref().map(|info| info.resolution);
        match (self.resolution, from_info) {
            (Some(a), Some(b)) if a != b => Err(HazardError::DataError(format!(
                "resolution {} disagrees with grid_info.resolution {}",
                a, b
            ))),
            (Some(r), _) | (None, Some(r)) => Ok(r),
            (None, None) => Err(HazardError::DataError("missing field 'resolution'".to_string())),
        }
    }

    /// Validate the payload and build the grid it describes.
    ///
    /// All or nothing: any structural problem fails the whole payload.
    pub fn into_grid(self) -> HazardResult<(DensityGrid, Option<GridInfo>)> {
        let resolution = self.declared_resolution()?;
        let bounds = self
            .bounds
            .ok_or_else(|| HazardError::DataError("missing field 'bounds'".to_string()))?;
        let rows = self
            .heatmap
            .ok_or_else(|| HazardError::DataError("missing field 'heatmap'".to_string()))?;

        if rows.len() != resolution {
            return Err(HazardError::DataError(format!(
                "heatmap has {} rows but resolution is {}",
                rows.len(),
                resolution
            )));
        }

        let grid = DensityGrid::from_rows(&rows, bounds)
            .map_err(|e| HazardError::DataError(e.to_string()))?;
        Ok((grid, self.grid_info))
    }
}
