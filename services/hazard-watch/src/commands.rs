//! One-shot subcommands working on local files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use grid_builder::{build_density_grid, points_from_reports, BuildOptions};
use hazard_common::{ApiEnvelope, CellValue, DensityGrid, GridInfo, HeatmapPayload, Report};
use renderer::{OverlayMetadata, RasterImage};
use serde::Serialize;
use tracing::info;

use crate::danger::{assess, DangerLevel};

/// Load a bare or enveloped heatmap payload from `path`.
pub fn load_grid(path: &Path) -> Result<(DensityGrid, Option<GridInfo>)> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read heatmap file {}", path.display()))?;
    let payload = HeatmapPayload::parse(&body)
        .with_context(|| format!("Failed to parse heatmap file {}", path.display()))?;
    Ok(payload.into_grid()?)
}

/// Render a heatmap file to PNG, optionally writing the bounds sidecar.
pub fn render_file(
    input: &Path,
    output: &Path,
    scale: usize,
    bounds_out: Option<&Path>,
) -> Result<RasterImage> {
    let (grid, _) = load_grid(input)?;
    let image = renderer::render(&grid, scale)?;
    let png = image.encode_png()?;
    fs::write(output, &png)
        .with_context(|| format!("Failed to write PNG {}", output.display()))?;

    if let Some(path) = bounds_out {
        let metadata = OverlayMetadata::for_image(&image, 0);
        fs::write(path, serde_json::to_vec_pretty(&metadata)?)
            .with_context(|| format!("Failed to write bounds sidecar {}", path.display()))?;
    }

    info!(
        output = %output.display(),
        width = image.width(),
        painted_pixels = image.painted_pixels(),
        bytes = png.len(),
        "Rendered heatmap"
    );
    Ok(image)
}

/// Result of a point lookup, as printed by the `lookup` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    pub lat: f64,
    pub lon: f64,
    pub value: Option<f64>,
    pub level: Option<DangerLevel>,
}

impl LookupReport {
    pub fn describe(&self) -> String {
        match (self.value, self.level) {
            (None, _) => "outside grid".to_string(),
            (Some(v), Some(level)) => format!("{} ({})", v, level),
            (Some(v), None) => format!("{} (no hazard)", v),
        }
    }
}

pub fn lookup_file(input: &Path, lat: f64, lon: f64) -> Result<LookupReport> {
    let (grid, _) = load_grid(input)?;
    let value = match grid.lookup(lat, lon) {
        CellValue::Inside { value, .. } => Some(value),
        CellValue::OutOfBounds => None,
    };
    Ok(LookupReport {
        lat,
        lon,
        value,
        level: assess(&grid, lat, lon).map(|r| r.level),
    })
}

/// Build an enveloped heatmap payload from a report listing file.
///
/// Returns `None` (and writes nothing) when no report has a usable position.
pub fn build_file(reports: &Path, output: &Path, options: &BuildOptions) -> Result<Option<GridInfo>> {
    let body = fs::read_to_string(reports)
        .with_context(|| format!("Failed to read reports file {}", reports.display()))?;
    let reports: Vec<Report> = serde_json::from_str(&body)
        .with_context(|| format!("Failed to parse reports file {}", reports.display()))?;

    let points = points_from_reports(&reports);
    let Some(built) = build_density_grid(&points, options)? else {
        return Ok(None);
    };

    let envelope = ApiEnvelope::ok(built.to_payload(), "Heatmap generated successfully");
    fs::write(output, serde_json::to_vec(&envelope)?)
        .with_context(|| format!("Failed to write heatmap {}", output.display()))?;

    info!(
        output = %output.display(),
        points = points.len(),
        resolution = built.info.resolution,
        "Built heatmap"
    );
    Ok(Some(built.info))
}
