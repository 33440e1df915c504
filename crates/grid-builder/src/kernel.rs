//! Flat circular kernel density estimation over report locations.

use hazard_common::{DensityGrid, GeoBounds, GridInfo, HazardResult, HeatmapPayload, Report};
use tracing::{debug, warn};

use crate::BuildOptions;

/// Weight added per unit of scaled trust.
const TRUST_WEIGHT: f64 = 10.0;

/// A report location with its trust weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportPoint {
    pub lat: f64,
    pub lon: f64,
    pub trust: f64,
}

/// A freshly built grid and the metadata describing how it was made.
#[derive(Debug, Clone)]
pub struct BuiltGrid {
    pub grid: DensityGrid,
    pub info: GridInfo,
}

impl BuiltGrid {
    /// Heatmap payload in the Report Store's wire shape.
    pub fn to_payload(&self) -> HeatmapPayload {
        HeatmapPayload::from_grid(&self.grid, Some(self.info.clone()))
    }
}

/// Usable points from a report listing.
///
/// Reports without a position, or with a non-finite trust, are skipped.
pub fn points_from_reports(reports: &[Report]) -> Vec<ReportPoint> {
    let points: Vec<ReportPoint> = reports
        .iter()
        .filter_map(|r| {
            let (lat, lon) = r.position()?;
            let trust = r.trust_or_default();
            trust.is_finite().then_some(ReportPoint { lat, lon, trust })
        })
        .collect();

    if points.len() < reports.len() {
        warn!(
            skipped = reports.len() - points.len(),
            kept = points.len(),
            "Skipped reports without usable position or trust"
        );
    }
    points
}

/// Build a density grid around `points`.
///
/// Returns `Ok(None)` when there are no points: an empty report set has no
/// meaningful bounds.
pub fn build_density_grid(
    points: &[ReportPoint],
    options: &BuildOptions,
) -> HazardResult<Option<BuiltGrid>> {
    options.validate()?;
    if points.is_empty() {
        return Ok(None);
    }

    let bounds = point_bounds(points, options.padding_degrees)?;
    let scaled = scaled_trust(points, options.normalize);

    let resolution = options.resolution;
    let lat_step = bounds.lat_span() / resolution as f64;
    let lon_step = bounds.lon_span() / resolution as f64;
    let radius = options.radius_degrees;

    // Window half-widths in cells, capped so huge radii stay cheap
    let delta_i = ((radius / lat_step).ceil() as usize).min(resolution);
    let delta_j = ((radius / lon_step).ceil() as usize).min(resolution);

    let mut cells = vec![0.0f64; resolution * resolution];

    for (point, weight) in points.iter().zip(scaled.iter()) {
        let contribution = weight.abs() * TRUST_WEIGHT;
        if contribution == 0.0 {
            continue;
        }

        let i_center = ((point.lat - bounds.min_lat) / lat_step).floor() as isize;
        let j_center = ((point.lon - bounds.min_lon) / lon_step).floor() as isize;

        let (i_min, i_max) = window(i_center, delta_i, resolution);
        let (j_min, j_max) = window(j_center, delta_j, resolution);

        for i in i_min..i_max {
            let cell_lat = bounds.min_lat + (i as f64 + 0.5) * lat_step;
            for j in j_min..j_max {
                let cell_lon = bounds.min_lon + (j as f64 + 0.5) * lon_step;
                let distance = ((point.lat - cell_lat).powi(2) + (point.lon - cell_lon).powi(2)).sqrt();
                if distance <= radius {
                    cells[i * resolution + j] += contribution;
                }
            }
        }
    }

    let grid = DensityGrid::from_flat(resolution, cells, bounds)?;
    debug!(
        points = points.len(),
        resolution,
        delta_i,
        delta_j,
        painted_cells = grid.positive_count(),
        "Built density grid"
    );

    let info = GridInfo {
        resolution,
        radius_degrees: Some(radius),
        lat_step: Some(lat_step),
        lon_step: Some(lon_step),
        num_points: Some(points.len()),
        normalized: Some(options.normalize),
        delta_i: Some(delta_i),
        delta_j: Some(delta_j),
    };

    Ok(Some(BuiltGrid { grid, info }))
}

/// Padded bounding box of all points.
fn point_bounds(points: &[ReportPoint], padding: f64) -> HazardResult<GeoBounds> {
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    for p in points {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }
    GeoBounds::new(
        min_lat - padding,
        max_lat + padding,
        min_lon - padding,
        max_lon + padding,
    )
}

/// Trust per point, min-max scaled when `normalize` is set.
///
/// When every point carries the same trust there is nothing to scale and
/// each point gets full weight 1.
fn scaled_trust(points: &[ReportPoint], normalize: bool) -> Vec<f64> {
    if !normalize {
        return points.iter().map(|p| p.trust).collect();
    }

    let min = points.iter().map(|p| p.trust).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.trust).fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        points.iter().map(|p| (p.trust - min) / (max - min)).collect()
    } else {
        vec![1.0; points.len()]
    }
}

/// Half-open index window `[center - delta, center + delta]` clipped to the grid.
fn window(center: isize, delta: usize, resolution: usize) -> (usize, usize) {
    let delta = delta as isize;
    let lo = (center - delta).max(0) as usize;
    let hi = (center + delta + 1).clamp(0, resolution as isize) as usize;
    (lo.min(resolution), hi)
}
