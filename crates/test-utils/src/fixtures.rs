//! Common test fixtures for hazard-map tests.
//!
//! Pre-defined payloads representing the shapes the Report Store serves.

use serde_json::{json, Value};

/// Common bounds definitions as `(min_lat, max_lat, min_lon, max_lon)`.
pub mod bounds {
    /// The 2x2 worked example: 0..2 on both axes.
    pub const UNIT_2X2: (f64, f64, f64, f64) = (0.0, 2.0, 0.0, 2.0);

    /// Kraków city centre, roughly.
    pub const KRAKOW: (f64, f64, f64, f64) = (50.00, 50.12, 19.85, 20.10);

    /// Inverted latitude (min > max).
    pub const INVERTED: (f64, f64, f64, f64) = (10.0, 5.0, 0.0, 1.0);
}

/// The 2x2 worked example grid: `[[0, 4], [2, 0]]`.
pub fn example_rows() -> Vec<Vec<f64>> {
    vec![vec![0.0, 4.0], vec![2.0, 0.0]]
}

fn bounds_json(b: (f64, f64, f64, f64)) -> Value {
    json!({"min_lat": b.0, "max_lat": b.1, "min_lon": b.2, "max_lon": b.3})
}

/// Bare heatmap payload with a top-level `resolution`.
pub fn bare_heatmap_json(rows: &[Vec<f64>], b: (f64, f64, f64, f64)) -> String {
    json!({
        "bounds": bounds_json(b),
        "resolution": rows.len(),
        "heatmap": rows,
    })
    .to_string()
}

/// Enveloped heatmap payload as produced by `GET /api/heatmap`.
pub fn enveloped_heatmap_json(rows: &[Vec<f64>], b: (f64, f64, f64, f64)) -> String {
    json!({
        "status": "ok",
        "message": "Heatmap generated successfully",
        "data": {
            "heatmap": rows,
            "bounds": bounds_json(b),
            "grid_info": {
                "resolution": rows.len(),
                "radius_degrees": 0.01,
                "num_points": 3,
                "normalized": true
            }
        }
    })
    .to_string()
}

/// Error envelope returned when the store has no reports.
pub fn no_data_json() -> String {
    json!({"status": "error", "message": "No data available for heatmap"}).to_string()
}

/// A small report listing around Kraków.
pub fn reports_json() -> String {
    json!([
        {"id": 1, "date": "2025-11-03T18:20:00Z", "x": 50.0614, "y": 19.9366, "email": "a@example.com"},
        {"id": 2, "date": "2025-11-03T19:05:00Z", "x": 50.0620, "y": 19.9370, "email": "b@example.com"},
        {"id": 3, "date": "2025-11-04 08:00:00", "coordinates": [50.0700, 19.9500], "trust": 3},
        {"id": 4, "label": "no position"}
    ])
    .to_string()
}
