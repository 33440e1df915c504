//! Square density grids over a geographic rectangle.
//!
//! Row `i` is the latitude band `i` counted from `min_lat` northward, so row 0
//! is the southernmost band. Column `j` is the longitude band counted from
//! `min_lon` eastward. Cells are stored row-major in a flat buffer.

use serde::{Deserialize, Serialize};

use crate::{GeoBounds, HazardError, HazardResult};

/// Immutable density snapshot.
///
/// Every constructor validates the shape, bounds and values, so a
/// `DensityGrid` that exists is always renderable and queryable.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    cells: Vec<f64>,
    resolution: usize,
    bounds: GeoBounds,
}

impl DensityGrid {
    /// Build a grid from nested rows as delivered by the heatmap endpoint.
    pub fn from_rows(rows: &[Vec<f64>], bounds: GeoBounds) -> HazardResult<Self> {
        let resolution = rows.len();
        if resolution == 0 {
            return Err(HazardError::InvalidGrid("grid has no rows".to_string()));
        }

        let mut cells = Vec::with_capacity(resolution * resolution);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != resolution {
                return Err(HazardError::InvalidGrid(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    resolution
                )));
            }
            cells.extend_from_slice(row);
        }

        Self::from_flat(resolution, cells, bounds)
    }

    /// Build a grid from a row-major flat buffer of `resolution²` cells.
    pub fn from_flat(resolution: usize, cells: Vec<f64>, bounds: GeoBounds) -> HazardResult<Self> {
        if resolution == 0 {
            return Err(HazardError::InvalidGrid(
                "resolution must be positive".to_string(),
            ));
        }
        let expected = resolution
            .checked_mul(resolution)
            .ok_or_else(|| HazardError::InvalidGrid(format!("resolution {} overflows", resolution)))?;
        if cells.len() != expected {
            return Err(HazardError::InvalidGrid(format!(
                "expected {} cells for resolution {}, got {}",
                expected,
                resolution,
                cells.len()
            )));
        }
        bounds.validate()?;

        if let Some(idx) = cells.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(HazardError::InvalidGrid(format!(
                "cell ({}, {}) holds {} (values must be finite and non-negative)",
                idx / resolution,
                idx % resolution,
                cells[idx]
            )));
        }

        Ok(Self {
            cells,
            resolution,
            bounds,
        })
    }

    /// Number of rows (and columns).
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Value at `(row, col)`, or `None` outside the matrix.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.resolution || col >= self.resolution {
            return None;
        }
        self.cells.get(row * self.resolution + col).copied()
    }

    /// Iterate rows from south (row 0) to north.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks_exact(self.resolution)
    }

    /// Nested-row copy of the cells, the wire layout of `heatmap`.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Height of one latitude band in degrees.
    pub fn lat_step(&self) -> f64 {
        self.bounds.lat_span() / self.resolution as f64
    }

    /// Width of one longitude band in degrees.
    pub fn lon_step(&self) -> f64 {
        self.bounds.lon_span() / self.resolution as f64
    }

    /// Number of cells holding an observation (value > 0).
    pub fn positive_count(&self) -> usize {
        self.cells.iter().filter(|v| **v > 0.0).count()
    }

    /// Minimum and maximum over strictly positive cells.
    ///
    /// Zero cells mean "no observation" and are excluded. With no positive
    /// cells both ends are 0.
    pub fn positive_range(&self) -> ValueRange {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.cells.iter().filter(|v| **v > 0.0) {
            min = min.min(v);
            max = max.max(v);
        }
        if min.is_finite() {
            ValueRange { min, max }
        } else {
            ValueRange { min: 0.0, max: 0.0 }
        }
    }

    /// Density of the cell containing `(lat, lon)`.
    ///
    /// Points outside the bounds (or NaN) yield [`CellValue::OutOfBounds`].
    /// Points on the north/east edge map to the last band.
    pub fn lookup(&self, lat: f64, lon: f64) -> CellValue {
        if !self.bounds.contains(lat, lon) {
            return CellValue::OutOfBounds;
        }

        let row = self.band_index((lat - self.bounds.min_lat) / self.lat_step());
        let col = self.band_index((lon - self.bounds.min_lon) / self.lon_step());

        CellValue::Inside {
            row,
            col,
            value: self.cells[row * self.resolution + col],
        }
    }

    /// Geographic centre of cell `(row, col)` as `(lat, lon)`.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.bounds.min_lat + (row as f64 + 0.5) * self.lat_step(),
            self.bounds.min_lon + (col as f64 + 0.5) * self.lon_step(),
        )
    }

    fn band_index(&self, fractional: f64) -> usize {
        // floor, then clamp: lat == max_lat lands exactly on `resolution`
        let idx = fractional.floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.resolution - 1)
        }
    }
}

/// Positive-only value statistics of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// True when the range cannot be used as a divisor.
    pub fn is_degenerate(&self) -> bool {
        let span = self.max - self.min;
        !span.is_finite() || span <= 0.0
    }
}

/// Result of a point query against a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// The point falls in cell `(row, col)`.
    Inside { row: usize, col: usize, value: f64 },
    /// The point lies outside the grid's bounds.
    OutOfBounds,
}

impl CellValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            CellValue::Inside { value, .. } => Some(*value),
            CellValue::OutOfBounds => None,
        }
    }

    /// Inside the grid and in a cell with at least one observation.
    pub fn has_density(&self) -> bool {
        matches!(self, CellValue::Inside { value, .. } if *value > 0.0)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Inside { row, col, value } => {
                write!(f, "{} (cell {}, {})", value, row, col)
            }
            CellValue::OutOfBounds => write!(f, "outside grid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> GeoBounds {
        GeoBounds::new(0.0, 2.0, 0.0, 2.0).unwrap()
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![0.0, 1.0], vec![2.0]];
        let err = DensityGrid::from_rows(&rows, unit_bounds()).unwrap_err();
        assert!(matches!(err, HazardError::InvalidGrid(_)));
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        let rows = vec![vec![0.0, 1.0, 2.0], vec![2.0, 3.0, 4.0]];
        assert!(DensityGrid::from_rows(&rows, unit_bounds()).is_err());
    }

    #[test]
    fn test_from_rows_rejects_empty() {
        assert!(DensityGrid::from_rows(&[], unit_bounds()).is_err());
    }

    #[test]
    fn test_negative_and_nan_cells_rejected() {
        assert!(DensityGrid::from_flat(1, vec![-1.0], unit_bounds()).is_err());
        assert!(DensityGrid::from_flat(1, vec![f64::NAN], unit_bounds()).is_err());
    }

    #[test]
    fn test_positive_range_ignores_zero() {
        let rows = vec![vec![0.0, 4.0], vec![2.0, 0.0]];
        let grid = DensityGrid::from_rows(&rows, unit_bounds()).unwrap();
        assert_eq!(grid.positive_range(), ValueRange { min: 2.0, max: 4.0 });
        assert_eq!(grid.positive_count(), 2);
    }

    #[test]
    fn test_positive_range_all_zero() {
        let grid = DensityGrid::from_flat(2, vec![0.0; 4], unit_bounds()).unwrap();
        let range = grid.positive_range();
        assert_eq!(range, ValueRange { min: 0.0, max: 0.0 });
        assert!(range.is_degenerate());
    }

    #[test]
    fn test_lookup_edge_clamps_to_last_band() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let grid = DensityGrid::from_rows(&rows, unit_bounds()).unwrap();
        assert_eq!(
            grid.lookup(2.0, 2.0),
            CellValue::Inside { row: 1, col: 1, value: 4.0 }
        );
        assert_eq!(
            grid.lookup(0.0, 0.0),
            CellValue::Inside { row: 0, col: 0, value: 1.0 }
        );
    }

    #[test]
    fn test_cell_center() {
        let grid = DensityGrid::from_flat(2, vec![0.0; 4], unit_bounds()).unwrap();
        assert_eq!(grid.cell_center(0, 1), (0.5, 1.5));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::OutOfBounds.to_string(), "outside grid");
        let v = CellValue::Inside { row: 1, col: 0, value: 2.5 };
        assert_eq!(v.to_string(), "2.5 (cell 1, 0)");
    }
}
