//! Geographic bounding rectangle covered by a density grid.

use serde::{Deserialize, Serialize};

use crate::{HazardError, HazardResult};

/// A latitude/longitude rectangle in degrees (EPSG:4326).
///
/// Field names match the heatmap endpoint's `bounds` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Create validated bounds. Requires finite values with `min < max` on both axes.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> HazardResult<Self> {
        let bounds = Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Check the rectangle invariants. Used for bounds that arrived via serde.
    pub fn validate(&self) -> HazardResult<()> {
        let all_finite = [self.min_lat, self.max_lat, self.min_lon, self.max_lon]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(HazardError::InvalidBounds(format!(
                "non-finite coordinate in {:?}",
                self
            )));
        }
        if self.min_lat >= self.max_lat {
            return Err(HazardError::InvalidBounds(format!(
                "min_lat {} must be below max_lat {}",
                self.min_lat, self.max_lat
            )));
        }
        if self.min_lon >= self.max_lon {
            return Err(HazardError::InvalidBounds(format!(
                "min_lon {} must be below max_lon {}",
                self.min_lon, self.max_lon
            )));
        }
        Ok(())
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Check if a point is contained within the rectangle (edges included).
    ///
    /// NaN coordinates are never contained.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Grow the rectangle by `lat_pad`/`lon_pad` degrees on every side.
    pub fn padded(&self, lat_pad: f64, lon_pad: f64) -> Self {
        Self {
            min_lat: self.min_lat - lat_pad,
            max_lat: self.max_lat + lat_pad,
            min_lon: self.min_lon - lon_pad,
            max_lon: self.max_lon + lon_pad,
        }
    }

    /// Corner pair in `[[south, west], [north, east]]` order, as map overlays expect.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lon], [self.max_lat, self.max_lon]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bounds() {
        let b = GeoBounds::new(50.0, 50.1, 19.9, 20.1).unwrap();
        assert!((b.lat_span() - 0.1).abs() < 1e-12);
        assert!((b.lon_span() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(matches!(
            GeoBounds::new(2.0, 0.0, 0.0, 2.0),
            Err(HazardError::InvalidBounds(_))
        ));
        assert!(GeoBounds::new(0.0, 2.0, 2.0, 2.0).is_err());
        assert!(GeoBounds::new(0.0, f64::NAN, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_contains_edges_and_nan() {
        let b = GeoBounds::new(0.0, 2.0, 0.0, 2.0).unwrap();
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(2.0, 2.0));
        assert!(!b.contains(3.0, 1.0));
        assert!(!b.contains(f64::NAN, 1.0));
    }

    #[test]
    fn test_padded() {
        let b = GeoBounds::new(0.0, 1.0, 0.0, 1.0).unwrap().padded(0.001, 0.002);
        assert_eq!(b.min_lat, -0.001);
        assert_eq!(b.max_lon, 1.002);
    }
}
