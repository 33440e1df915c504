//! Grid construction parameters.

use hazard_common::{HazardError, HazardResult};
use serde::{Deserialize, Serialize};

/// Parameters for [`crate::build_density_grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Rows and columns of the output grid.
    pub resolution: usize,
    /// Kernel radius in degrees (0.005° is roughly 550 m).
    pub radius_degrees: f64,
    /// Margin added around the reports' bounding box, in degrees.
    pub padding_degrees: f64,
    /// Scale trust weights to `[0, 1]` before spreading them.
    pub normalize: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            resolution: 100,
            radius_degrees: 0.01,
            padding_degrees: 0.001,
            normalize: true,
        }
    }
}

impl BuildOptions {
    pub fn validate(&self) -> HazardResult<()> {
        if self.resolution == 0 {
            return Err(HazardError::invalid_parameter(
                "resolution",
                "must be positive",
            ));
        }
        if !(self.radius_degrees.is_finite() && self.radius_degrees > 0.0) {
            return Err(HazardError::invalid_parameter(
                "radius_degrees",
                format!("must be a positive number, got {}", self.radius_degrees),
            ));
        }
        if !(self.padding_degrees.is_finite() && self.padding_degrees >= 0.0) {
            return Err(HazardError::invalid_parameter(
                "padding_degrees",
                format!("must be non-negative, got {}", self.padding_degrees),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BuildOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_options() {
        let zero_res = BuildOptions { resolution: 0, ..Default::default() };
        assert!(zero_res.validate().is_err());

        let bad_radius = BuildOptions { radius_degrees: -1.0, ..Default::default() };
        assert!(bad_radius.validate().is_err());

        let nan_pad = BuildOptions { padding_degrees: f64::NAN, ..Default::default() };
        assert!(nan_pad.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let opts: BuildOptions = serde_json::from_str(r#"{"resolution": 50}"#).unwrap();
        assert_eq!(opts.resolution, 50);
        assert_eq!(opts.radius_degrees, 0.01);
        assert!(opts.normalize);
    }
}
