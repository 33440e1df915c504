//! Configuration for the `watch` subcommand.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use hazard_common::{HazardError, HazardResult};
use renderer::raster::MAX_SCALE;

/// Command-line and environment options for `watch`.
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Report Store base URL
    #[arg(long, env = "HAZARD_BASE_URL", default_value = "http://localhost:5000")]
    pub base_url: String,

    /// Seconds between heatmap refreshes
    #[arg(long, env = "HAZARD_REFRESH_SECS", default_value = "30")]
    pub interval_secs: u64,

    /// Directory receiving overlay.png and overlay.json
    #[arg(long, env = "HAZARD_OUTPUT_DIR", default_value = "overlay")]
    pub output_dir: PathBuf,

    /// Minimum seconds between two danger alerts
    #[arg(long, env = "HAZARD_ALERT_COOLDOWN_SECS", default_value = "30")]
    pub cooldown_secs: u64,

    /// Pixels per grid cell in the overlay image
    #[arg(long, default_value = "2")]
    pub scale: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "15")]
    pub timeout_secs: u64,
}

/// Validated settings for the watch loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    pub base_url: String,
    pub refresh_interval: Duration,
    pub output_dir: PathBuf,
    pub alert_cooldown: Duration,
    pub scale: usize,
    pub request_timeout: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            refresh_interval: Duration::from_secs(30),
            output_dir: PathBuf::from("overlay"),
            alert_cooldown: Duration::from_secs(30),
            scale: 2,
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> HazardResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(HazardError::invalid_parameter(
                "base_url",
                format!("expected an http or https URL, got '{}'", self.base_url),
            ));
        }
        if self.refresh_interval.is_zero() {
            return Err(HazardError::invalid_parameter(
                "interval_secs",
                "must be positive",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(HazardError::invalid_parameter(
                "timeout_secs",
                "must be positive",
            ));
        }
        if self.scale == 0 || self.scale > MAX_SCALE {
            return Err(HazardError::invalid_parameter(
                "scale",
                format!("must be between 1 and {}, got {}", MAX_SCALE, self.scale),
            ));
        }
        Ok(())
    }

    pub fn png_path(&self) -> PathBuf {
        self.output_dir.join("overlay.png")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.output_dir.join("overlay.json")
    }
}

impl TryFrom<WatchArgs> for WatchConfig {
    type Error = HazardError;

    fn try_from(args: WatchArgs) -> HazardResult<Self> {
        let config = WatchConfig {
            base_url: args.base_url,
            refresh_interval: Duration::from_secs(args.interval_secs),
            output_dir: args.output_dir,
            alert_cooldown: Duration::from_secs(args.cooldown_secs),
            scale: args.scale,
            request_timeout: Duration::from_secs(args.timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_url() {
        let config = WatchConfig {
            base_url: "localhost:5000".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HazardError::InvalidParameter { ref param, .. }) if param == "base_url"
        ));
    }

    #[test]
    fn test_rejects_zero_interval_and_scale() {
        let zero_interval = WatchConfig {
            refresh_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_interval.validate().is_err());

        let zero_scale = WatchConfig { scale: 0, ..Default::default() };
        assert!(zero_scale.validate().is_err());
    }

    #[test]
    fn test_output_paths() {
        let config = WatchConfig {
            output_dir: PathBuf::from("/tmp/hz"),
            ..Default::default()
        };
        assert_eq!(config.png_path(), PathBuf::from("/tmp/hz/overlay.png"));
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/hz/overlay.json"));
    }
}
