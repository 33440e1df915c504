//! The watch loop: refresh the overlay, check observer positions.
//!
//! ```text
//!   interval tick ──► fetch heatmap ──► render + encode ──► publish ──► install
//!                                        (blocking pool)    (files)     (slot + grid)
//!   stdin line ─────► parse lat,lon ──► lookup on grid snapshot ──► alert gate
//! ```
//!
//! Both event sources are driven from one task with `tokio::select!`, so the
//! loop itself never overlaps two refreshes. Direct callers of
//! [`Watcher::apply_grid`] may; publication and installation are serialized
//! behind a lock and only the newest render gets through.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use hazard_common::{DensityGrid, HazardError, HazardResult, ValueRange};
use renderer::{OverlayMetadata, OverlaySlot};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::client::ReportStoreClient;
use crate::config::WatchConfig;
use crate::danger::{assess_in, AlertGate, DangerReading};
use crate::output::publish_overlay;
use crate::position::parse_position;

/// A grid together with the statistics lookups need.
#[derive(Debug)]
pub struct GridSnapshot {
    /// Generation of the overlay rendered from this grid.
    pub generation: u64,
    pub grid: DensityGrid,
    /// Positive range, computed once per swap.
    pub range: ValueRange,
}

impl GridSnapshot {
    pub fn new(generation: u64, grid: DensityGrid) -> Self {
        let range = grid.positive_range();
        Self {
            generation,
            grid,
            range,
        }
    }
}

/// Display state shared between the loop and any observers.
#[derive(Debug, Default)]
pub struct WatchState {
    grid: RwLock<Option<Arc<GridSnapshot>>>,
    overlays: OverlaySlot,
    /// Held across publish, install and grid swap.
    publishing: Mutex<()>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the grid behind the installed overlay.
    pub async fn snapshot(&self) -> Option<Arc<GridSnapshot>> {
        self.grid.read().await.clone()
    }

    /// Swap in a new snapshot, returning the previous one.
    pub async fn replace_snapshot(&self, snapshot: Arc<GridSnapshot>) -> Option<Arc<GridSnapshot>> {
        self.grid.write().await.replace(snapshot)
    }

    pub fn overlays(&self) -> &OverlaySlot {
        &self.overlays
    }
}

/// An alert raised for an observer position.
#[derive(Debug, Clone, Serialize)]
pub struct DangerAlert {
    pub lat: f64,
    pub lon: f64,
    #[serde(flatten)]
    pub reading: DangerReading,
    pub raised_at: DateTime<Utc>,
}

/// Counters reported when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    pub refreshes: u64,
    pub failed_refreshes: u64,
    pub positions: u64,
    pub alerts: u64,
}

pub struct Watcher {
    config: WatchConfig,
    client: ReportStoreClient,
    state: Arc<WatchState>,
    gate: AlertGate,
}

impl Watcher {
    pub fn new(config: WatchConfig) -> HazardResult<Self> {
        config.validate()?;
        let client = ReportStoreClient::new(config.base_url.clone(), config.request_timeout)?;
        let gate = AlertGate::new(config.alert_cooldown);
        Ok(Self {
            config,
            client,
            state: Arc::new(WatchState::new()),
            gate,
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<WatchState> {
        &self.state
    }

    /// Fetch the heatmap and show it. Returns the installed generation.
    pub async fn refresh(&self) -> HazardResult<Option<u64>> {
        let response = self.client.fetch_heatmap().await?;
        debug!(fetched_at = %response.fetched_at, "Applying fetched heatmap");
        self.apply_grid(response.grid).await
    }

    /// Render `grid`, publish the overlay files and install it.
    ///
    /// Returns `Ok(None)` if a newer render superseded this one. The files
    /// on disk only ever move to a newer generation, and the installed
    /// overlay and lookup grid never run ahead of them. A failed publish
    /// installs nothing.
    pub async fn apply_grid(&self, grid: DensityGrid) -> HazardResult<Option<u64>> {
        let overlays = &self.state.overlays;
        let ticket = overlays.begin();
        let snapshot = Arc::new(GridSnapshot::new(ticket.generation(), grid));
        let scale = self.config.scale;

        let render_input = Arc::clone(&snapshot);
        let (image, png) = tokio::task::spawn_blocking(move || -> HazardResult<_> {
            let image = renderer::render(&render_input.grid, scale)?;
            let png = image.encode_png()?;
            Ok((image, png))
        })
        .await
        .map_err(|e| HazardError::RenderError(format!("render task failed: {}", e)))??;

        let _publishing = self.state.publishing.lock().await;
        if !overlays.is_latest(ticket) {
            debug!(generation = ticket.generation(), "Skipping superseded overlay");
            return Ok(None);
        }

        let metadata = OverlayMetadata::for_image(&image, ticket.generation());
        publish_overlay(
            &self.config.png_path(),
            &self.config.metadata_path(),
            png,
            &metadata,
        )
        .await?;

        // A render begun while publishing supersedes this one and will
        // publish over these files once it gets the lock
        let Some(overlay) = overlays.install_ticket(ticket, image) else {
            return Ok(None);
        };
        self.state.replace_snapshot(snapshot).await;

        info!(
            generation = overlay.generation(),
            width = overlay.image().width(),
            painted_pixels = overlay.image().painted_pixels(),
            "Installed heatmap overlay"
        );
        Ok(Some(overlay.generation()))
    }

    /// Check an observer position against the current grid.
    ///
    /// Returns an alert when the position sits on a dense cell and the
    /// cooldown since the previous alert has passed.
    pub async fn check_position(&mut self, lat: f64, lon: f64, now: Instant) -> Option<DangerAlert> {
        let snapshot = self.state.snapshot().await?;
        let reading = assess_in(&snapshot.grid, &snapshot.range, lat, lon)?;

        if !self.gate.try_fire(now) {
            debug!(lat, lon, level = %reading.level, "Alert suppressed by cooldown");
            return None;
        }

        warn!(
            lat,
            lon,
            level = %reading.level,
            value = reading.value,
            intensity = reading.intensity,
            row = reading.row,
            col = reading.col,
            "Hazard proximity alert"
        );
        Some(DangerAlert {
            lat,
            lon,
            reading,
            raised_at: Utc::now(),
        })
    }

    /// Run until shutdown is signalled or `positions` reaches EOF.
    pub async fn run<R>(
        mut self,
        positions: R,
        mut shutdown: broadcast::Receiver<()>,
    ) -> HazardResult<WatchSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut summary = WatchSummary::default();
        let mut lines = positions.lines();
        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            base_url = %self.client.base_url(),
            interval_secs = self.config.refresh_interval.as_secs(),
            output_dir = %self.config.output_dir.display(),
            "Starting hazard watch"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutting down hazard watch");
                    break;
                }
                _ = ticker.tick() => {
                    summary.refreshes += 1;
                    if let Err(e) = self.refresh().await {
                        summary.failed_refreshes += 1;
                        if e.is_input_error() {
                            warn!(error = %e, "Heatmap refresh rejected, keeping previous overlay");
                        } else {
                            error!(error = %e, "Heatmap refresh failed");
                        }
                    }
                }
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => match parse_position(&line) {
                            Ok(Some((lat, lon))) => {
                                summary.positions += 1;
                                if self.check_position(lat, lon, Instant::now()).await.is_some() {
                                    summary.alerts += 1;
                                }
                            }
                            Ok(None) => {}
                            Err(e) => warn!(error = %e, "Ignoring position line"),
                        },
                        Ok(None) => {
                            info!("Position input closed");
                            break;
                        }
                        Err(e) => {
                            error!(error = %e, "Reading position input failed");
                            break;
                        }
                    }
                }
            }
        }

        Ok(summary)
    }
}
