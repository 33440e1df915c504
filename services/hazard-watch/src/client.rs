//! HTTP client for the Report Store.
//!
//! Two read-only endpoints:
//! - `GET {base}/api/heatmap`  bare or enveloped heatmap payload
//! - `GET {base}/api/reports`  list of hazard reports

use std::time::Duration;

use chrono::{DateTime, Utc};
use hazard_common::{ApiEnvelope, DensityGrid, GridInfo, HazardError, HazardResult, HeatmapPayload, Report};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// A decoded heatmap fetched from the Report Store.
#[derive(Debug, Clone)]
pub struct HeatmapResponse {
    pub grid: DensityGrid,
    pub info: Option<GridInfo>,
    pub fetched_at: DateTime<Utc>,
}

/// Client for the Report Store read API.
#[derive(Debug, Clone)]
pub struct ReportStoreClient {
    client: Client,
    base_url: String,
}

impl ReportStoreClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> HazardResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| HazardError::Upstream(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the current heatmap and validate it into a grid.
    pub async fn fetch_heatmap(&self) -> HazardResult<HeatmapResponse> {
        let (status, body) = self.get("/api/heatmap").await?;
        let (grid, info) = decode_heatmap(status, &body)?;
        debug!(
            resolution = grid.resolution(),
            painted_cells = grid.positive_count(),
            "Fetched heatmap"
        );
        Ok(HeatmapResponse {
            grid,
            info,
            fetched_at: Utc::now(),
        })
    }

    /// Fetch the report listing.
    pub async fn fetch_reports(&self) -> HazardResult<Vec<Report>> {
        let (status, body) = self.get("/api/reports").await?;
        decode_reports(status, &body)
    }

    async fn get(&self, path: &str) -> HazardResult<(StatusCode, String)> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HazardError::Upstream(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HazardError::Upstream(format!("reading {} body failed: {}", url, e)))?;
        Ok((status, body))
    }
}

/// Interpret a heatmap response.
///
/// A non-success status whose body is an error envelope (the store answers
/// 404 with `{"status": "error", "message": ...}` when it has no data)
/// becomes a data error carrying that message; any other non-success status
/// is an upstream failure.
pub fn decode_heatmap(status: StatusCode, body: &str) -> HazardResult<(DensityGrid, Option<GridInfo>)> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }
    HeatmapPayload::parse(body)?.into_grid()
}

/// Interpret a report listing response. Bare arrays and envelopes are accepted.
pub fn decode_reports(status: StatusCode, body: &str) -> HazardResult<Vec<Report>> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }

    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let envelope: ApiEnvelope<Vec<Report>> = serde_json::from_value(value)?;
    envelope.into_data()
}

fn error_from_body(status: StatusCode, body: &str) -> HazardError {
    match serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body) {
        Ok(envelope) if !envelope.status.is_ok() => {
            let message = envelope.message.unwrap_or_else(|| status.to_string());
            warn!(status = %status, message = %message, "Report Store returned an error");
            HazardError::DataError(message)
        }
        _ => HazardError::Upstream(format!("unexpected status {}", status)),
    }
}
