//! Hazard report records as listed by the Report Store.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single hazard report.
///
/// The store has served positions both as `x`/`y` (latitude/longitude) and
/// as a `coordinates: [lat, lon]` pair; either is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<f64>,
}

impl Report {
    /// Report at `(lat, lon)` with the given trust weight.
    pub fn at(lat: f64, lon: f64, trust: f64) -> Self {
        Self {
            id: None,
            label: None,
            date: None,
            email: None,
            x: Some(lat),
            y: Some(lon),
            coordinates: None,
            trust: Some(trust),
        }
    }

    /// `(lat, lon)` of the report, if it carries a finite position.
    pub fn position(&self) -> Option<(f64, f64)> {
        let pos = match (self.x, self.y, self.coordinates) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some([lat, lon])) => (lat, lon),
            _ => return None,
        };
        (pos.0.is_finite() && pos.1.is_finite()).then_some(pos)
    }

    /// Trust weight; user reports without one count as 1.
    pub fn trust_or_default(&self) -> f64 {
        self.trust.unwrap_or(1.0)
    }

    /// Report timestamp. Accepts RFC 3339 and the store's naive
    /// `YYYY-MM-DD HH:MM:SS` form (read as UTC).
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_position_from_xy() {
        let r: Report =
            serde_json::from_str(r#"{"id": 7, "x": 50.06, "y": 19.94, "email": "a@b.c"}"#).unwrap();
        assert_eq!(r.position(), Some((50.06, 19.94)));
        assert_eq!(r.trust_or_default(), 1.0);
    }

    #[test]
    fn test_position_from_coordinates() {
        let r: Report =
            serde_json::from_str(r#"{"coordinates": [50.0, 20.0], "trust": 0.4}"#).unwrap();
        assert_eq!(r.position(), Some((50.0, 20.0)));
        assert_eq!(r.trust_or_default(), 0.4);
    }

    #[test]
    fn test_missing_position() {
        let r: Report = serde_json::from_str(r#"{"label": "Alert", "x": 1.0}"#).unwrap();
        assert_eq!(r.position(), None);
    }

    #[test]
    fn test_timestamp_formats() {
        let mut r = Report::at(0.0, 0.0, 1.0);
        r.date = Some("2025-11-03T18:20:00.000Z".to_string());
        assert_eq!(r.timestamp().unwrap().month(), 11);

        r.date = Some("2025-11-03 18:20:00".to_string());
        assert_eq!(r.timestamp().unwrap().day(), 3);

        r.date = Some("yesterday".to_string());
        assert!(r.timestamp().is_none());
    }
}
