//! Feed adapters module
//!
//! One adapter per upstream provider:
//! - `usgs`: USGS GeoJSON summary feeds (all_hour / all_day)
//! - `afad`: AFAD event-filter API (explicit UTC start/end window)
//! - `kandilli`: Kandilli live API (server-side result cap)
//!
//! The adapters intentionally diverge in sort order, window semantics and
//! date-failure policy because the upstream services do; the aggregator is
//! responsible for presenting one uniform contract on top of them.

pub mod afad;
pub mod kandilli;
pub mod usgs;

use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const TIMEOUT_SECS: u64 = 20;

/// A WGS-84 coordinate in degrees. No range validation is performed;
/// out-of-range values pass through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Canonical earthquake event, immutable once constructed.
///
/// Every event an adapter returns has a valid coordinate and a valid
/// magnitude (defaulted to 0.0 when the provider omits it). Records with
/// unparseable coordinates are dropped at the adapter boundary, never
/// surfaced as partial data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Provider-scoped unique identifier (synthesized for Kandilli records
    /// that lack one).
    pub id: String,
    pub coordinate: GeoPoint,
    pub magnitude: f64,
    pub place: String,
    pub time: DateTime<Utc>,
    /// Provider-supplied deep link; only USGS supplies one.
    pub source_url: Option<String>,
}

/// Feed error types
///
/// Adapters surface these verbatim to the aggregator; the aggregator
/// converts them into a single user-facing message.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Protocol(u16),

    #[error("response did not match the expected schema: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Shared HTTP client for adapter fetches (request timeout applied).
pub(crate) fn http_client() -> FeedResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(FeedError::Network)
}

/// Product User-Agent sent with every adapter request.
pub(crate) fn user_agent() -> String {
    format!("quakewatch/{}", Config::version())
}

/// Send a prepared request and return the response body.
///
/// Transport failures map to `Network`, non-success HTTP statuses to
/// `Protocol`. Schema checks happen in the caller's decode step.
pub(crate) async fn fetch_body(req: reqwest::RequestBuilder) -> FeedResult<String> {
    let resp = req.send().await.map_err(FeedError::Network)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::Protocol(status.as_u16()));
    }
    resp.text().await.map_err(FeedError::Network)
}

/// Display label synthesized from a coordinate, used when a provider gives
/// an empty or missing place string.
pub(crate) fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("Lat {:.2}, Lon {:.2}", lat, lon)
}

/// Sort events by magnitude, largest first.
pub(crate) fn sort_magnitude_desc(events: &mut [Event]) {
    events.sort_by(|a, b| {
        b.magnitude
            .partial_cmp(&a.magnitude)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Sort events by time, newest first.
pub(crate) fn sort_time_desc(events: &mut [Event]) {
    events.sort_by(|a, b| b.time.cmp(&a.time));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, magnitude: f64, ts: i64) -> Event {
        Event {
            id: id.to_string(),
            coordinate: GeoPoint { lat: 39.0, lon: 35.0 },
            magnitude,
            place: "somewhere".to_string(),
            time: Utc.timestamp_opt(ts, 0).single().expect("valid ts"),
            source_url: None,
        }
    }

    #[test]
    fn coordinate_label_format() {
        assert_eq!(coordinate_label(39.1234, 35.5678), "Lat 39.12, Lon 35.57");
    }

    #[test]
    fn sort_orders() {
        let mut by_mag = vec![event("a", 2.0, 10), event("b", 5.0, 20), event("c", 3.0, 30)];
        sort_magnitude_desc(&mut by_mag);
        assert_eq!(
            by_mag.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c", "a"]
        );

        let mut by_time = vec![event("a", 2.0, 10), event("b", 5.0, 30), event("c", 3.0, 20)];
        sort_time_desc(&mut by_time);
        assert_eq!(
            by_time.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["b", "c", "a"]
        );
    }
}
