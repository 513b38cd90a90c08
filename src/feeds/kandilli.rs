//! Kandilli live API adapter
//!
//! Decodes the `{ "result": [...] }` envelope. Kandilli reports local
//! wall-clock time, so dates are interpreted in the device's local zone,
//! and unparseable dates default to "now" (record retained) rather than
//! dropping the record as AFAD does.

use super::{fetch_body, http_client, sort_magnitude_desc, user_agent, Event, FeedResult, GeoPoint};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

const ENDPOINT: &str = "https://api.orhanaydogdu.com.tr/deprem/kandilli/live";

/// Server-side result cap bounds.
const LIMIT_MIN: usize = 1;
const LIMIT_MAX: usize = 100;

#[derive(Debug, Deserialize)]
struct LiveResponse {
    result: Vec<KandilliItem>,
}

#[derive(Debug, Deserialize)]
struct KandilliItem {
    earthquake_id: Option<String>,
    title: Option<String>,
    mag: Option<f64>,
    #[allow(dead_code)] // part of the wire schema, not used downstream
    depth: Option<f64>,
    date_time: Option<String>,
    geojson: Option<GeoJsonPoint>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: Option<String>,
    /// [lon, lat]
    coordinates: Vec<f64>,
}

/// Clamp a requested limit into the server-side bound [1, 100].
pub(crate) fn clamp_limit(limit: usize) -> usize {
    limit.clamp(LIMIT_MIN, LIMIT_MAX)
}

/// Parse a Kandilli date string in the device-local time zone, trying
/// `yyyy-MM-dd HH:mm:ss` then `yyyy.MM.dd HH:mm:ss`. Returns None when both
/// fail; the caller defaults to now.
pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y.%m.%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            // Ambiguous local times (DST transitions) resolve to the
            // earliest mapping.
            if let Some(local) = Local
                .from_local_datetime(&naive)
                .earliest()
            {
                return Some(local.with_timezone(&Utc));
            }
        }
    }
    None
}

/// Stable synthetic identifier for records without a provider id, hashed
/// from coordinate, time and magnitude. A random id here would silently
/// break cross-poll dedup for these records.
fn synthetic_id(lat: f64, lon: f64, time: DateTime<Utc>, magnitude: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:.4}|{:.4}|{}|{:.1}", lat, lon, time.timestamp(), magnitude));
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("kandilli-{}", hex)
}

/// Fetch the most recent Kandilli events.
///
/// The requested limit is silently clamped into [1, 100]. Items whose
/// coordinate pair has fewer than two values are dropped. Result order:
/// magnitude descending.
pub async fn fetch(limit: usize) -> FeedResult<Vec<Event>> {
    let lim = clamp_limit(limit);
    debug!("Kandilli: fetching live feed (limit {})", lim);

    let client = http_client()?;
    let req = client
        .get(ENDPOINT)
        .query(&[("limit", lim.to_string())])
        .header("User-Agent", user_agent());

    let body = fetch_body(req).await?;
    let decoded: LiveResponse = serde_json::from_str(&body)?;

    let total = decoded.result.len();
    let events = map_items(decoded.result);
    info!("Kandilli: {} of {} records kept", events.len(), total);
    Ok(events)
}

fn map_items(items: Vec<KandilliItem>) -> Vec<Event> {
    let mut events: Vec<Event> = items
        .into_iter()
        .filter_map(|item| {
            let coords = &item.geojson.as_ref()?.coordinates;
            if coords.len() < 2 {
                return None;
            }
            let lon = coords[0];
            let lat = coords[1];

            let time = item
                .date_time
                .as_deref()
                .and_then(parse_date)
                .unwrap_or_else(Utc::now);
            let magnitude = item.mag.unwrap_or(0.0);

            let id = item
                .earthquake_id
                .unwrap_or_else(|| synthetic_id(lat, lon, time, magnitude));
            let place = item.title.unwrap_or_else(|| "Kandilli".to_string());

            Some(Event {
                id,
                coordinate: GeoPoint { lat, lon },
                magnitude,
                place,
                time,
                source_url: None,
            })
        })
        .collect();

    sort_magnitude_desc(&mut events);
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(
        id: Option<&str>,
        mag: Option<f64>,
        date: Option<&str>,
        coords: Option<Vec<f64>>,
    ) -> KandilliItem {
        KandilliItem {
            earthquake_id: id.map(str::to_string),
            title: Some("Ege Denizi".to_string()),
            mag,
            depth: None,
            date_time: date.map(str::to_string),
            geojson: coords.map(|coordinates| GeoJsonPoint {
                kind: Some("Point".to_string()),
                coordinates,
            }),
        }
    }

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(50), 50);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(5000), 100);
    }

    #[test]
    fn both_date_formats_parse() {
        let a = parse_date("2024-05-01 10:15:30").expect("dash format");
        let b = parse_date("2024.05.01 10:15:30").expect("dot format");
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_date_defaults_to_now() {
        let before = Utc::now();
        let events = map_items(vec![item(Some("k1"), Some(3.1), Some("garbage"), Some(vec![27.1, 38.4]))]);
        let after = Utc::now();
        assert_eq!(events.len(), 1);
        assert!(events[0].time >= before && events[0].time <= after);
    }

    #[test]
    fn missing_or_short_coordinates_drop_record() {
        let events = map_items(vec![
            item(Some("no-geo"), Some(3.0), Some("2024-05-01 10:15:30"), None),
            item(Some("short"), Some(3.0), Some("2024-05-01 10:15:30"), Some(vec![27.1])),
            item(Some("ok"), Some(3.0), Some("2024-05-01 10:15:30"), Some(vec![27.1, 38.4])),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
        assert_eq!(events[0].coordinate, GeoPoint { lat: 38.4, lon: 27.1 });
    }

    #[test]
    fn missing_id_gets_stable_synthetic_key() {
        let make = || {
            map_items(vec![item(None, Some(3.5), Some("2024-05-01 10:15:30"), Some(vec![27.1, 38.4]))])
        };
        let a = make();
        let b = make();
        assert!(a[0].id.starts_with("kandilli-"));
        assert_eq!(a[0].id, b[0].id);
    }

    #[test]
    fn missing_magnitude_and_title_default() {
        let events = map_items(vec![KandilliItem {
            earthquake_id: Some("k".to_string()),
            title: None,
            mag: None,
            depth: None,
            date_time: Some("2024-05-01 10:15:30".to_string()),
            geojson: Some(GeoJsonPoint { kind: None, coordinates: vec![27.1, 38.4] }),
        }]);
        assert_eq!(events[0].magnitude, 0.0);
        assert_eq!(events[0].place, "Kandilli");
    }

    #[test]
    fn sorted_by_magnitude_descending() {
        let events = map_items(vec![
            item(Some("m2"), Some(2.0), Some("2024-05-01 10:15:30"), Some(vec![27.0, 38.0])),
            item(Some("m5"), Some(5.0), Some("2024-05-01 10:15:30"), Some(vec![27.0, 38.0])),
            item(Some("m3"), Some(3.0), Some("2024-05-01 10:15:30"), Some(vec![27.0, 38.0])),
        ]);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["m5", "m3", "m2"]);
    }
}
