//! AFAD event-filter API adapter
//!
//! Queries an explicit UTC start/end window derived from "now minus N hours"
//! and "now". Latitude, longitude and magnitude arrive as strings; records
//! whose coordinates or date fail to parse are dropped, never defaulted.

use super::{
    coordinate_label, fetch_body, http_client, sort_time_desc, user_agent, Event, FeedError,
    FeedResult, GeoPoint,
};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, info};

const ENDPOINT: &str = "https://deprem.afad.gov.tr/apiv2/event/filter";

/// Query parameter timestamp format (UTC).
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_LIMIT: usize = 300;

#[derive(Debug, Deserialize)]
struct AfadItem {
    #[serde(rename = "eventID")]
    event_id: String,
    location: Option<String>,
    latitude: String,
    longitude: String,
    #[allow(dead_code)] // part of the wire schema, not used downstream
    depth: Option<String>,
    magnitude: Option<String>,
    date: String,
}

/// Parse an AFAD date string, trying formats in priority order:
/// `yyyy-MM-ddTHH:mm:ss` (UTC), `yyyy-MM-dd HH:mm:ss` (UTC), then RFC 3339
/// with and without fractional seconds. Returns None when all fail; the
/// caller drops such records.
pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

/// Fetch events from the AFAD filter endpoint.
///
/// Window is `[now - last_hours, now]` in UTC; results are capped at `limit`
/// and requested in descending-time order. The magnitude floor is applied
/// post-decode (missing magnitude counts as 0.0). Result order: time
/// descending.
pub async fn fetch(last_hours: i64, min_mag: f64, limit: usize) -> FeedResult<Vec<Event>> {
    let now = Utc::now();
    let start = now - Duration::hours(last_hours);
    debug!(
        "AFAD: fetching window {} .. {} (limit {})",
        start.format(QUERY_DATE_FORMAT),
        now.format(QUERY_DATE_FORMAT),
        limit
    );

    let client = http_client()?;
    let req = client
        .get(ENDPOINT)
        .query(&[
            ("start", start.format(QUERY_DATE_FORMAT).to_string()),
            ("end", now.format(QUERY_DATE_FORMAT).to_string()),
            ("limit", limit.to_string()),
            ("orderby", "timedesc".to_string()),
        ])
        .header("Accept", "application/json")
        .header("User-Agent", user_agent());

    let body = fetch_body(req).await?;
    let items: Vec<AfadItem> = serde_json::from_str(&body).map_err(FeedError::Decode)?;

    let total = items.len();
    let events = map_items(items, min_mag);
    info!("AFAD: {} of {} records kept (floor {})", events.len(), total, min_mag);
    Ok(events)
}

fn map_items(items: Vec<AfadItem>, min_mag: f64) -> Vec<Event> {
    let mut events: Vec<Event> = items
        .into_iter()
        .filter_map(|item| {
            let lat: f64 = item.latitude.parse().ok()?;
            let lon: f64 = item.longitude.parse().ok()?;
            // Unparseable dates drop the record here, unlike Kandilli which
            // defaults to now.
            let time = parse_date(&item.date)?;

            let magnitude: f64 = item
                .magnitude
                .as_deref()
                .unwrap_or("")
                .parse()
                .unwrap_or(0.0);
            if magnitude < min_mag {
                return None;
            }

            let place = item.location.unwrap_or_default().trim().to_string();
            let place = if place.is_empty() {
                coordinate_label(lat, lon)
            } else {
                place
            };

            Some(Event {
                id: item.event_id,
                coordinate: GeoPoint { lat, lon },
                magnitude,
                place,
                time,
                source_url: None,
            })
        })
        .collect();

    sort_time_desc(&mut events);
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, lat: &str, lon: &str, mag: Option<&str>, date: &str, loc: Option<&str>) -> AfadItem {
        AfadItem {
            event_id: id.to_string(),
            location: loc.map(str::to_string),
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            depth: None,
            magnitude: mag.map(str::to_string),
            date: date.to_string(),
        }
    }

    #[test]
    fn t_and_space_formats_parse_to_same_instant() {
        let a = parse_date("2024-05-01T10:15:30").expect("T format");
        let b = parse_date("2024-05-01 10:15:30").expect("space format");
        assert_eq!(a, b);
        assert_eq!(a.timestamp(), 1714558530);
    }

    #[test]
    fn rfc3339_with_and_without_fractions() {
        let a = parse_date("2024-05-01T10:15:30.250Z").expect("fractional");
        let b = parse_date("2024-05-01T10:15:30Z").expect("plain");
        assert_eq!(b.timestamp(), 1714558530);
        assert_eq!(a.timestamp(), 1714558530);
    }

    #[test]
    fn malformed_date_drops_record() {
        let events = map_items(
            vec![item("x", "38.4", "27.1", Some("4.2"), "not a date", None)],
            0.0,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn non_numeric_coordinates_drop_record() {
        let events = map_items(
            vec![
                item("bad-lat", "n/a", "27.1", Some("4.2"), "2024-05-01 10:15:30", None),
                item("bad-lon", "38.4", "", Some("4.2"), "2024-05-01 10:15:30", None),
                item("ok", "38.4", "27.1", Some("4.2"), "2024-05-01 10:15:30", None),
            ],
            0.0,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
    }

    #[test]
    fn missing_magnitude_defaults_and_floor_applies() {
        let events = map_items(
            vec![
                item("none", "38.0", "27.0", None, "2024-05-01 10:15:30", None),
                item("low", "38.0", "27.0", Some("1.9"), "2024-05-01 10:15:30", None),
                item("ok", "38.0", "27.0", Some("3.0"), "2024-05-01 10:15:30", None),
            ],
            3.0,
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");

        let unfloored = map_items(
            vec![item("none", "38.0", "27.0", None, "2024-05-01 10:15:30", None)],
            0.0,
        );
        assert_eq!(unfloored[0].magnitude, 0.0);
    }

    #[test]
    fn empty_location_synthesizes_coordinate_label() {
        let events = map_items(
            vec![item("a", "38.40", "27.10", Some("4.0"), "2024-05-01 10:15:30", Some("  "))],
            0.0,
        );
        assert_eq!(events[0].place, "Lat 38.40, Lon 27.10");
    }

    #[test]
    fn sorted_by_time_descending() {
        let events = map_items(
            vec![
                item("old", "38.0", "27.0", Some("4.0"), "2024-05-01 08:00:00", None),
                item("new", "38.0", "27.0", Some("4.0"), "2024-05-01 12:00:00", None),
                item("mid", "38.0", "27.0", Some("4.0"), "2024-05-01 10:00:00", None),
            ],
            0.0,
        );
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }
}
