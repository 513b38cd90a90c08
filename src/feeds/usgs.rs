//! USGS GeoJSON summary feed adapter
//!
//! Fetches one of the fixed, unparameterized summary feeds (all_hour or
//! all_day). Finer windows are the aggregator's job: it fetches the coarser
//! feed and filters locally by time.

use super::{fetch_body, http_client, sort_magnitude_desc, user_agent, Event, FeedResult, GeoPoint};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

/// Feed granularities the USGS summary endpoint natively supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsgsFeed {
    LastHour,
    LastDay,
}

impl UsgsFeed {
    pub fn path_segment(&self) -> &'static str {
        match self {
            UsgsFeed::LastHour => "all_hour",
            UsgsFeed::LastDay => "all_day",
        }
    }

    fn url(&self) -> String {
        format!(
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/{}.geojson",
            self.path_segment()
        )
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: String,
    properties: Properties,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: Option<f64>,
    place: Option<String>,
    /// Epoch milliseconds.
    time: Option<f64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// [lon, lat, depth, ...]
    coordinates: Vec<f64>,
}

/// Fetch a USGS summary feed and normalize it.
///
/// Features with fewer than two coordinate values are dropped. Missing
/// magnitude defaults to 0.0 (so it only fails the floor check when
/// `min_mag > 0`). Result order: magnitude descending.
pub async fn fetch(feed: UsgsFeed, min_mag: f64) -> FeedResult<Vec<Event>> {
    let client = http_client()?;
    debug!("USGS: fetching {} feed", feed.path_segment());

    let body = fetch_body(client.get(feed.url()).header("User-Agent", user_agent())).await?;
    let fc: FeatureCollection = serde_json::from_str(&body)?;

    let total = fc.features.len();
    let events = map_features(fc, min_mag);
    info!(
        "USGS: {} of {} features kept (floor {})",
        events.len(),
        total,
        min_mag
    );
    Ok(events)
}

fn map_features(fc: FeatureCollection, min_mag: f64) -> Vec<Event> {
    let mut events: Vec<Event> = fc
        .features
        .into_iter()
        .filter_map(|f| {
            if f.geometry.coordinates.len() < 2 {
                return None;
            }
            let lon = f.geometry.coordinates[0];
            let lat = f.geometry.coordinates[1];

            let magnitude = f.properties.mag.unwrap_or(0.0);
            if magnitude < min_mag {
                return None;
            }

            let place = f
                .properties
                .place
                .unwrap_or_else(|| "Unknown".to_string());
            // Missing time maps to epoch 0, matching the upstream contract
            // of nullable epoch-ms.
            let epoch_ms = f.properties.time.unwrap_or(0.0) as i64;
            let time = DateTime::<Utc>::from_timestamp_millis(epoch_ms).unwrap_or_default();

            Some(Event {
                id: f.id,
                coordinate: GeoPoint { lat, lon },
                magnitude,
                place,
                time,
                source_url: f.properties.url,
            })
        })
        .collect();

    sort_magnitude_desc(&mut events);
    events
}
