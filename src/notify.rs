//! Notification gateway contract and channel implementations
//!
//! The monitor only consumes the "submit a notification with this payload"
//! contract; actual OS delivery is an external collaborator. The payload
//! identifier is derived from the event id so the gateway itself recognizes
//! a resubmission as a duplicate, reinforcing the monitor's dedup set.

use crate::feeds::Event;
use chrono::Local;
use tracing::info;

/// Notification content submitted to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    /// Derived from the event id so resubmission with the same event is
    /// recognized as a duplicate by the gateway.
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub sound: bool,
}

/// Build the payload for a qualifying event: magnitude in the title, place
/// plus rounded distance plus local time-of-day in the body.
pub fn payload_for(event: &Event, distance_km: f64) -> NotificationPayload {
    let local_time = event.time.with_timezone(&Local).format("%H:%M");
    NotificationPayload {
        identifier: format!("eq-{}", event.id),
        title: format!("Earthquake nearby (M{:.1})", event.magnitude),
        body: format!("{} - {:.0} km away at {}", event.place, distance_km, local_time),
        sound: true,
    }
}

/// Trait for notification channels
pub trait Notifier: Send + Sync {
    /// Ask the gateway for permission to notify. Failure maps silently to
    /// false.
    fn request_authorization(&self) -> bool;

    /// Submit a notification for a qualifying event. Fire-and-forget:
    /// delivery is not guaranteed once submitted.
    fn notify(&self, event: &Event, distance_km: f64);
}

/// Console notifier: prints the payload and logs it. Stands in for the OS
/// notification facility in the CLI.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn request_authorization(&self) -> bool {
        true
    }

    fn notify(&self, event: &Event, distance_km: f64) {
        let payload = payload_for(event, distance_km);
        info!(
            "Notify: {} [{}] {}",
            payload.title, payload.identifier, payload.body
        );
        println!("{} | {}", payload.title, payload.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::GeoPoint;
    use chrono::{TimeZone, Utc};

    #[test]
    fn payload_contains_magnitude_place_and_distance() {
        let event = Event {
            id: "us7000abcd".to_string(),
            coordinate: GeoPoint { lat: 38.4, lon: 27.1 },
            magnitude: 4.27,
            place: "Aegean Sea".to_string(),
            time: Utc.timestamp_opt(1714558530, 0).single().expect("valid ts"),
            source_url: None,
        };
        let payload = payload_for(&event, 140.4);
        assert_eq!(payload.identifier, "eq-us7000abcd");
        assert_eq!(payload.title, "Earthquake nearby (M4.3)");
        assert!(payload.body.starts_with("Aegean Sea - 140 km away at "));
        assert!(payload.sound);
    }
}
