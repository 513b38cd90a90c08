//! Background alert monitor
//!
//! Two states only: inactive and active. While active, a recurring tick
//! fetches recent AFAD events, evaluates each unseen event against the
//! current location and settings snapshot, and submits a notification for
//! qualifying events. A failed tick never changes monitor state; the next
//! scheduled tick is the retry.

use crate::feeds::{afad, Event, GeoPoint};
use crate::geo;
use crate::notify::Notifier;
use crate::settings::{self, AlertSettings};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fixed tick period. There is no backoff; the period is the retry.
pub const TICK_PERIOD_SECS: u64 = 600;

/// Lookback window for the alerting fetch, in hours.
pub const LOOKBACK_HOURS: i64 = 3;

/// Result cap for the alerting fetch.
pub const FETCH_LIMIT: usize = 300;

/// How long examined event ids are retained. Twice the lookback window, so
/// any id that can still appear in a fetch is still deduplicated while the
/// set stays bounded over a long-running process.
fn seen_retention() -> ChronoDuration {
    ChronoDuration::hours(2 * LOOKBACK_HOURS)
}

/// Source of the observer's current position. Unavailability is a normal,
/// recurring condition, not an error.
pub trait LocationSource: Send + Sync {
    fn current_position(&self) -> Option<GeoPoint>;
}

/// Fixed observer position, e.g. supplied on the command line.
pub struct FixedLocation(pub GeoPoint);

impl LocationSource for FixedLocation {
    fn current_position(&self) -> Option<GeoPoint> {
        Some(self.0)
    }
}

struct Inner {
    active: AtomicBool,
    /// Examined event id -> instant it was first seen. Exclusively touched
    /// within tick execution; ticks are serialized by the loop.
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
    location: Arc<dyn LocationSource>,
    notifier: Arc<dyn Notifier>,
}

/// The alert monitor. One instance per process; ticks are strictly
/// serialized (the next sleep arms only after a tick completes, failure
/// paths included).
pub struct AlertMonitor {
    inner: Arc<Inner>,
    loop_task: Mutex<Option<JoinHandle<()>>>,
}

impl AlertMonitor {
    pub fn new(location: Arc<dyn LocationSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                active: AtomicBool::new(false),
                seen: Mutex::new(HashMap::new()),
                location,
                notifier,
            }),
            loop_task: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Restore-at-startup rule: if alerts were enabled when the process last
    /// ran, start the monitor without re-writing the flag.
    pub fn restore(&self) {
        if settings::load_enabled() {
            info!("Monitor: restoring previously enabled state");
            self.start(false);
        }
    }

    /// Activate the monitor. No-op when already active. The first tick runs
    /// immediately, not after a delay. `persist` writes the enabled flag;
    /// `restore()` passes false so restoring does not re-persist.
    pub fn start(&self, persist: bool) {
        if self.inner.active.swap(true, Ordering::SeqCst) {
            return;
        }
        if persist {
            settings::save_enabled(true);
        }
        info!("Monitor: started (tick every {}s)", TICK_PERIOD_SECS);

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            // The sleep arms on every exit path of the tick, so a failed or
            // skipped tick never stops the schedule.
            while inner.active.load(Ordering::SeqCst) {
                inner.tick().await;
                tokio::time::sleep(Duration::from_secs(TICK_PERIOD_SECS)).await;
            }
        });

        if let Ok(mut task) = self.loop_task.lock() {
            *task = Some(handle);
        }
    }

    /// Deactivate the monitor. No-op when already inactive. A failed tick
    /// never calls this; only explicit stop leaves the active state.
    pub fn stop(&self, persist: bool) {
        if !self.inner.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if persist {
            settings::save_enabled(false);
        }
        if let Ok(mut task) = self.loop_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
        info!("Monitor: stopped");
    }
}

impl Inner {
    async fn tick(&self) {
        self.evict_stale();

        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let Some(user) = self.location.current_position() else {
            debug!("Monitor: no location available, skipping tick");
            return;
        };

        let snapshot = settings::load();

        match afad::fetch(LOOKBACK_HOURS, 0.0, FETCH_LIMIT).await {
            Ok(events) => {
                let notified = self.process_events(&events, user, snapshot);
                debug!(
                    "Monitor: tick examined {} events, notified {}",
                    events.len(),
                    notified
                );
            }
            // Non-fatal: the next scheduled tick is the retry.
            Err(e) => warn!("Monitor: tick fetch failed: {}", e),
        }
    }

    /// Evaluate fetched events against the location and settings snapshot.
    /// Every examined id enters the seen set regardless of qualification,
    /// so a later tick never re-evaluates it even if settings change.
    /// Returns the number of notifications submitted.
    fn process_events(&self, events: &[Event], user: GeoPoint, snapshot: AlertSettings) -> usize {
        let Ok(mut seen) = self.seen.lock() else {
            warn!("Monitor: seen set lock poisoned, skipping tick");
            return 0;
        };

        let now = Utc::now();
        let mut notified = 0;
        for event in events {
            if seen.contains_key(&event.id) {
                continue;
            }
            let distance_km = geo::distance_km(user, event.coordinate);
            // Inclusive on both sides of the boundary.
            let qualifies =
                event.magnitude >= snapshot.min_magnitude && distance_km <= snapshot.radius_km;
            if qualifies {
                info!(
                    "Monitor: qualifying event {} (M{:.1}, {:.0} km)",
                    event.id, event.magnitude, distance_km
                );
                self.notifier.notify(event, distance_km);
                notified += 1;
            }
            seen.insert(event.id.clone(), now);
        }
        notified
    }

    /// Drop seen entries old enough that no fetch can return them anymore.
    fn evict_stale(&self) {
        let Ok(mut seen) = self.seen.lock() else {
            return;
        };
        let cutoff = Utc::now() - seen_retention();
        let before = seen.len();
        seen.retain(|_, first_seen| *first_seen >= cutoff);
        let evicted = before - seen.len();
        if evicted > 0 {
            debug!("Monitor: evicted {} stale seen ids ({} kept)", evicted, seen.len());
        }
    }
}
