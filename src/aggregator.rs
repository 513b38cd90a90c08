//! Uniform facade over the three feed adapters
//!
//! Dispatches one load to the adapter matching the selected source, bridges
//! the adapters' differing native window granularities with a local time
//! filter, and always re-sorts time-descending so callers see one order
//! regardless of each adapter's native sort.

use crate::feeds::{self, afad, kandilli, usgs, Event, FeedResult};
use chrono::{Duration, Utc};
use std::str::FromStr;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Selectable event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Usgs,
    Afad,
    Kandilli,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::Usgs => "USGS",
            Source::Afad => "AFAD",
            Source::Kandilli => "Kandilli",
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "usgs" => Ok(Source::Usgs),
            "afad" => Ok(Source::Afad),
            "kandilli" => Ok(Source::Kandilli),
            other => Err(format!("unknown source '{}' (expected usgs, afad or kandilli)", other)),
        }
    }
}

/// Recency window used to filter events by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursWindow {
    H1,
    H3,
    H7,
    H24,
}

impl HoursWindow {
    pub fn hours(&self) -> i64 {
        match self {
            HoursWindow::H1 => 1,
            HoursWindow::H3 => 3,
            HoursWindow::H7 => 7,
            HoursWindow::H24 => 24,
        }
    }
}

impl FromStr for HoursWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(HoursWindow::H1),
            "3" => Ok(HoursWindow::H3),
            "7" => Ok(HoursWindow::H7),
            "24" => Ok(HoursWindow::H24),
            other => Err(format!("unknown window '{}' (expected 1, 3, 7 or 24)", other)),
        }
    }
}

/// Aggregates the feed adapters behind one load call.
///
/// Last-request-wins: starting a new load aborts any still-in-flight
/// previous one, so a superseded request can never land after a newer one
/// has started.
#[derive(Default)]
pub struct Aggregator {
    in_flight: Option<AbortHandle>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a normalized, time-descending event list for one source and
    /// window. On adapter failure returns a user-facing message wrapping the
    /// cause; never a partial list.
    pub async fn load(&mut self, source: Source, window: HoursWindow) -> Result<Vec<Event>, String> {
        if let Some(prev) = self.in_flight.take() {
            debug!("Aggregator: aborting superseded load");
            prev.abort();
        }

        let task = tokio::spawn(fetch_for(source, window));
        self.in_flight = Some(task.abort_handle());

        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => return Err("Load was superseded.".to_string()),
            Err(e) => return Err(format!("Load task failed. {}", e)),
        };
        self.in_flight = None;

        match result {
            Ok(events) => Ok(events),
            Err(e) => {
                warn!("Aggregator: {} load failed: {}", source.label(), e);
                Err(format!("Could not load events. {}", e))
            }
        }
    }
}

async fn fetch_for(source: Source, window: HoursWindow) -> FeedResult<Vec<Event>> {
    let mut events = match source {
        Source::Usgs => {
            // Only two granularities exist upstream; finer windows come from
            // the coarser feed plus a local time filter.
            let feed = if window == HoursWindow::H1 {
                usgs::UsgsFeed::LastHour
            } else {
                usgs::UsgsFeed::LastDay
            };
            apply_window_filter(usgs::fetch(feed, 0.0).await?, window)
        }
        Source::Afad => afad::fetch(window.hours(), 0.0, afad::DEFAULT_LIMIT).await?,
        Source::Kandilli => apply_window_filter(kandilli::fetch(100).await?, window),
    };
    feeds::sort_time_desc(&mut events);
    Ok(events)
}

/// Keep only events with `time >= now - window`.
fn apply_window_filter(events: Vec<Event>, window: HoursWindow) -> Vec<Event> {
    let cutoff = Utc::now() - Duration::hours(window.hours());
    events.into_iter().filter(|e| e.time >= cutoff).collect()
}
