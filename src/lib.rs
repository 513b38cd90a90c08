//! quakewatch library
//!
//! Earthquake feed aggregation and proximity alerting.
//!
//! ## Architecture
//!
//! The codebase is organized into modules:
//! - `logging`: Structured logging with tracing
//! - `config`: Configuration management (paths, build info)
//! - `feeds`: Canonical event model plus one adapter per upstream provider
//!   (USGS GeoJSON, AFAD event filter, Kandilli live)
//! - `aggregator`: Uniform source/window facade over the adapters
//! - `settings`: Persisted alert settings (radius, magnitude threshold)
//! - `geo`: Great-circle distance
//! - `notify`: Notification gateway contract and console channel
//! - `monitor`: Background alert monitor (poll loop, dedup, geofence)
//!
//! ## Main Entry Points
//!
//! - `aggregator::Aggregator::load()`: Fetch a normalized, time-descending
//!   event list for one source and window
//! - `monitor::AlertMonitor::start()` / `stop()` / `restore()`: Control the
//!   recurring alert tick

pub mod aggregator;
pub mod config;
pub mod feeds;
pub mod geo;
mod logging;
pub mod monitor;
pub mod notify;
pub mod settings;

pub use logging::init_tracing;
