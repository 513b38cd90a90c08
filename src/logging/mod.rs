//! Structured logging module using tracing
//!
//! Console output goes to stderr; when a log file path is provided, the same
//! events are appended there without ANSI codes.

use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with console and optional file output.
///
/// Verbosity comes from the command line (-v flags), not RUST_LOG, so the
/// flags alone control logging. 0 = error, 1 = warn, 2 = debug, 3 = trace.
pub fn init_tracing(verbosity: u8, log_file_path: Option<PathBuf>) {
    let filter_level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::new(filter_level);

    let registry = tracing_subscriber::registry().with(filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    if let Some(log_path) = log_file_path {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        if let Some(file) = file {
            let file_layer = fmt::layer()
                .with_writer(std::sync::Arc::new(file))
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(false);

            registry.with(console_layer).with(file_layer).init();
        } else {
            // Fallback to console only if file creation fails
            registry.with(console_layer).init();
        }
    } else {
        registry.with(console_layer).init();
    }
}

