//! Logging setup for the command-line tool
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=iniedit::ini=trace` - module-level filtering
//!
//! # Log Files
//!
//! When enabled, logs are written to `~/.config/iniedit/logs/iniedit.log`
//! with daily rotation, at debug level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize tracing subscriber with console and optional file logging
///
/// Console output goes to stderr so command output on stdout stays clean.
pub fn init(file_logging: bool) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = if file_logging {
        match crate::config_paths::ensure_logs_dir() {
            Ok(logs_dir) => {
                let file_appender = tracing_appender::rolling::daily(logs_dir, "iniedit.log");
                Some(
                    fmt::layer()
                        .with_writer(file_appender)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true)
                        .with_filter(EnvFilter::new("debug")),
                )
            }
            Err(e) => {
                eprintln!("Warning: Could not initialize file logging: {}", e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
