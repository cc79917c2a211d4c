//! Log destination setup.
//!
//! Logs go to the configured file in append mode, one line per event with
//! timestamp, level and structured fields. `RUST_LOG` overrides the configured
//! level. Failing to create the destination is the one fatal startup error.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::config::LoggingConfig;
use crate::domain::error::QuotepollError;

/// Create parent directories and open `path` for appending.
pub fn open_log_file(path: &Path) -> Result<File, QuotepollError> {
    let logging_err = |e: std::io::Error| QuotepollError::Logging {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(logging_err)?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(logging_err)
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), QuotepollError> {
    let file = open_log_file(&config.path)?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| QuotepollError::Logging {
            path: config.path.display().to_string(),
            reason: e.to_string(),
        })
}
