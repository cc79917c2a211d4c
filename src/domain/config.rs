//! Process configuration built from a [`ConfigPort`].
//!
//! Every component receives the slice of configuration it needs at
//! construction; nothing reads configuration globally. All fields are
//! validated here so a bad file fails at startup rather than mid-cycle.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::QuotepollError;
use crate::domain::metrics_row::DEFAULT_EMA_SPAN;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INTERVAL_SECS: i64 = 60;
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_SYMBOL_SUFFIX: &str = ".NS";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; quotepoll)";
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;
pub const DEFAULT_LOG_PATH: &str = "logs/quotepoll.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Postgres { conninfo: String },
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub symbol_suffix: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            symbol_suffix: DEFAULT_SYMBOL_SUFFIX.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub ema_span: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS as u64),
            ema_span: DEFAULT_EMA_SPAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub store: StoreConfig,
    pub provider: ProviderConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

pub fn build_poller_config(config: &dyn ConfigPort) -> Result<PollerConfig, QuotepollError> {
    Ok(PollerConfig {
        store: build_store_config(config)?,
        provider: build_provider_config(config)?,
        scheduler: build_scheduler_config(config)?,
        logging: build_logging_config(config)?,
    })
}

pub fn build_store_config(config: &dyn ConfigPort) -> Result<StoreConfig, QuotepollError> {
    let backend = config
        .get_string("database", "backend")
        .map(|b| b.trim().to_lowercase())
        .unwrap_or_else(|| "postgres".to_string());

    match backend.as_str() {
        "postgres" | "postgresql" => Ok(StoreConfig::Postgres {
            conninfo: build_conninfo(config)?,
        }),
        "sqlite" => {
            let path = non_empty(config, "sqlite", "path").ok_or_else(|| {
                QuotepollError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                }
            })?;
            Ok(StoreConfig::Sqlite {
                path: PathBuf::from(path),
            })
        }
        other => Err(QuotepollError::ConfigInvalid {
            section: "database".into(),
            key: "backend".into(),
            reason: format!("unknown backend '{other}' (expected postgres or sqlite)"),
        }),
    }
}

/// `[database] conninfo` wins; otherwise the discrete host/dbname/user/
/// password/port keys are assembled into a libpq key/value string.
fn build_conninfo(config: &dyn ConfigPort) -> Result<String, QuotepollError> {
    if let Some(conninfo) = non_empty(config, "database", "conninfo") {
        return Ok(conninfo);
    }

    let mut parts = Vec::new();
    for key in ["host", "dbname", "user"] {
        let value = non_empty(config, "database", key).ok_or_else(|| {
            QuotepollError::ConfigMissing {
                section: "database".into(),
                key: key.into(),
            }
        })?;
        parts.push(format!("{key}={}", quote_conninfo_value(&value)));
    }

    if let Some(password) = config.get_string("database", "password") {
        parts.push(format!("password={}", quote_conninfo_value(&password)));
    }

    let port = int_or(config, "database", "port", 5432)?;
    if !(1..=65535).contains(&port) {
        return Err(QuotepollError::ConfigInvalid {
            section: "database".into(),
            key: "port".into(),
            reason: "port must be between 1 and 65535".into(),
        });
    }
    parts.push(format!("port={port}"));

    Ok(parts.join(" "))
}

fn quote_conninfo_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

pub fn build_provider_config(config: &dyn ConfigPort) -> Result<ProviderConfig, QuotepollError> {
    let defaults = ProviderConfig::default();
    let timeout_secs = int_or(config, "provider", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
    if timeout_secs <= 0 {
        return Err(QuotepollError::ConfigInvalid {
            section: "provider".into(),
            key: "timeout_secs".into(),
            reason: "timeout_secs must be positive".into(),
        });
    }

    Ok(ProviderConfig {
        base_url: non_empty(config, "provider", "base_url")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url),
        // An explicitly empty suffix is meaningful (symbols already qualified).
        symbol_suffix: config
            .get_string("provider", "symbol_suffix")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.symbol_suffix),
        user_agent: non_empty(config, "provider", "user_agent").unwrap_or(defaults.user_agent),
        timeout: Duration::from_secs(timeout_secs as u64),
    })
}

pub fn build_scheduler_config(config: &dyn ConfigPort) -> Result<SchedulerConfig, QuotepollError> {
    let interval_secs = int_or(config, "scheduler", "interval_secs", DEFAULT_INTERVAL_SECS)?;
    if interval_secs <= 0 {
        return Err(QuotepollError::ConfigInvalid {
            section: "scheduler".into(),
            key: "interval_secs".into(),
            reason: "interval_secs must be positive".into(),
        });
    }

    let ema_span = int_or(config, "scheduler", "ema_span", DEFAULT_EMA_SPAN as i64)?;
    if ema_span <= 0 {
        return Err(QuotepollError::ConfigInvalid {
            section: "scheduler".into(),
            key: "ema_span".into(),
            reason: "ema_span must be positive".into(),
        });
    }

    Ok(SchedulerConfig {
        interval: Duration::from_secs(interval_secs as u64),
        ema_span: ema_span as usize,
    })
}

pub fn build_logging_config(config: &dyn ConfigPort) -> Result<LoggingConfig, QuotepollError> {
    let level = non_empty(config, "logging", "level")
        .map(|l| l.to_lowercase())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        return Err(QuotepollError::ConfigInvalid {
            section: "logging".into(),
            key: "level".into(),
            reason: format!("unknown level '{level}'"),
        });
    }

    Ok(LoggingConfig {
        path: PathBuf::from(
            non_empty(config, "logging", "path").unwrap_or_else(|| DEFAULT_LOG_PATH.to_string()),
        ),
        level,
    })
}

/// Integer value of `[section] key`, or `default` when absent. A value that
/// does not parse is rejected rather than replaced by the default.
fn int_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, QuotepollError> {
    config
        .get_int(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|reason| QuotepollError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("expected an integer: {reason}"),
        })
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
