//! Domain error types.

/// Top-level error type for quotepoll.
#[derive(Debug, thiserror::Error)]
pub enum QuotepollError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("provider error for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("no data for {symbol} over {period}")]
    NoData { symbol: String, period: String },

    #[error("cannot open log destination {path}: {reason}")]
    Logging { path: String, reason: String },
}

impl QuotepollError {
    pub(crate) fn database(e: impl std::fmt::Display) -> Self {
        QuotepollError::Database {
            reason: e.to_string(),
        }
    }

    pub(crate) fn query(e: impl std::fmt::Display) -> Self {
        QuotepollError::DatabaseQuery {
            reason: e.to_string(),
        }
    }
}

impl QuotepollError {
    /// Process exit status reported for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            QuotepollError::Logging { .. } => 1,
            QuotepollError::ConfigParse { .. }
            | QuotepollError::ConfigMissing { .. }
            | QuotepollError::ConfigInvalid { .. } => 2,
            QuotepollError::Database { .. } | QuotepollError::DatabaseQuery { .. } => 3,
            QuotepollError::Provider { .. } | QuotepollError::NoData { .. } => 4,
        }
    }
}

impl From<&QuotepollError> for std::process::ExitCode {
    fn from(err: &QuotepollError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
