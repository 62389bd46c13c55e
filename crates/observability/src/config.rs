//! Observability configuration.
//!
//! Read from the environment:
//!
//! - `RUST_LOG`: `EnvFilter` directives (default `info`)
//! - `ORDERFLOW_LOG_FORMAT`: `json` (default) or `pretty`

use core::str::FromStr;

use thiserror::Error;

pub const LOG_FORMAT_ENV: &str = "ORDERFLOW_LOG_FORMAT";
pub const LOG_FILTER_ENV: &str = "RUST_LOG";
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt subscriber.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// `ORDERFLOW_LOG_FORMAT` held something other than `json` or `pretty`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown log format '{0}'")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub filter: String,
    pub format: LogFormat,
    /// Set when `ORDERFLOW_LOG_FORMAT` held something unrecognised; reported once
    /// the subscriber is up.
    pub format_warning: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            format_warning: None,
        }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a closure over a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let filter = lookup(LOG_FILTER_ENV)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let (format, format_warning) = match lookup(LOG_FORMAT_ENV) {
            None => (LogFormat::default(), None),
            Some(raw) => match raw.parse::<LogFormat>() {
                Ok(format) => (format, None),
                Err(err) => (LogFormat::default(), Some(format!("{err}; falling back to json"))),
            },
        };

        Self {
            filter,
            format,
            format_warning,
        }
    }
}
