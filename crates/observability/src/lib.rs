//! Tracing/logging setup shared by every process that runs order workflows.

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&config::ObservabilityConfig::from_env());
}

/// Environment-driven settings.
pub mod config;

/// Tracing subscriber installation.
pub mod tracing;

pub use config::{LogFormat, ObservabilityConfig, UnknownLogFormat};
