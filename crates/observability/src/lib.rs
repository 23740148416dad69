//! Tracing/logging (shared setup).

/// Initialize process-wide observability from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(config::ObservabilityConfig::from_env());
}

/// Logging configuration (filter directive, output format).
pub mod config;

/// Tracing subscriber installation.
pub mod tracing;

pub use config::{ConfigError, LogFormat, ObservabilityConfig};
pub use self::tracing::init_with;
