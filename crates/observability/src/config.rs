use core::str::FromStr;

use thiserror::Error;

/// Env var holding the `EnvFilter` directive.
pub const FILTER_ENV: &str = "RUST_LOG";
/// Env var selecting the output format (`json` or `pretty`).
pub const FORMAT_ENV: &str = "PINLEDGER_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log format: {0} (expected `json` or `pretty`)")]
    UnknownFormat(String),
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, with timestamps.
    #[default]
    Json,
    /// Multi-line, human-readable output for local runs.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub filter: String,
    pub format: LogFormat,
    /// Raw format value that was rejected while reading the environment.
    pub(crate) rejected_format: Option<String>,
}

impl ObservabilityConfig {
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
            rejected_format: None,
        }
    }

    /// Read `RUST_LOG` and `PINLEDGER_LOG_FORMAT`.
    ///
    /// An unknown format falls back to the default; `init_with` reports it
    /// once the subscriber is installed.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(FILTER_ENV).ok(),
            std::env::var(FORMAT_ENV).ok(),
        )
    }

    fn from_vars(filter: Option<String>, format: Option<String>) -> Self {
        let filter = filter
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let (format, rejected_format) = match format.as_deref().map(LogFormat::from_str) {
            None => (LogFormat::default(), None),
            Some(Ok(format)) => (format, None),
            Some(Err(ConfigError::UnknownFormat(raw))) => (LogFormat::default(), Some(raw)),
        };

        Self {
            filter,
            format,
            rejected_format,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER, LogFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!(
            "xml".parse::<LogFormat>(),
            Err(ConfigError::UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn missing_vars_use_defaults() {
        let config = ObservabilityConfig::from_vars(None, None);
        assert_eq!(config, ObservabilityConfig::default());
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn blank_filter_falls_back_to_default() {
        let config = ObservabilityConfig::from_vars(Some("  ".to_string()), None);
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn vars_override_defaults() {
        let config = ObservabilityConfig::from_vars(
            Some("pinledger_bank=debug".to_string()),
            Some("pretty".to_string()),
        );
        assert_eq!(config.filter, "pinledger_bank=debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.rejected_format, None);
    }

    #[test]
    fn unknown_format_is_remembered_and_defaulted() {
        let config = ObservabilityConfig::from_vars(None, Some("yaml".to_string()));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.rejected_format.as_deref(), Some("yaml"));
    }
}
