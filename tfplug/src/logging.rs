//! Logging setup for providers
//!
//! Terraform reads the plugin handshake from stdout, so log output always goes
//! to stderr. The level follows `TF_LOG` the same way Terraform itself does.

use crate::error::{Result, TfplugError};

/// Log level for provider output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses a `TF_LOG` style level name, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "JSON" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Reads `TF_LOG_PROVIDER`, then `TF_LOG`, defaulting to `Info`
    pub fn from_env() -> Self {
        ["TF_LOG_PROVIDER", "TF_LOG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| Self::parse(&value))
            .unwrap_or(LogLevel::Info)
    }

    fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Installs a global stderr subscriber at the given level
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(level: LogLevel) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| TfplugError::LoggingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_terraform_levels() {
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("TRACE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("json"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("off"), None);
    }

    #[test]
    fn init_tracing_only_installs_once() {
        let _ = init_tracing(LogLevel::Warn);
        assert!(init_tracing(LogLevel::Warn).is_err());
    }
}
