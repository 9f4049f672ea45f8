//! Structured logging setup.
//!
//! Kernels only emit `tracing` events; binaries and tests decide where those
//! go by calling [`LogConfig::init`] once.
//!
//! ```rust,ignore
//! use amlkernel_core::logging::{LogConfig, LogLevel};
//!
//! LogConfig::default().with_level(LogLevel::Debug).init()?;
//! tracing::info!(accounts = 42, "Suspicion ranking complete");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum severity written when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-pass iteration detail.
    Trace,
    /// Per-stage sizes and counts.
    Debug,
    /// Pipeline boundaries.
    #[default]
    Info,
    /// Non-convergence and skipped input.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    const NAMES: [(&'static str, LogLevel); 5] = [
        ("trace", LogLevel::Trace),
        ("debug", LogLevel::Debug),
        ("info", LogLevel::Info),
        ("warn", LogLevel::Warn),
        ("error", LogLevel::Error),
    ];

    /// Directive understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, level)| level == self)
            .map_or("info", |(name, _)| *name)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = match s.to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            other => other.to_string(),
        };
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, level)| *level)
            .ok_or_else(|| format!("Invalid log level: {}", s))
    }
}

/// Where and how log events are written.
///
/// Output always goes to stderr so that reports written to stdout stay
/// machine-readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// One JSON object per event instead of human-readable lines.
    pub structured: bool,
    /// Add file and line to each event.
    pub include_location: bool,
    /// Add the emitting thread id to each event.
    pub include_thread_ids: bool,
}

impl LogConfig {
    /// Set the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Toggle JSON output. JSON output also records thread ids.
    pub fn with_structured(mut self, structured: bool) -> Self {
        self.structured = structured;
        self.include_thread_ids |= structured;
        self
    }

    /// Install the global subscriber.
    ///
    /// Only the first call in a process takes effect; later calls return
    /// `Ok` and leave it in place.
    pub fn init(&self) -> crate::error::Result<()> {
        use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()));

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(self.include_thread_ids)
            .with_file(self.include_location)
            .with_line_number(self.include_location);

        let registry = tracing_subscriber::registry().with(filter);
        let installed = if self.structured {
            registry.with(layer.json()).try_init()
        } else {
            registry.with(layer).try_init()
        };

        if installed.is_err() {
            tracing::debug!("Global subscriber already installed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_names() {
        for (name, level) in LogLevel::NAMES {
            assert_eq!(level.to_string(), name);
            assert_eq!(name.parse::<LogLevel>(), Ok(level));
        }
        assert!(LogLevel::Debug < LogLevel::Warn);
    }

    #[test]
    fn test_structured_adds_thread_ids() {
        let config = LogConfig::default().with_structured(true);
        assert!(config.structured);
        assert!(config.include_thread_ids);
        assert_eq!(LogConfig::default().level, LogLevel::Info);
    }

    #[test]
    fn test_init_is_idempotent() {
        LogConfig::default().init().unwrap();
        LogConfig::default().with_structured(true).init().unwrap();
    }
}
