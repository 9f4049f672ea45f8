//! Analysis configuration.
//!
//! One `AnalysisConfig` drives both detection paths: centrality iteration
//! parameters for the network path, CLOPE parameters and pattern thresholds
//! for the cluster path, plus logging.
//!
//! # Example
//!
//! ```rust,ignore
//! use amlkernel_core::config::AnalysisConfig;
//!
//! // Defaults overridden by AMLKERNEL_* environment variables
//! let config = AnalysisConfig::from_env()?;
//!
//! // Or load from file
//! let config = AnalysisConfig::from_file("config/analysis.toml")?;
//! config.validate()?;
//! ```

use crate::error::{KernelError, Result};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// PageRank and HITS iteration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityConfig {
    /// PageRank damping factor.
    pub damping: f64,
    /// Iteration cap for PageRank and HITS.
    pub max_iterations: u32,
    /// Convergence tolerance on the max absolute score change.
    pub tolerance: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

/// CLOPE clusterer parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClopeConfig {
    /// Repulsion exponent `r`.
    pub repulsion: f64,
    /// Maximum number of full passes.
    pub max_iterations: u32,
    /// When true, candidate gain is `delta_add - delta_remove`;
    /// otherwise `delta_add` alone.
    pub use_repulsion_gain: bool,
    /// Width of the amount bins used to tokenize amounts.
    pub amount_bin_width: f64,
}

impl Default for ClopeConfig {
    fn default() -> Self {
        Self {
            repulsion: 2.5,
            max_iterations: 10,
            use_repulsion_gain: true,
            amount_bin_width: 1_000.0,
        }
    }
}

/// Which smurfing score formula the pattern detector applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmurfingFormula {
    /// `min(1, (5 / mean_amount) * 0.2)`: larger means inside the
    /// sub-threshold band give smaller scores.
    #[default]
    Literal,
    /// Scores rise with distance below the reporting threshold and with
    /// repeat-sender activity.
    Corrected,
}

/// Cluster pattern detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Clusters smaller than this are skipped as noise.
    pub min_cluster_size: usize,
    /// Minimum cluster size for the smurfing and integration scores.
    pub min_transactions_for_flow: usize,
    /// A cluster is reported if any score exceeds this value.
    pub report_threshold: f64,
    /// Smurfing score variant.
    pub smurfing_formula: SmurfingFormula,
    /// Longest cycle (in nodes) enumerated per cluster; 0 means unbounded.
    pub max_cycle_length: usize,
    /// Cycles enumerated per cluster before the circular score settles on
    /// what was found so far.
    pub max_cycles: usize,
    /// Score clusters on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 3,
            min_transactions_for_flow: 5,
            report_threshold: 0.7,
            smurfing_formula: SmurfingFormula::Literal,
            max_cycle_length: 0,
            max_cycles: 10_000,
            parallel: false,
        }
    }
}

/// Unified analysis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Centrality iteration parameters.
    pub centrality: CentralityConfig,
    /// CLOPE parameters.
    pub clope: ClopeConfig,
    /// Pattern detector thresholds.
    pub patterns: PatternConfig,
    /// Logging configuration.
    pub logging: LogConfig,
    /// Deadline per detection path, in seconds.
    pub timeout_secs: Option<u64>,
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    ///
    /// `AMLKERNEL_CONFIG` names a TOML file to start from; the remaining
    /// `AMLKERNEL_*` variables override individual values.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("AMLKERNEL_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Some(damping) = env_parse::<f64>("AMLKERNEL_DAMPING")? {
            config.centrality.damping = damping;
        }

        if let Some(r) = env_parse::<f64>("AMLKERNEL_CLOPE_REPULSION")? {
            config.clope.repulsion = r;
        }

        if let Some(n) = env_parse::<u32>("AMLKERNEL_CLOPE_MAX_ITERATIONS")? {
            config.clope.max_iterations = n;
        }

        if let Ok(level) = std::env::var("AMLKERNEL_LOG_LEVEL") {
            config.logging.level = level.parse().map_err(KernelError::config)?;
        }

        if let Some(secs) = env_parse::<u64>("AMLKERNEL_TIMEOUT_SECS")? {
            config.timeout_secs = Some(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KernelError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Render configuration as TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KernelError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| KernelError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let c = &self.centrality;
        if !(c.damping > 0.0 && c.damping < 1.0) {
            return Err(KernelError::config(format!(
                "centrality.damping must be in (0, 1), got {}",
                c.damping
            )));
        }
        if c.max_iterations == 0 {
            return Err(KernelError::config("centrality.max_iterations must be positive"));
        }
        if c.tolerance <= 0.0 {
            return Err(KernelError::config("centrality.tolerance must be positive"));
        }

        let k = &self.clope;
        if k.repulsion <= 1.0 {
            return Err(KernelError::config(format!(
                "clope.repulsion must be greater than 1, got {}",
                k.repulsion
            )));
        }
        if k.max_iterations == 0 {
            return Err(KernelError::config("clope.max_iterations must be positive"));
        }
        if k.amount_bin_width <= 0.0 {
            return Err(KernelError::config("clope.amount_bin_width must be positive"));
        }

        let p = &self.patterns;
        if !(0.0..=1.0).contains(&p.report_threshold) {
            return Err(KernelError::config(format!(
                "patterns.report_threshold must be in [0, 1], got {}",
                p.report_threshold
            )));
        }

        if p.max_cycles == 0 {
            return Err(KernelError::config("patterns.max_cycles must be positive"));
        }

        if p.parallel && !cfg!(feature = "parallel") {
            tracing::warn!("patterns.parallel is set but the `parallel` feature is disabled");
        }

        Ok(())
    }

    /// Per-path deadline, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Set the centrality configuration
    pub fn with_centrality(mut self, config: CentralityConfig) -> Self {
        self.centrality = config;
        self
    }

    /// Set the CLOPE configuration
    pub fn with_clope(mut self, config: ClopeConfig) -> Self {
        self.clope = config;
        self
    }

    /// Set the pattern detector configuration
    pub fn with_patterns(mut self, config: PatternConfig) -> Self {
        self.patterns = config;
        self
    }

    /// Set the logging configuration
    pub fn with_logging(mut self, config: LogConfig) -> Self {
        self.logging = config;
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| KernelError::config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        assert_eq!(config.clope.repulsion, 2.5);
        assert_eq!(config.patterns.report_threshold, 0.7);
        assert_eq!(config.patterns.smurfing_formula, SmurfingFormula::Literal);
        assert_eq!(config.patterns.max_cycle_length, 0);
        assert_eq!(config.patterns.max_cycles, 10_000);
    }

    #[test]
    fn test_toml_roundtrip_keeps_overrides() {
        let config = AnalysisConfig::default().with_clope(ClopeConfig {
            repulsion: 3.0,
            ..Default::default()
        });
        let text = config.to_toml().unwrap();
        let parsed = AnalysisConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.clope.repulsion, 3.0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = AnalysisConfig::from_toml(
            r#"
            [patterns]
            smurfing_formula = "corrected"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.patterns.smurfing_formula, SmurfingFormula::Corrected);
        assert_eq!(parsed.patterns.min_cluster_size, 3);
        assert_eq!(parsed.centrality.damping, 0.85);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.centrality.damping = 1.5;
        assert!(matches!(config.validate(), Err(KernelError::ConfigError(_))));

        let mut config = AnalysisConfig::default();
        config.clope.repulsion = 1.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.patterns.max_cycles = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.patterns.report_threshold = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("amlkernel-config-{}.toml", std::process::id()));
        AnalysisConfig::default().to_file(&path).unwrap();
        let loaded = AnalysisConfig::from_file(&path).unwrap();
        assert_eq!(loaded.centrality.max_iterations, 100);
        std::fs::remove_file(&path).ok();
    }
}
