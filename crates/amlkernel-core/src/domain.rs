//! Domain definitions for kernel categorization.
//!
//! Kernels are organized into domains representing the analytical area they
//! belong to. Domains drive catalogue listing and registry lookups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Analytical domain for kernel categorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Domain {
    /// Transaction ledger ingestion and validation
    Ledger,

    /// Graph analytics: flow graph construction, centrality, cycles
    GraphAnalytics,

    /// Statistical machine learning: categorical clustering
    StatisticalML,

    /// Compliance: role classification, suspicion scoring, pattern detection
    Compliance,
}

impl Domain {
    /// All available domains.
    pub const ALL: &'static [Domain] = &[
        Domain::Ledger,
        Domain::GraphAnalytics,
        Domain::StatisticalML,
        Domain::Compliance,
    ];

    /// Returns the domain name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::Ledger => "Ledger",
            Domain::GraphAnalytics => "GraphAnalytics",
            Domain::StatisticalML => "StatisticalML",
            Domain::Compliance => "Compliance",
        }
    }

    /// Short name used by the CLI and catalogue (e.g. `graph`).
    #[must_use]
    pub const fn feature(&self) -> &'static str {
        match self {
            Domain::Ledger => "ledger",
            Domain::GraphAnalytics => "graph",
            Domain::StatisticalML => "ml",
            Domain::Compliance => "compliance",
        }
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s) || d.feature().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown domain: {}", s))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
