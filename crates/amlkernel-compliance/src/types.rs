//! Compliance types and data structures.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Network Role Types
// ============================================================================

/// Structural role of an account in the flow network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// High betweenness and high total flow.
    CentralHub,
    /// Mostly receives.
    Sink,
    /// Mostly sends.
    Source,
    /// Strong hub score with weak authority.
    Connector,
    /// No distinctive pattern.
    Normal,
}

impl Role {
    /// All roles.
    pub const ALL: [Role; 5] = [
        Role::CentralHub,
        Role::Sink,
        Role::Source,
        Role::Connector,
        Role::Normal,
    ];

    /// Role name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::CentralHub => "CentralHub",
            Role::Sink => "Sink",
            Role::Source => "Source",
            Role::Connector => "Connector",
            Role::Normal => "Normal",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Account identifier.
    pub account_id: String,
    /// Assigned role.
    pub role: Role,
}

/// One row of the suspicion ranking.
///
/// Measure fields carry normalized values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspicionRecord {
    /// Account identifier.
    pub account_id: String,
    /// Network role.
    pub role: Role,
    /// Score in `(0, 1]`.
    pub suspicion_score: f64,
    /// Normalized in-degree.
    pub degree_in: f64,
    /// Normalized out-degree.
    pub degree_out: f64,
    /// Normalized betweenness.
    pub betweenness: f64,
    /// Normalized PageRank.
    pub pagerank: f64,
}

// ============================================================================
// Cluster Pattern Types
// ============================================================================

/// Pattern scores of one cluster, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternScores {
    /// Cycle length and cycled amount.
    pub circular: f64,
    /// Repeated small payments from one sender.
    pub smurfing: f64,
    /// Many distinct senders into one receiver.
    pub integration: f64,
}

impl PatternScores {
    /// Largest of the three scores.
    pub fn max(&self) -> f64 {
        self.circular.max(self.smurfing).max(self.integration)
    }
}

/// A cluster flagged by the pattern detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPatternResult {
    /// Cluster id from the clusterer.
    pub cluster_id: usize,
    /// Number of transactions.
    pub size: usize,
    /// Circular flow score.
    pub circular_score: f64,
    /// Smurfing score.
    pub smurfing_score: f64,
    /// Integration score.
    pub integration_score: f64,
    /// Ids of the member transactions.
    pub transaction_ids: Vec<usize>,
}

impl ClusterPatternResult {
    /// Largest of the three scores.
    pub fn max_score(&self) -> f64 {
        self.circular_score
            .max(self.smurfing_score)
            .max(self.integration_score)
    }
}
