//! Account suspicion scoring.

use crate::roles::{
    RoleClassifier,
    thresholds::{ELEVATED, HIGH, LOW, WEAK_AUTHORITY},
};
use crate::types::{Role, SuspicionRecord};
use amlkernel_core::{
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use amlkernel_graph::measures::{NodeMeasures, NormalizedMeasureTable};
use async_trait::async_trait;
use tracing::debug;

/// Suspicion scoring kernel.
///
/// Adds fixed weights for a central-hub role, broker-like betweenness and
/// sink-like flow, caps the total at 1, drops zero scores and ranks the
/// rest.
#[derive(Debug, Clone)]
pub struct SuspicionScorer {
    metadata: KernelMetadata,
}

impl Default for SuspicionScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspicionScorer {
    /// Create a new suspicion scoring kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("compliance/suspicion-score", Domain::Compliance)
                .with_description("Role and measure based account suspicion ranking")
                .with_throughput(5_000_000)
                .with_latency_us(1.0),
        }
    }

    /// Score of one node, in `[0, 1]`.
    pub fn score(role: Role, m: &NodeMeasures) -> f64 {
        let mut score = 0.0;
        if role == Role::CentralHub {
            score += 0.5;
        }
        if m.betweenness > ELEVATED && m.authority_score < WEAK_AUTHORITY {
            score += 0.3;
        }
        if m.in_degree > HIGH && m.out_degree < LOW {
            score += 0.4;
        }
        f64::min(score, 1.0)
    }

    /// Rank accounts by suspicion.
    ///
    /// `roles` must be aligned with the table rows. Ties are ordered by
    /// account id.
    pub fn compute(table: &NormalizedMeasureTable, roles: &[Role]) -> Result<Vec<SuspicionRecord>> {
        if roles.len() != table.len() {
            return Err(KernelError::validation(format!(
                "{} roles for {} accounts",
                roles.len(),
                table.len()
            )));
        }

        let mut records: Vec<SuspicionRecord> = table
            .iter()
            .zip(roles)
            .filter_map(|((account, m), &role)| {
                let score = Self::score(role, m);
                (score > 0.0).then(|| SuspicionRecord {
                    account_id: account.to_string(),
                    role,
                    suspicion_score: score,
                    degree_in: m.in_degree,
                    degree_out: m.out_degree,
                    betweenness: m.betweenness,
                    pagerank: m.pagerank,
                })
            })
            .collect();

        records.sort_by(|a, b| {
            b.suspicion_score
                .total_cmp(&a.suspicion_score)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        debug!(
            accounts = table.len(),
            suspicious = records.len(),
            "Scored account suspicion"
        );
        Ok(records)
    }

    /// Classify and rank in one step.
    pub fn rank(table: &NormalizedMeasureTable) -> Vec<SuspicionRecord> {
        let roles = RoleClassifier::compute(table);
        // Roles come from the same table, so lengths always agree.
        Self::compute(table, &roles).unwrap_or_default()
    }
}

impl AnalyticsKernel for SuspicionScorer {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<NormalizedMeasureTable, Vec<SuspicionRecord>> for SuspicionScorer {
    async fn execute(&self, input: NormalizedMeasureTable) -> Result<Vec<SuspicionRecord>> {
        Ok(Self::rank(&input))
    }
}
