//! Cluster money-flow pattern detection.
//!
//! Each transaction cluster is scored for three laundering signatures:
//! - Circular: money returning to its origin through a cycle of accounts
//! - Smurfing: one sender splitting value into many sub-threshold payments
//! - Integration: many distinct senders converging on one receiver

use crate::types::{ClusterPatternResult, PatternScores};
use amlkernel_core::{
    config::{PatternConfig, SmurfingFormula},
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use amlkernel_graph::{
    cycles::{CycleSummary, Enumeration, SimpleCycles},
    types::FlowGraph,
};
use amlkernel_ledger::{table::TransactionTable, types::Transaction};
use amlkernel_ml::clope::{ClopeResult, ClusterSummary};
use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeSet;
use std::ops::ControlFlow;
use tracing::{debug, warn};

/// Amount below which payments count as sub-threshold.
pub const REPORTING_THRESHOLD: f64 = 10_000.0;

/// Sender transaction count above which a sender counts as repetitive.
pub const REPEAT_SENDER_COUNT: usize = 3;

/// Distinct sender count above which a receiver counts as converging.
pub const CONVERGING_SENDERS: usize = 3;

/// Input of the pattern detector kernel.
#[derive(Debug, Clone)]
pub struct PatternInput {
    /// Ledger the clusters refer to.
    pub transactions: TransactionTable,
    /// Clustering of the ledger's transactions, by position.
    pub clustering: ClopeResult,
}

// ============================================================================
// Pattern Detector Kernel
// ============================================================================

/// Cluster pattern detection kernel.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    metadata: KernelMetadata,
    config: PatternConfig,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternDetector {
    /// Create a new pattern detector with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PatternConfig::default())
    }

    /// Create a pattern detector with explicit thresholds.
    #[must_use]
    pub fn with_config(config: PatternConfig) -> Self {
        Self {
            metadata: KernelMetadata::batch("compliance/cluster-patterns", Domain::Compliance)
                .with_description("Circular, smurfing and integration scoring per cluster")
                .with_throughput(20_000)
                .with_latency_us(250.0),
            config,
        }
    }

    /// Score every cluster and return the reported ones, ranked.
    ///
    /// `clusters` hold positions into `transactions`. Clusters below
    /// `min_cluster_size` are skipped. A cluster is reported when any score
    /// exceeds `report_threshold`; results are ordered by their largest score,
    /// then by cluster id.
    pub fn compute(
        transactions: &[Transaction],
        clusters: &[ClusterSummary],
        config: &PatternConfig,
    ) -> Vec<ClusterPatternResult> {
        let evaluate = |cluster: &ClusterSummary| -> Option<ClusterPatternResult> {
            if cluster.transaction_ids.len() < config.min_cluster_size {
                return None;
            }
            let members: Vec<&Transaction> = cluster
                .transaction_ids
                .iter()
                .filter_map(|&pos| transactions.get(pos))
                .collect();
            if members.len() != cluster.transaction_ids.len() {
                warn!(cluster_id = cluster.id, "Cluster refers to unknown transactions");
            }

            let scores = Self::score_cluster(&members, config);
            (scores.max() > config.report_threshold).then(|| ClusterPatternResult {
                cluster_id: cluster.id,
                size: members.len(),
                circular_score: scores.circular,
                smurfing_score: scores.smurfing,
                integration_score: scores.integration,
                transaction_ids: members.iter().map(|t| t.id).collect(),
            })
        };

        let mut results: Vec<ClusterPatternResult> = Self::map_clusters(clusters, config, evaluate);

        results.sort_by(|a, b| {
            b.max_score()
                .total_cmp(&a.max_score())
                .then_with(|| a.cluster_id.cmp(&b.cluster_id))
        });

        debug!(
            clusters = clusters.len(),
            reported = results.len(),
            "Scored cluster patterns"
        );
        results
    }

    #[cfg(feature = "parallel")]
    fn map_clusters<F>(
        clusters: &[ClusterSummary],
        config: &PatternConfig,
        evaluate: F,
    ) -> Vec<ClusterPatternResult>
    where
        F: Fn(&ClusterSummary) -> Option<ClusterPatternResult> + Sync + Send,
    {
        if config.parallel {
            use rayon::prelude::*;
            clusters.par_iter().filter_map(evaluate).collect()
        } else {
            clusters.iter().filter_map(evaluate).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn map_clusters<F>(
        clusters: &[ClusterSummary],
        _config: &PatternConfig,
        evaluate: F,
    ) -> Vec<ClusterPatternResult>
    where
        F: Fn(&ClusterSummary) -> Option<ClusterPatternResult>,
    {
        clusters.iter().filter_map(evaluate).collect()
    }

    /// All three scores for one cluster's transactions.
    pub fn score_cluster(members: &[&Transaction], config: &PatternConfig) -> PatternScores {
        PatternScores {
            circular: Self::circular_score(members, config),
            smurfing: Self::smurfing_score(members, config),
            integration: Self::integration_score(members, config),
        }
    }

    /// `min(1, max_cycle_length/10 + total_cycle_amount/100000)`, or 0 when
    /// the cluster's local flow graph is acyclic.
    ///
    /// Enumeration stops as soon as the score saturates. After
    /// `max_cycles` cycles, or a search budget proportional to it, the
    /// score covers the cycles found so far.
    pub fn circular_score(members: &[&Transaction], config: &PatternConfig) -> f64 {
        let mut graph = FlowGraph::new();
        for tx in members {
            if let Err(e) = graph.add_transaction(tx) {
                warn!(transaction = tx.id, error = %e, "Skipping transaction in local graph");
            }
        }

        let score = |summary: &CycleSummary| {
            f64::min(
                1.0,
                summary.max_cycle_length as f64 / 10.0 + summary.total_cycle_amount / 100_000.0,
            )
        };

        let cap = (config.max_cycle_length > 0).then_some(config.max_cycle_length);
        let budget = config
            .max_cycles
            .saturating_mul(graph.node_count() + graph.edge_count());
        let mut summary = CycleSummary::default();
        let mut seen = BTreeSet::new();

        let outcome = SimpleCycles::visit(&graph, cap, Some(budget), |cycle| {
            summary.record(&graph, cycle, &mut seen);
            if score(&summary) >= 1.0 || summary.cycle_count >= config.max_cycles {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        if summary.cycle_count == 0 {
            return 0.0;
        }
        let circular = score(&summary);
        if circular < 1.0 && outcome != Enumeration::Complete {
            warn!(
                cycles = summary.cycle_count,
                nodes = graph.node_count(),
                "Cycle enumeration budget reached; circular score covers cycles found so far"
            );
        }
        circular
    }

    /// Repeated sub-threshold payments from one sender.
    ///
    /// Requires `min_transactions_for_flow` transactions, a sender with more
    /// than three of them and a mean amount below the reporting threshold.
    /// The literal formula `min(1, (5/mean) * 0.2)` scores larger means
    /// lower; `SmurfingFormula::Corrected` scores by distance below the
    /// threshold plus repeat-sender activity instead.
    pub fn smurfing_score(members: &[&Transaction], config: &PatternConfig) -> f64 {
        if members.is_empty() || members.len() < config.min_transactions_for_flow {
            return 0.0;
        }

        let mut per_sender: HashMap<&str, usize> = HashMap::new();
        for tx in members {
            *per_sender.entry(tx.sender_id.as_str()).or_insert(0) += 1;
        }
        let max_sender_count = per_sender.values().copied().max().unwrap_or(0);
        let mean = members.iter().map(|t| t.amount).sum::<f64>() / members.len() as f64;

        if max_sender_count <= REPEAT_SENDER_COUNT || mean >= REPORTING_THRESHOLD {
            return 0.0;
        }

        match config.smurfing_formula {
            SmurfingFormula::Literal => {
                if mean > 0.0 {
                    f64::min(1.0, (5.0 / mean) * 0.2)
                } else {
                    1.0
                }
            }
            SmurfingFormula::Corrected => {
                let extra = (max_sender_count - REPEAT_SENDER_COUNT) as f64;
                (1.0 - mean / REPORTING_THRESHOLD + 0.1 * extra).clamp(0.0, 1.0)
            }
        }
    }

    /// `min(1, max_distinct_senders/10)` when some receiver has more than
    /// three distinct senders.
    pub fn integration_score(members: &[&Transaction], config: &PatternConfig) -> f64 {
        if members.len() < config.min_transactions_for_flow {
            return 0.0;
        }

        let mut senders: HashMap<&str, HashSet<&str>> = HashMap::new();
        for tx in members {
            senders
                .entry(tx.receiver_id.as_str())
                .or_default()
                .insert(tx.sender_id.as_str());
        }
        let max_distinct = senders.values().map(HashSet::len).max().unwrap_or(0);

        if max_distinct > CONVERGING_SENDERS {
            f64::min(1.0, max_distinct as f64 / 10.0)
        } else {
            0.0
        }
    }
}

impl AnalyticsKernel for PatternDetector {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<PatternInput, Vec<ClusterPatternResult>> for PatternDetector {
    async fn execute(&self, input: PatternInput) -> Result<Vec<ClusterPatternResult>> {
        Ok(Self::compute(
            input.transactions.transactions(),
            &input.clustering.clusters,
            &self.config,
        ))
    }
}
