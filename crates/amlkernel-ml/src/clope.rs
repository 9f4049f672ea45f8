//! CLOPE categorical clustering kernel.
//!
//! CLOPE groups transactions (sets of categorical items) by maximising the
//! height-to-width ratio of each cluster's item histogram instead of a
//! distance metric. For a cluster with `S` transactions, `D` item
//! occurrences and `W` distinct items:
//!
//! ```text
//! profit = S * D / W^r
//! ```
//!
//! The repulsion exponent `r` controls how tightly clusters must share items.
//! Optimisation starts from singletons and moves one transaction at a time to
//! the cluster with the best profit gain until a full pass makes no move.

use crate::categorical::encode_transactions;
use amlkernel_core::{
    config::ClopeConfig,
    convergence::IterativeState,
    domain::Domain,
    error::{KernelError, Result},
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use amlkernel_ledger::{table::TransactionTable, types::Transaction};
use async_trait::async_trait;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// CLOPE cluster profit `S * D / W^r`; 0 when `W == 0`.
pub fn profit(size: usize, occurrences: usize, width: usize, repulsion: f64) -> f64 {
    if width == 0 {
        return 0.0;
    }
    (size as f64 * occurrences as f64) / (width as f64).powf(repulsion)
}

// ============================================================================
// Cluster arena
// ============================================================================

/// Incremental item histogram of one cluster.
#[derive(Debug, Clone, Default)]
struct Cluster {
    occ: HashMap<u32, u32>,
    size: usize,
    occurrences: usize,
}

impl Cluster {
    fn width(&self) -> usize {
        self.occ.len()
    }

    fn profit(&self, r: f64) -> f64 {
        profit(self.size, self.occurrences, self.width(), r)
    }

    /// Profit change from adding `items`.
    fn delta_add(&self, items: &[u32], r: f64) -> f64 {
        let new_items = items.iter().filter(|i| !self.occ.contains_key(*i)).count();
        profit(
            self.size + 1,
            self.occurrences + items.len(),
            self.width() + new_items,
            r,
        ) - self.profit(r)
    }

    /// Profit before minus profit after removing `items`.
    fn delta_remove(&self, items: &[u32], r: f64) -> f64 {
        let lost_items = items
            .iter()
            .filter(|i| self.occ.get(*i).copied() == Some(1))
            .count();
        let after = profit(
            self.size.saturating_sub(1),
            self.occurrences.saturating_sub(items.len()),
            self.width().saturating_sub(lost_items),
            r,
        );
        self.profit(r) - after
    }

    fn add(&mut self, items: &[u32]) {
        for &item in items {
            *self.occ.entry(item).or_insert(0) += 1;
        }
        self.size += 1;
        self.occurrences += items.len();
    }

    fn remove(&mut self, items: &[u32]) {
        for item in items {
            if let Some(count) = self.occ.get_mut(item) {
                *count -= 1;
                if *count == 0 {
                    self.occ.remove(item);
                }
            }
        }
        self.size -= 1;
        self.occurrences -= items.len();
    }
}

// ============================================================================
// Results
// ============================================================================

/// One final cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Compacted cluster id.
    pub id: usize,
    /// Number of transactions (`S`).
    pub size: usize,
    /// Distinct items (`W`).
    pub width: usize,
    /// Item occurrences (`D`).
    pub occurrences: usize,
    /// Cluster profit.
    pub profit: f64,
    /// Member positions in input order.
    pub transaction_ids: Vec<usize>,
}

/// CLOPE output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClopeResult {
    /// Cluster id per transaction, compacted to `0..k` by first appearance.
    pub assignments: Vec<usize>,
    /// Final clusters, ordered by id.
    pub clusters: Vec<ClusterSummary>,
    /// Number of full passes executed.
    pub iterations: u32,
    /// Moves made in each pass.
    pub moves_per_iteration: Vec<usize>,
    /// Whether the last pass made no move.
    pub converged: bool,
    /// Global criterion: size-weighted mean cluster profit.
    pub profit: f64,
}

impl ClopeResult {
    /// Number of clusters.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Total moves over all passes.
    pub fn total_moves(&self) -> usize {
        self.moves_per_iteration.iter().sum()
    }
}

// ============================================================================
// CLOPE Kernel
// ============================================================================

/// CLOPE clustering kernel.
#[derive(Debug, Clone)]
pub struct Clope {
    metadata: KernelMetadata,
    config: ClopeConfig,
}

impl Default for Clope {
    fn default() -> Self {
        Self::new()
    }
}

impl Clope {
    /// Create a new CLOPE kernel with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClopeConfig::default())
    }

    /// Create a CLOPE kernel with explicit parameters.
    #[must_use]
    pub fn with_config(config: ClopeConfig) -> Self {
        Self {
            metadata: KernelMetadata::iterative("ml/clope", Domain::StatisticalML)
                .with_description("CLOPE categorical transaction clustering")
                .with_throughput(50_000)
                .with_latency_us(200.0),
            config,
        }
    }

    /// Parameters in use.
    pub fn config(&self) -> &ClopeConfig {
        &self.config
    }

    /// Cluster item sets starting from singletons.
    pub fn fit(&self, items: &[Vec<u32>]) -> ClopeResult {
        Self::compute(items, &self.config)
    }

    /// Tokenize transactions and cluster them.
    pub fn fit_transactions(&self, transactions: &[Transaction]) -> ClopeResult {
        let (items, interner) = encode_transactions(transactions, self.config.amount_bin_width);
        debug!(
            transactions = transactions.len(),
            tokens = interner.len(),
            "Encoded transactions for CLOPE"
        );
        self.fit(&items)
    }

    /// Continue optimising from an existing partition.
    ///
    /// `partition[i]` is any label for transaction `i`; equal labels mean the
    /// same starting cluster.
    pub fn refine(&self, items: &[Vec<u32>], partition: &[usize]) -> Result<ClopeResult> {
        if partition.len() != items.len() {
            return Err(KernelError::validation(format!(
                "partition has {} labels for {} transactions",
                partition.len(),
                items.len()
            )));
        }
        let (assignment, clusters) = Self::seed(items, partition);
        Ok(Self::optimize(items, assignment, clusters, &self.config))
    }

    /// Run CLOPE from singletons.
    pub fn compute(items: &[Vec<u32>], config: &ClopeConfig) -> ClopeResult {
        let singletons: Vec<usize> = (0..items.len()).collect();
        let (assignment, clusters) = Self::seed(items, &singletons);
        Self::optimize(items, assignment, clusters, config)
    }

    /// Size-weighted mean cluster profit of a partition.
    pub fn global_profit(items: &[Vec<u32>], assignments: &[usize], repulsion: f64) -> f64 {
        if items.is_empty() {
            return 0.0;
        }
        let (_, clusters) = Self::seed(items, assignments);
        let weighted: f64 = clusters
            .iter()
            .map(|c| c.profit(repulsion) * c.size as f64)
            .sum();
        weighted / items.len() as f64
    }

    fn seed(items: &[Vec<u32>], partition: &[usize]) -> (Vec<usize>, Vec<Cluster>) {
        let mut label_to_id: HashMap<usize, usize> = HashMap::new();
        let mut clusters: Vec<Cluster> = Vec::new();
        let mut assignment = Vec::with_capacity(items.len());

        for (txn, &label) in items.iter().zip(partition) {
            let id = *label_to_id.entry(label).or_insert_with(|| {
                clusters.push(Cluster::default());
                clusters.len() - 1
            });
            clusters[id].add(txn);
            assignment.push(id);
        }
        (assignment, clusters)
    }

    fn optimize(
        items: &[Vec<u32>],
        mut assignment: Vec<usize>,
        mut clusters: Vec<Cluster>,
        config: &ClopeConfig,
    ) -> ClopeResult {
        let r = config.repulsion;
        let mut live: BTreeSet<usize> = (0..clusters.len())
            .filter(|&c| clusters[c].size > 0)
            .collect();

        // A pass with zero moves (delta < 1) is the fixed point.
        let mut state = IterativeState::new(1.0, u64::from(config.max_iterations));
        let mut moves_per_iteration = Vec::new();

        if items.is_empty() {
            state.update(0.0);
        }

        while state.should_continue() {
            let mut moves = 0usize;

            for (t, txn) in items.iter().enumerate() {
                let current = assignment[t];
                let delta_remove = clusters[current].delta_remove(txn, r);

                let mut best: Option<(usize, f64)> = None;
                for &c in &live {
                    if c == current {
                        continue;
                    }
                    let delta_add = clusters[c].delta_add(txn, r);
                    let gain = if config.use_repulsion_gain {
                        delta_add - delta_remove
                    } else {
                        delta_add
                    };
                    if gain > 0.0 && best.is_none_or(|(_, g)| gain > g) {
                        best = Some((c, gain));
                    }
                }

                if let Some((target, _)) = best {
                    clusters[current].remove(txn);
                    clusters[target].add(txn);
                    assignment[t] = target;
                    if clusters[current].size == 0 {
                        live.remove(&current);
                    }
                    moves += 1;
                }
            }

            debug!(
                pass = state.iteration() + 1,
                moves,
                clusters = live.len(),
                "CLOPE pass complete"
            );
            moves_per_iteration.push(moves);
            state.update(moves as f64);
        }

        let summary = state.summary();
        if !summary.converged {
            warn!(
                passes = summary.iterations,
                last_moves = summary.final_delta,
                "CLOPE stopped at the pass cap without converging"
            );
        }

        Self::finish(items, &assignment, r, moves_per_iteration, summary.converged)
    }

    fn finish(
        items: &[Vec<u32>],
        assignment: &[usize],
        r: f64,
        moves_per_iteration: Vec<usize>,
        converged: bool,
    ) -> ClopeResult {
        // Compact ids by first appearance.
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let assignments: Vec<usize> = assignment
            .iter()
            .map(|&c| {
                let next = remap.len();
                *remap.entry(c).or_insert(next)
            })
            .collect();

        let mut clusters: Vec<ClusterSummary> = Vec::with_capacity(remap.len());
        let mut arena: Vec<Cluster> = vec![Cluster::default(); remap.len()];
        for (t, &c) in assignments.iter().enumerate() {
            arena[c].add(&items[t]);
            if c == clusters.len() {
                clusters.push(ClusterSummary {
                    id: c,
                    size: 0,
                    width: 0,
                    occurrences: 0,
                    profit: 0.0,
                    transaction_ids: Vec::new(),
                });
            }
            clusters[c].transaction_ids.push(t);
        }

        for (summary, cluster) in clusters.iter_mut().zip(&arena) {
            summary.size = cluster.size;
            summary.width = cluster.width();
            summary.occurrences = cluster.occurrences;
            summary.profit = cluster.profit(r);
        }

        let profit = Self::global_profit(items, &assignments, r);
        ClopeResult {
            assignments,
            clusters,
            iterations: moves_per_iteration.len() as u32,
            moves_per_iteration,
            converged,
            profit,
        }
    }
}

impl AnalyticsKernel for Clope {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }

    fn validate(&self) -> Result<()> {
        if self.config.repulsion <= 1.0 {
            return Err(KernelError::validation("repulsion must be greater than 1"));
        }
        if self.config.max_iterations == 0 {
            return Err(KernelError::validation("max_iterations must be positive"));
        }
        Ok(())
    }
}

#[async_trait]
impl BatchKernel<TransactionTable, ClopeResult> for Clope {
    async fn execute(&self, input: TransactionTable) -> Result<ClopeResult> {
        self.validate()?;
        Ok(self.fit_transactions(input.transactions()))
    }
}
