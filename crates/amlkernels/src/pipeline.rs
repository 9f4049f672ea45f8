//! End-to-end analysis.
//!
//! [`AmlAnalysis`] runs the network path and the cluster path over one
//! validated [`TransactionTable`] and collects both into an
//! [`AnalysisReport`]. The two paths share no state.

use amlkernel_compliance::{
    patterns::PatternDetector,
    suspicion::SuspicionScorer,
    types::{ClusterPatternResult, SuspicionRecord},
};
use amlkernel_core::{
    config::{AnalysisConfig, CentralityConfig, ClopeConfig, PatternConfig},
    convergence::ConvergenceSummary,
    error::{KernelError, Result},
};
use amlkernel_graph::{
    centrality::CentralityEngine,
    types::{FlowGraph, GraphSummary},
};
use amlkernel_ledger::{table::TransactionTable, types::Transaction};
use amlkernel_ml::clope::Clope;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

// ============================================================================
// Report
// ============================================================================

/// Outcome of the CLOPE run behind the pattern results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusteringOverview {
    /// Non-empty clusters.
    pub clusters: usize,
    /// Optimisation passes run.
    pub iterations: u32,
    /// Whether a pass finished without moves.
    pub converged: bool,
    /// Global profit of the final partition.
    pub profit: f64,
}

/// Convergence of the iterative centrality measures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CentralityConvergence {
    /// PageRank power iteration.
    pub pagerank: ConvergenceSummary,
    /// HITS iteration.
    pub hits: ConvergenceSummary,
}

/// Network path output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkFindings {
    /// Suspicious accounts, highest score first.
    pub suspicion: Vec<SuspicionRecord>,
    /// Size of the flow graph.
    pub graph_summary: GraphSummary,
    /// PageRank and HITS convergence.
    pub convergence: CentralityConvergence,
}

/// Cluster path output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterFindings {
    /// Reported clusters, highest score first.
    pub patterns: Vec<ClusterPatternResult>,
    /// CLOPE run summary.
    pub overview: ClusteringOverview,
}

/// Full analysis report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Suspicious accounts, highest score first.
    pub suspicion: Vec<SuspicionRecord>,
    /// Reported clusters, highest score first.
    pub patterns: Vec<ClusterPatternResult>,
    /// Size of the flow graph.
    pub graph_summary: GraphSummary,
    /// CLOPE run summary.
    pub cluster_summary: ClusteringOverview,
    /// Iterative measure convergence.
    pub convergence: CentralityConvergence,
}

impl AnalysisReport {
    fn assemble(network: NetworkFindings, clusters: ClusterFindings) -> Self {
        Self {
            suspicion: network.suspicion,
            patterns: clusters.patterns,
            graph_summary: network.graph_summary,
            cluster_summary: clusters.overview,
            convergence: network.convergence,
        }
    }

    /// Keep only the `n` highest-ranked accounts and clusters.
    pub fn truncate(&mut self, n: usize) {
        self.suspicion.truncate(n);
        self.patterns.truncate(n);
    }

    /// Whether anything was flagged.
    pub fn has_findings(&self) -> bool {
        !self.suspicion.is_empty() || !self.patterns.is_empty()
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KernelError::SerializationError(e.to_string()))
    }
}

// ============================================================================
// Analysis
// ============================================================================

/// Runs both detection paths with one configuration.
#[derive(Debug, Clone, Default)]
pub struct AmlAnalysis {
    config: AnalysisConfig,
}

impl AmlAnalysis {
    /// Create an analysis with the given configuration.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run both paths on the calling thread.
    pub fn run(&self, table: &TransactionTable) -> Result<AnalysisReport> {
        self.config.validate()?;
        info!(transactions = table.len(), "Starting AML analysis");

        let network = Self::network_path(table.transactions(), &self.config.centrality)?;
        let clusters =
            Self::cluster_path(table.transactions(), &self.config.clope, &self.config.patterns);

        let report = AnalysisReport::assemble(network, clusters);
        info!(
            suspicious_accounts = report.suspicion.len(),
            reported_clusters = report.patterns.len(),
            "AML analysis complete"
        );
        Ok(report)
    }

    /// Run each path on the blocking pool, bounded by the configured timeout.
    ///
    /// A path that exceeds the deadline yields [`KernelError::Timeout`]; its
    /// blocking task is left to finish in the background.
    pub async fn run_with_timeout(&self, table: &TransactionTable) -> Result<AnalysisReport> {
        self.config.validate()?;
        let limit = self.config.timeout();
        info!(
            transactions = table.len(),
            timeout = ?limit,
            "Starting AML analysis on the blocking pool"
        );

        let transactions: Arc<[Transaction]> = Arc::from(table.transactions());

        let network = {
            let transactions = Arc::clone(&transactions);
            let config = self.config.centrality.clone();
            tokio::task::spawn_blocking(move || Self::network_path(&transactions, &config))
        };
        let clusters = {
            let transactions = Arc::clone(&transactions);
            let clope = self.config.clope.clone();
            let patterns = self.config.patterns.clone();
            tokio::task::spawn_blocking(move || Self::cluster_path(&transactions, &clope, &patterns))
        };

        let (network, clusters) = tokio::join!(bounded(network, limit), bounded(clusters, limit));
        let report = AnalysisReport::assemble(network??, clusters?);

        info!(
            suspicious_accounts = report.suspicion.len(),
            reported_clusters = report.patterns.len(),
            "AML analysis complete"
        );
        Ok(report)
    }

    /// Flow graph, centrality, normalization, roles and suspicion.
    pub fn network_path(
        transactions: &[Transaction],
        config: &CentralityConfig,
    ) -> Result<NetworkFindings> {
        let started = Instant::now();

        let graph = FlowGraph::from_transactions(transactions)?;
        let measures = CentralityEngine::compute(&graph, config);
        let normalized = measures.normalize();
        let suspicion = SuspicionScorer::rank(&normalized);

        let findings = NetworkFindings {
            suspicion,
            graph_summary: graph.summary(),
            convergence: CentralityConvergence {
                pagerank: measures.pagerank_convergence,
                hits: measures.hits_convergence,
            },
        };

        info!(
            nodes = findings.graph_summary.nodes,
            edges = findings.graph_summary.edges,
            suspicious = findings.suspicion.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Network path finished"
        );
        Ok(findings)
    }

    /// CLOPE clustering followed by per-cluster pattern scoring.
    pub fn cluster_path(
        transactions: &[Transaction],
        clope: &ClopeConfig,
        patterns: &PatternConfig,
    ) -> ClusterFindings {
        let started = Instant::now();

        let clustering = Clope::with_config(clope.clone()).fit_transactions(transactions);
        if !clustering.converged {
            warn!(
                iterations = clustering.iterations,
                "CLOPE stopped before a pass without moves"
            );
        }
        let reported = PatternDetector::compute(transactions, &clustering.clusters, patterns);

        let findings = ClusterFindings {
            patterns: reported,
            overview: ClusteringOverview {
                clusters: clustering.cluster_count(),
                iterations: clustering.iterations,
                converged: clustering.converged,
                profit: clustering.profit,
            },
        };

        info!(
            clusters = findings.overview.clusters,
            reported = findings.patterns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cluster path finished"
        );
        findings
    }
}

/// Await a blocking task, giving up after `limit`.
async fn bounded<T>(task: JoinHandle<T>, limit: Option<Duration>) -> Result<T> {
    let joined = match limit {
        Some(limit) => tokio::time::timeout(limit, task)
            .await
            .map_err(|_| KernelError::Timeout(limit))?,
        None => task.await,
    };
    joined.map_err(|e| KernelError::internal(format!("analysis task failed: {}", e)))
}
