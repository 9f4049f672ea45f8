//! Centrality measure kernels.
//!
//! This module provides the weighted network measures used for account
//! role analysis:
//! - Degree centrality (weighted in/out/total)
//! - Betweenness centrality (Brandes algorithm over Dijkstra)
//! - Closeness centrality (weight read as distance)
//! - PageRank (power iteration with dangling mass redistribution)
//! - HITS hub/authority scores (power iteration)
//!
//! Closeness treats a large money flow as a long distance, so heavily used
//! corridors make accounts look *less* close. Consumers of the closeness
//! column should read it with that inversion in mind.

use crate::measures::{MeasureTable, NodeMeasures};
use crate::types::FlowGraph;
use amlkernel_core::{
    config::CentralityConfig,
    convergence::{ConvergenceSummary, IterativeState},
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, warn};

// ============================================================================
// Shortest paths
// ============================================================================

/// Min-heap entry for Dijkstra.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapNode {
    dist: f64,
    node: usize,
}

impl Eq for HeapNode {}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap; node index keeps pops deterministic on ties.
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn same_distance(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite() && (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Single-source shortest-path DAG.
struct ShortestPaths {
    /// Topological order of the DAG (non-decreasing distance).
    order: Vec<usize>,
    sigma: Vec<f64>,
    preds: Vec<Vec<usize>>,
}

/// Distances from `source`; unreachable nodes stay at infinity.
fn distances(graph: &FlowGraph, source: usize) -> Vec<f64> {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(HeapNode {
        dist: 0.0,
        node: source,
    });

    while let Some(HeapNode { dist: d, node: v }) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;

        for edge in graph.out_edges(v) {
            let w = edge.target;
            let candidate = d + edge.flow.weight;
            if candidate < dist[w] && !same_distance(candidate, dist[w]) {
                dist[w] = candidate;
                heap.push(HeapNode {
                    dist: candidate,
                    node: w,
                });
            }
        }
    }
    dist
}

fn dijkstra(graph: &FlowGraph, source: usize) -> ShortestPaths {
    let n = graph.node_count();
    let dist = distances(graph, source);

    // An edge is tight when it lies on some shortest path.
    let is_tight = |v: usize, w: usize, weight: f64| {
        v != w && w != source && same_distance(dist[v] + weight, dist[w])
    };

    let mut tight_in: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut pending = vec![0usize; n];
    for edge in graph.edges() {
        if is_tight(edge.source, edge.target, edge.flow.weight) {
            tight_in[edge.target].push(edge.source);
            pending[edge.target] += 1;
        }
    }

    let mut sigma = vec![0.0f64; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut ready = BinaryHeap::new();
    ready.push(HeapNode {
        dist: 0.0,
        node: source,
    });

    loop {
        let v = match ready.pop() {
            Some(HeapNode { node, .. }) => node,
            // Only a cycle of zero-weight edges stalls the order; enter it at
            // its closest, lowest-index node and drop the edges closing it.
            None => match (0..n)
                .filter(|&v| !placed[v] && dist[v].is_finite())
                .min_by(|&a, &b| dist[a].total_cmp(&dist[b]).then(a.cmp(&b)))
            {
                Some(v) => v,
                None => break,
            },
        };
        if placed[v] {
            continue;
        }
        placed[v] = true;
        order.push(v);

        if v == source {
            sigma[v] = 1.0;
        } else {
            preds[v] = tight_in[v].iter().copied().filter(|&p| placed[p]).collect();
            sigma[v] = preds[v].iter().map(|&p| sigma[p]).sum();
        }

        for edge in graph.out_edges(v) {
            let w = edge.target;
            if placed[w] || !is_tight(v, w, edge.flow.weight) {
                continue;
            }
            pending[w] -= 1;
            if pending[w] == 0 {
                ready.push(HeapNode {
                    dist: dist[w],
                    node: w,
                });
            }
        }
    }

    ShortestPaths {
        order,
        sigma,
        preds,
    }
}

// ============================================================================
// Degree Centrality Kernel
// ============================================================================

/// Weighted degree of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightedDegree {
    /// Sum of incoming edge weights.
    pub in_degree: f64,
    /// Sum of outgoing edge weights.
    pub out_degree: f64,
}

impl WeightedDegree {
    /// In plus out.
    pub fn total(&self) -> f64 {
        self.in_degree + self.out_degree
    }
}

/// Weighted degree centrality kernel.
#[derive(Debug, Clone)]
pub struct DegreeCentrality {
    metadata: KernelMetadata,
}

impl Default for DegreeCentrality {
    fn default() -> Self {
        Self::new()
    }
}

impl DegreeCentrality {
    /// Create a new degree centrality kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/degree-centrality", Domain::GraphAnalytics)
                .with_description("Weighted in/out/total degree")
                .with_throughput(1_000_000)
                .with_latency_us(1.0),
        }
    }

    /// Compute weighted degrees for all nodes.
    pub fn compute(graph: &FlowGraph) -> Vec<WeightedDegree> {
        let mut degrees = vec![WeightedDegree::default(); graph.node_count()];
        for edge in graph.edges() {
            degrees[edge.source].out_degree += edge.flow.weight;
            degrees[edge.target].in_degree += edge.flow.weight;
        }
        degrees
    }
}

impl AnalyticsKernel for DegreeCentrality {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

// ============================================================================
// Betweenness Centrality Kernel (Brandes Algorithm)
// ============================================================================

/// Betweenness centrality kernel.
///
/// Uses Brandes algorithm with Dijkstra in O(VE + V² log V) time. Values are
/// raw (unnormalised) directed betweenness.
#[derive(Debug, Clone)]
pub struct BetweennessCentrality {
    metadata: KernelMetadata,
}

impl Default for BetweennessCentrality {
    fn default() -> Self {
        Self::new()
    }
}

impl BetweennessCentrality {
    /// Create a new betweenness centrality kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/betweenness-centrality", Domain::GraphAnalytics)
                .with_description("Weighted betweenness centrality (Brandes algorithm)")
                .with_throughput(10_000)
                .with_latency_us(100.0),
        }
    }

    /// Compute betweenness centrality for all nodes.
    pub fn compute(graph: &FlowGraph) -> Vec<f64> {
        let n = graph.node_count();

        #[cfg(feature = "parallel")]
        let partials: Vec<Vec<f64>> = {
            use rayon::prelude::*;
            (0..n)
                .into_par_iter()
                .map(|s| Self::dependencies_from(graph, s))
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let partials = (0..n).map(|s| Self::dependencies_from(graph, s));

        // Reduce in source order so both paths sum identically.
        let mut centrality = vec![0.0f64; n];
        for partial in partials {
            for (c, d) in centrality.iter_mut().zip(partial) {
                *c += d;
            }
        }
        centrality
    }

    /// Dependency of `source` on every other node.
    fn dependencies_from(graph: &FlowGraph, source: usize) -> Vec<f64> {
        let n = graph.node_count();
        let paths = dijkstra(graph, source);
        let mut delta = vec![0.0f64; n];
        let mut contribution = vec![0.0f64; n];

        // Backward pass - accumulate dependencies
        for &w in paths.order.iter().rev() {
            for &v in &paths.preds[w] {
                delta[v] += (paths.sigma[v] / paths.sigma[w]) * (1.0 + delta[w]);
            }
            if w != source {
                contribution[w] = delta[w];
            }
        }
        contribution
    }
}

impl AnalyticsKernel for BetweennessCentrality {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

// ============================================================================
// Closeness Centrality Kernel
// ============================================================================

/// Closeness centrality kernel.
///
/// `reachable / sum(distance)` over the nodes reachable from each node, with
/// edge weight as distance. Nodes that reach nothing score 0.
#[derive(Debug, Clone)]
pub struct ClosenessCentrality {
    metadata: KernelMetadata,
}

impl Default for ClosenessCentrality {
    fn default() -> Self {
        Self::new()
    }
}

impl ClosenessCentrality {
    /// Create a new closeness centrality kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/closeness-centrality", Domain::GraphAnalytics)
                .with_description("Weighted closeness centrality")
                .with_throughput(10_000)
                .with_latency_us(100.0),
        }
    }

    /// Compute closeness centrality for all nodes.
    pub fn compute(graph: &FlowGraph) -> Vec<f64> {
        let closeness_from = |s: usize| {
            let (reachable, total) = distances(graph, s)
                .iter()
                .enumerate()
                .filter(|&(v, d)| v != s && d.is_finite())
                .fold((0usize, 0.0f64), |(r, t), (_, d)| (r + 1, t + d));

            if reachable == 0 || total <= 0.0 {
                0.0
            } else {
                reachable as f64 / total
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..graph.node_count())
                .into_par_iter()
                .map(closeness_from)
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            (0..graph.node_count()).map(closeness_from).collect()
        }
    }
}

impl AnalyticsKernel for ClosenessCentrality {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

// ============================================================================
// PageRank Kernel
// ============================================================================

/// PageRank centrality kernel.
///
/// Each node passes rank to its successors in proportion to edge weight.
/// Rank held by nodes without outgoing flow is spread uniformly.
#[derive(Debug, Clone)]
pub struct PageRank {
    metadata: KernelMetadata,
}

impl Default for PageRank {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRank {
    /// Create a new PageRank kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::iterative("graph/pagerank", Domain::GraphAnalytics)
                .with_description("Weighted PageRank via power iteration")
                .with_throughput(100_000)
                .with_latency_us(10.0),
        }
    }

    /// Run power iteration to a fixed point or the iteration cap.
    pub fn compute(
        graph: &FlowGraph,
        damping: f64,
        max_iterations: u32,
        tolerance: f64,
    ) -> (Vec<f64>, ConvergenceSummary) {
        let n = graph.node_count();
        if n == 0 {
            return (Vec::new(), ConvergenceSummary::trivial());
        }

        let nf = n as f64;
        let out_weight: Vec<f64> = DegreeCentrality::compute(graph)
            .iter()
            .map(|d| d.out_degree)
            .collect();

        let mut scores = vec![1.0 / nf; n];
        let mut state = IterativeState::new(tolerance, u64::from(max_iterations));

        while state.should_continue() {
            let dangling: f64 = (0..n)
                .filter(|&u| out_weight[u] <= 0.0)
                .map(|u| scores[u])
                .sum();

            let base = (1.0 - damping) / nf + damping * dangling / nf;
            let mut next = vec![base; n];

            for edge in graph.edges() {
                let share = edge.flow.weight / out_weight[edge.source];
                if share.is_finite() {
                    next[edge.target] += damping * scores[edge.source] * share;
                }
            }

            let delta = max_abs_diff(&scores, &next);
            scores = next;
            state.update(delta);
        }

        let summary = state.summary();
        if !summary.converged {
            warn!(
                iterations = summary.iterations,
                final_delta = summary.final_delta,
                "PageRank stopped at the iteration cap without converging"
            );
        }
        (scores, summary)
    }
}

impl AnalyticsKernel for PageRank {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

// ============================================================================
// HITS Kernel
// ============================================================================

/// HITS scores of every node.
#[derive(Debug, Clone, Default)]
pub struct HitsScores {
    /// Hub score per node.
    pub hubs: Vec<f64>,
    /// Authority score per node.
    pub authorities: Vec<f64>,
    /// Iteration outcome.
    pub convergence: ConvergenceSummary,
}

/// HITS hub/authority kernel.
#[derive(Debug, Clone)]
pub struct HitsCentrality {
    metadata: KernelMetadata,
}

impl Default for HitsCentrality {
    fn default() -> Self {
        Self::new()
    }
}

impl HitsCentrality {
    /// Create a new HITS kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::iterative("graph/hits", Domain::GraphAnalytics)
                .with_description("Weighted HITS hub and authority scores")
                .with_throughput(100_000)
                .with_latency_us(10.0),
        }
    }

    /// Alternate authority and hub updates, L2-normalising each step.
    pub fn compute(graph: &FlowGraph, max_iterations: u32, tolerance: f64) -> HitsScores {
        let n = graph.node_count();
        if n == 0 {
            return HitsScores {
                convergence: ConvergenceSummary::trivial(),
                ..Default::default()
            };
        }

        let init = 1.0 / (n as f64).sqrt();
        let mut hubs = vec![init; n];
        let mut authorities = vec![init; n];
        let mut state = IterativeState::new(tolerance, u64::from(max_iterations));

        while state.should_continue() {
            let mut next_auth = vec![0.0f64; n];
            for edge in graph.edges() {
                next_auth[edge.target] += edge.flow.weight * hubs[edge.source];
            }
            l2_normalize(&mut next_auth);

            let mut next_hub = vec![0.0f64; n];
            for edge in graph.edges() {
                next_hub[edge.source] += edge.flow.weight * next_auth[edge.target];
            }
            l2_normalize(&mut next_hub);

            let delta = max_abs_diff(&authorities, &next_auth).max(max_abs_diff(&hubs, &next_hub));
            authorities = next_auth;
            hubs = next_hub;
            state.update(delta);
        }

        let convergence = state.summary();
        if !convergence.converged {
            warn!(
                iterations = convergence.iterations,
                final_delta = convergence.final_delta,
                "HITS stopped at the iteration cap without converging"
            );
        }

        HitsScores {
            hubs,
            authorities,
            convergence,
        }
    }
}

impl AnalyticsKernel for HitsCentrality {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

fn l2_normalize(values: &mut [f64]) {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

// ============================================================================
// Centrality Engine
// ============================================================================

/// Computes every measure of a graph into one `MeasureTable`.
#[derive(Debug, Clone)]
pub struct CentralityEngine {
    metadata: KernelMetadata,
    config: CentralityConfig,
}

impl Default for CentralityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CentralityEngine {
    /// Create a new centrality engine with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CentralityConfig::default())
    }

    /// Create a centrality engine with explicit parameters.
    #[must_use]
    pub fn with_config(config: CentralityConfig) -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/centrality-engine", Domain::GraphAnalytics)
                .with_description("All eight account measures in one pass")
                .with_throughput(5_000)
                .with_latency_us(500.0),
            config,
        }
    }

    /// Compute the full measure table.
    pub fn compute(graph: &FlowGraph, config: &CentralityConfig) -> MeasureTable {
        let degrees = DegreeCentrality::compute(graph);
        let betweenness = BetweennessCentrality::compute(graph);
        let closeness = ClosenessCentrality::compute(graph);
        let (pagerank, pagerank_convergence) = PageRank::compute(
            graph,
            config.damping,
            config.max_iterations,
            config.tolerance,
        );
        let hits = HitsCentrality::compute(graph, config.max_iterations, config.tolerance);

        let rows = (0..graph.node_count())
            .map(|i| NodeMeasures {
                in_degree: degrees[i].in_degree,
                out_degree: degrees[i].out_degree,
                total_degree: degrees[i].total(),
                betweenness: betweenness[i],
                closeness: closeness[i],
                pagerank: pagerank[i],
                hub_score: hits.hubs[i],
                authority_score: hits.authorities[i],
            })
            .collect();

        let mut table = MeasureTable::new(graph.nodes().to_vec(), rows);
        table.pagerank_convergence = pagerank_convergence;
        table.hits_convergence = hits.convergence;

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            pagerank_iterations = pagerank_convergence.iterations,
            hits_iterations = hits.convergence.iterations,
            "Computed centrality measures"
        );
        table
    }
}

impl AnalyticsKernel for CentralityEngine {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }

    fn validate(&self) -> Result<()> {
        let c = &self.config;
        if !(c.damping > 0.0 && c.damping < 1.0) {
            return Err(amlkernel_core::error::KernelError::validation(
                "damping must be in (0, 1)",
            ));
        }
        if c.max_iterations == 0 {
            return Err(amlkernel_core::error::KernelError::validation(
                "max_iterations must be positive",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BatchKernel<FlowGraph, MeasureTable> for CentralityEngine {
    async fn execute(&self, input: FlowGraph) -> Result<MeasureTable> {
        self.validate()?;
        Ok(Self::compute(&input, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlkernel_ledger::types::Transaction;

    fn graph_of(edges: &[(&str, &str, f64)]) -> FlowGraph {
        let txs: Vec<Transaction> = edges
            .iter()
            .enumerate()
            .map(|(i, (s, r, a))| Transaction::new(i, *s, *r, *a))
            .collect();
        FlowGraph::from_transactions(&txs).unwrap()
    }

    fn create_chain_graph() -> FlowGraph {
        // A -> B -> C -> D
        graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0)])
    }

    fn create_fan_in_graph() -> FlowGraph {
        graph_of(&[
            ("S1", "HUB", 100.0),
            ("S2", "HUB", 200.0),
            ("S3", "HUB", 300.0),
        ])
    }

    #[test]
    fn test_weighted_degree() {
        let graph = create_fan_in_graph();
        let degrees = DegreeCentrality::compute(&graph);
        let hub = graph.index_of("HUB").unwrap();

        assert!((degrees[hub].in_degree - 600.0).abs() < 1e-9);
        assert_eq!(degrees[hub].out_degree, 0.0);
        assert!((degrees[0].total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_chain() {
        let graph = create_chain_graph();
        let bc = BetweennessCentrality::compute(&graph);

        // B lies on A->C, A->D; C lies on A->D, B->D.
        assert_eq!(bc, vec![0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_betweenness_prefers_light_path() {
        // A->B->C costs 2, A->C costs 10: B carries the A->C path.
        let graph = graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 10.0)]);
        let bc = BetweennessCentrality::compute(&graph);
        assert!((bc[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_splits_equal_paths() {
        // Two equal-cost routes A->X->D and A->Y->D.
        let graph = graph_of(&[
            ("A", "X", 1.0),
            ("A", "Y", 1.0),
            ("X", "D", 1.0),
            ("Y", "D", 1.0),
        ]);
        let bc = BetweennessCentrality::compute(&graph);
        let x = graph.index_of("X").unwrap();
        let y = graph.index_of("Y").unwrap();
        assert!((bc[x] - 0.5).abs() < 1e-9);
        assert!((bc[y] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_betweenness_counts_zero_weight_detour() {
        // S->X->Y costs the same as S->Y once X->Y carries no value.
        let orders = [
            [("S", "Y", 1.0), ("S", "X", 1.0), ("X", "Y", 0.0)],
            [("S", "X", 1.0), ("S", "Y", 1.0), ("X", "Y", 0.0)],
        ];
        for edges in orders {
            let graph = graph_of(&edges);
            let bc = BetweennessCentrality::compute(&graph);
            let x = graph.index_of("X").unwrap();
            let y = graph.index_of("Y").unwrap();
            assert!((bc[x] - 0.5).abs() < 1e-9, "got {:?} for {:?}", bc, graph.nodes());
            assert_eq!(bc[y], 0.0);
        }
    }

    #[test]
    fn test_betweenness_zero_weight_cycle() {
        // A and B are mutually reachable at no cost.
        let graph = graph_of(&[
            ("S", "A", 1.0),
            ("A", "B", 0.0),
            ("B", "A", 0.0),
            ("B", "T", 1.0),
        ]);
        let bc = BetweennessCentrality::compute(&graph);
        assert!(bc.iter().all(|c| c.is_finite()));
        let b = graph.index_of("B").unwrap();
        assert!(bc[b] >= 2.0);
    }

    #[test]
    fn test_shortest_paths_reach_whole_chain() {
        let graph = create_chain_graph();
        let dist = distances(&graph, 0);
        assert_eq!(dist, vec![0.0, 1.0, 2.0, 3.0]);
        assert!(!same_distance(1.0, f64::INFINITY));

        let paths = dijkstra(&graph, 0);
        assert_eq!(paths.order, vec![0, 1, 2, 3]);
        assert_eq!(paths.sigma, vec![1.0; 4]);
    }

    #[test]
    fn test_closeness_uses_weight_as_distance() {
        let graph = create_chain_graph();
        let cc = ClosenessCentrality::compute(&graph);

        // A reaches B, C, D at 1, 2, 3.
        assert!((cc[0] - 3.0 / 6.0).abs() < 1e-9);
        // D reaches nothing.
        assert_eq!(cc[3], 0.0);

        let heavy = graph_of(&[("A", "B", 1000.0)]);
        let light = graph_of(&[("A", "B", 1.0)]);
        assert!(ClosenessCentrality::compute(&heavy)[0] < ClosenessCentrality::compute(&light)[0]);
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        let graph = create_fan_in_graph();
        let (scores, summary) = PageRank::compute(&graph, 0.85, 100, 1e-9);

        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "PageRank mass should be conserved, got {}", total);

        let hub = graph.index_of("HUB").unwrap();
        let max = scores.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(scores[hub], max);
        assert!(summary.converged);
    }

    #[test]
    fn test_pagerank_reports_cap() {
        let graph = create_chain_graph();
        let (_, summary) = PageRank::compute(&graph, 0.85, 1, 1e-12);
        assert!(!summary.converged);
        assert!(summary.reached_max);
        assert_eq!(summary.iterations, 1);
    }

    #[test]
    fn test_hits_hub_and_authority() {
        let graph = create_fan_in_graph();
        let hits = HitsCentrality::compute(&graph, 100, 1e-9);
        let hub = graph.index_of("HUB").unwrap();

        // The receiver is the only authority; senders are hubs.
        assert!((hits.authorities[hub] - 1.0).abs() < 1e-9);
        assert_eq!(hits.hubs[hub], 0.0);
        assert!(hits.hubs[2] > hits.hubs[0]);
        assert!(hits.convergence.converged);
    }

    #[test]
    fn test_single_node_graph() {
        let graph = graph_of(&[("A", "A", 5.0)]);
        let table = CentralityEngine::compute(&graph, &CentralityConfig::default());
        assert_eq!(table.len(), 1);
        let row = table.rows()[0];
        assert_eq!(row.betweenness, 0.0);
        assert_eq!(row.closeness, 0.0);
        assert!((row.pagerank - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_graph() {
        let table = CentralityEngine::compute(&FlowGraph::new(), &CentralityConfig::default());
        assert!(table.is_empty());
        assert!(table.pagerank_convergence.converged);
    }

    #[test]
    fn test_engine_deterministic() {
        let graph = graph_of(&[
            ("A", "B", 10.0),
            ("B", "C", 20.0),
            ("C", "A", 5.0),
            ("C", "D", 7.0),
        ]);
        let config = CentralityConfig::default();
        let first = CentralityEngine::compute(&graph, &config);
        let second = CentralityEngine::compute(&graph, &config);
        assert_eq!(first.rows(), second.rows());
    }

    #[tokio::test]
    async fn test_engine_kernel_execute() {
        let kernel = CentralityEngine::new();
        assert_eq!(kernel.id(), "graph/centrality-engine");

        let table = kernel.execute(create_chain_graph()).await.unwrap();
        assert_eq!(table.accounts(), &["A", "B", "C", "D"]);
    }
}
