//! Simple cycle enumeration.
//!
//! Circular money flow shows up as directed cycles in a flow graph. This
//! module enumerates every elementary cycle with Johnson's algorithm, or with
//! a bounded depth-first search when a length cap is given.

use crate::types::FlowGraph;
use amlkernel_core::{domain::Domain, kernel::KernelMetadata, traits::AnalyticsKernel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// How a cycle enumeration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    /// Every cycle was visited.
    Complete,
    /// The visitor asked to stop.
    Stopped,
    /// The step budget ran out.
    Exhausted,
}

/// Cycle statistics of one graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Number of elementary cycles found.
    pub cycle_count: usize,
    /// Node count of the longest cycle (0 when acyclic).
    pub max_cycle_length: usize,
    /// Sum of weights over distinct edges lying on at least one cycle.
    pub total_cycle_amount: f64,
}

impl CycleSummary {
    /// Fold one cycle into the summary.
    ///
    /// `seen` holds the edges already counted, so shared edges add their
    /// weight once.
    pub fn record(
        &mut self,
        graph: &FlowGraph,
        cycle: &[usize],
        seen: &mut BTreeSet<(usize, usize)>,
    ) {
        self.cycle_count += 1;
        self.max_cycle_length = self.max_cycle_length.max(cycle.len());
        for (i, &u) in cycle.iter().enumerate() {
            let v = cycle[(i + 1) % cycle.len()];
            if seen.insert((u, v)) {
                self.total_cycle_amount += graph.edge(u, v).map_or(0.0, |flow| flow.weight);
            }
        }
    }
}

// ============================================================================
// Simple Cycles Kernel
// ============================================================================

/// Elementary cycle enumeration kernel.
///
/// Each cycle is reported once, as node indices starting at its smallest
/// index and following edge direction.
#[derive(Debug, Clone)]
pub struct SimpleCycles {
    metadata: KernelMetadata,
}

impl Default for SimpleCycles {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleCycles {
    /// Create a new simple cycles kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/simple-cycles", Domain::GraphAnalytics)
                .with_description("Elementary cycle enumeration (Johnson)")
                .with_throughput(5_000)
                .with_latency_us(500.0),
        }
    }

    /// Enumerate elementary cycles.
    ///
    /// `max_length` caps the node count of reported cycles; `None` enumerates
    /// all of them.
    pub fn compute(graph: &FlowGraph, max_length: Option<usize>) -> Vec<Vec<usize>> {
        let mut cycles = Vec::new();
        Self::visit(graph, max_length, None, |cycle| {
            cycles.push(cycle.to_vec());
            ControlFlow::Continue(())
        });
        cycles
    }

    /// Stream elementary cycles to `on_cycle` until it breaks.
    ///
    /// `step_budget` bounds the number of search steps; once spent the
    /// enumeration ends with [`Enumeration::Exhausted`].
    pub fn visit<F>(
        graph: &FlowGraph,
        max_length: Option<usize>,
        step_budget: Option<usize>,
        mut on_cycle: F,
    ) -> Enumeration
    where
        F: FnMut(&[usize]) -> ControlFlow<()>,
    {
        let n = graph.node_count();
        let adjacency: Vec<Vec<usize>> = (0..n)
            .map(|v| graph.out_edges(v).map(|e| e.target).collect())
            .collect();
        let reverse: Vec<Vec<usize>> = (0..n)
            .map(|v| graph.in_edges(v).map(|e| e.source).collect())
            .collect();

        let mut search = CycleSearch {
            adjacency: &adjacency,
            component: Vec::new(),
            start: 0,
            stack: Vec::new(),
            blocked: vec![false; n],
            block_map: vec![BTreeSet::new(); n],
            on_cycle: &mut on_cycle,
            steps_left: step_budget.unwrap_or(usize::MAX),
            halted: None,
        };

        for start in 0..n {
            let component = component_of(&adjacency, &reverse, start);
            let has_cycle = component.iter().filter(|&&c| c).count() > 1
                || adjacency[start].contains(&start);
            if !has_cycle {
                continue;
            }

            search.reset(start, component);
            match max_length {
                Some(limit) if limit > 0 => search.bounded(start, limit),
                _ => {
                    search.circuit(start);
                }
            }
            if let Some(outcome) = search.halted {
                return outcome;
            }
        }
        Enumeration::Complete
    }

    /// Summarize cycles against the graph's edge weights.
    pub fn summarize(graph: &FlowGraph, cycles: &[Vec<usize>]) -> CycleSummary {
        let mut summary = CycleSummary::default();
        let mut seen = BTreeSet::new();
        for cycle in cycles {
            summary.record(graph, cycle, &mut seen);
        }
        summary
    }
}

impl AnalyticsKernel for SimpleCycles {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

/// Strongly connected component of `start` in the subgraph of nodes `>= start`.
fn component_of(adjacency: &[Vec<usize>], reverse: &[Vec<usize>], start: usize) -> Vec<bool> {
    let reach = |edges: &[Vec<usize>]| {
        let mut seen = vec![false; edges.len()];
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(v) = stack.pop() {
            for &w in &edges[v] {
                if w >= start && !seen[w] {
                    seen[w] = true;
                    stack.push(w);
                }
            }
        }
        seen
    };

    let forward = reach(adjacency);
    let backward = reach(reverse);
    forward
        .iter()
        .zip(&backward)
        .map(|(&f, &b)| f && b)
        .collect()
}

struct CycleSearch<'a> {
    adjacency: &'a [Vec<usize>],
    component: Vec<bool>,
    start: usize,
    stack: Vec<usize>,
    blocked: Vec<bool>,
    block_map: Vec<BTreeSet<usize>>,
    on_cycle: &'a mut dyn FnMut(&[usize]) -> ControlFlow<()>,
    steps_left: usize,
    halted: Option<Enumeration>,
}

impl CycleSearch<'_> {
    fn reset(&mut self, start: usize, component: Vec<bool>) {
        self.start = start;
        self.component = component;
        self.stack.clear();
        self.blocked.fill(false);
        self.block_map.iter_mut().for_each(BTreeSet::clear);
    }

    fn successors(&self, v: usize) -> Vec<usize> {
        self.adjacency[v]
            .iter()
            .copied()
            .filter(|&w| self.component[w])
            .collect()
    }

    /// Spend one search step; false once the search has halted.
    fn step(&mut self) -> bool {
        if self.halted.is_some() {
            return false;
        }
        if self.steps_left == 0 {
            self.halted = Some(Enumeration::Exhausted);
            return false;
        }
        self.steps_left -= 1;
        true
    }

    fn emit(&mut self) {
        if (self.on_cycle)(&self.stack).is_break() {
            self.halted = Some(Enumeration::Stopped);
        }
    }

    /// Johnson's CIRCUIT procedure.
    fn circuit(&mut self, v: usize) -> bool {
        if !self.step() {
            return false;
        }
        let mut found = false;
        self.stack.push(v);
        self.blocked[v] = true;

        let successors = self.successors(v);
        for &w in &successors {
            if self.halted.is_some() {
                break;
            }
            if w == self.start {
                self.emit();
                found = true;
            } else if !self.blocked[w] && self.circuit(w) {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for &w in &successors {
                self.block_map[w].insert(v);
            }
        }

        self.stack.pop();
        found
    }

    fn unblock(&mut self, v: usize) {
        self.blocked[v] = false;
        let pending = std::mem::take(&mut self.block_map[v]);
        for w in pending {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }

    /// Depth-limited search; blocking is unsound under a length cap.
    fn bounded(&mut self, v: usize, limit: usize) {
        if !self.step() {
            return;
        }
        self.stack.push(v);
        self.blocked[v] = true;

        for w in self.successors(v) {
            if self.halted.is_some() {
                break;
            }
            if w == self.start {
                self.emit();
            } else if !self.blocked[w] && self.stack.len() < limit {
                self.bounded(w, limit);
            }
        }

        self.blocked[v] = false;
        self.stack.pop();
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

    fn create_cycle_graph() -> FlowGraph {
        graph_of(&[
            ("A", "B", 1000.0),
            ("B", "C", 2000.0),
            ("C", "A", 1500.0),
            ("D", "E", 500.0),
            ("D", "E", 500.0),
        ])
    }

    #[test]
    fn test_triangle_detected_once() {
        let graph = create_cycle_graph();
        let cycles = SimpleCycles::compute(&graph, None);
        assert_eq!(cycles, vec![vec![0, 1, 2]]);

        let summary = SimpleCycles::summarize(&graph, &cycles);
        assert_eq!(summary.cycle_count, 1);
        assert_eq!(summary.max_cycle_length, 3);
        assert!((summary.total_cycle_amount - 4500.0).abs() < 1e-9);
    }

    #[test]
    fn test_acyclic_graph() {
        let graph = graph_of(&[("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 1.0)]);
        assert!(SimpleCycles::compute(&graph, None).is_empty());
        assert_eq!(SimpleCycles::summarize(&graph, &[]), CycleSummary::default());
    }

    #[test]
    fn test_overlapping_cycles() {
        // A<->B plus A->B->C->A: two cycles sharing A->B.
        let graph = graph_of(&[
            ("A", "B", 10.0),
            ("B", "A", 20.0),
            ("B", "C", 30.0),
            ("C", "A", 40.0),
        ]);
        let mut cycles = SimpleCycles::compute(&graph, None);
        cycles.sort();
        assert_eq!(cycles, vec![vec![0, 1], vec![0, 1, 2]]);

        // Shared edge counted once.
        let summary = SimpleCycles::summarize(&graph, &cycles);
        assert!((summary.total_cycle_amount - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let graph = graph_of(&[("A", "A", 5.0), ("A", "B", 1.0)]);
        let cycles = SimpleCycles::compute(&graph, None);
        assert_eq!(cycles, vec![vec![0]]);
    }

    #[test]
    fn test_length_cap() {
        // 4-cycle plus a 2-cycle
        let graph = graph_of(&[
            ("A", "B", 1.0),
            ("B", "C", 1.0),
            ("C", "D", 1.0),
            ("D", "A", 1.0),
            ("C", "B", 1.0),
        ]);
        assert_eq!(SimpleCycles::compute(&graph, None).len(), 2);

        let capped = SimpleCycles::compute(&graph, Some(3));
        assert_eq!(capped, vec![vec![1, 2]]);

        // Unbounded and a generous cap agree.
        let mut all = SimpleCycles::compute(&graph, None);
        let mut generous = SimpleCycles::compute(&graph, Some(10));
        all.sort();
        generous.sort();
        assert_eq!(all, generous);
    }

    #[test]
    fn test_complete_graph_cycle_count() {
        // K4 directed complete graph has 20 elementary cycles.
        let names = ["A", "B", "C", "D"];
        let mut edges = Vec::new();
        for u in names {
            for v in names {
                if u != v {
                    edges.push((u, v, 1.0));
                }
            }
        }
        let graph = graph_of(&edges);
        assert_eq!(SimpleCycles::compute(&graph, None).len(), 20);
        assert_eq!(SimpleCycles::compute(&graph, Some(0)).len(), 20);
    }

    fn create_complete_graph(size: usize) -> FlowGraph {
        let names: Vec<String> = (0..size).map(|i| format!("N{}", i)).collect();
        let mut edges = Vec::new();
        for u in &names {
            for v in &names {
                if u != v {
                    edges.push((u.as_str(), v.as_str(), 1.0));
                }
            }
        }
        graph_of(&edges)
    }

    #[test]
    fn test_visit_stops_on_break() {
        let graph = create_complete_graph(14);
        let mut seen = 0;
        let outcome = SimpleCycles::visit(&graph, None, None, |_| {
            seen += 1;
            if seen == 100 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(outcome, Enumeration::Stopped);
        assert_eq!(seen, 100);
    }

    #[test]
    fn test_visit_step_budget() {
        let graph = create_complete_graph(14);
        let mut seen = 0;
        let outcome = SimpleCycles::visit(&graph, None, Some(1_000), |_| {
            seen += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(outcome, Enumeration::Exhausted);
        assert!(seen > 0);

        let capped =
            SimpleCycles::visit(&graph, Some(12), Some(1_000), |_| ControlFlow::Continue(()));
        assert_eq!(capped, Enumeration::Exhausted);
    }

    #[test]
    fn test_visit_completes_small_graph() {
        let graph = create_cycle_graph();
        let outcome = SimpleCycles::visit(&graph, None, Some(1_000), |cycle| {
            assert_eq!(cycle, &[0, 1, 2]);
            ControlFlow::Continue(())
        });
        assert_eq!(outcome, Enumeration::Complete);
    }
}
