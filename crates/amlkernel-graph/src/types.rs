//! Money-flow graph.

use amlkernel_core::error::{KernelError, Result};
use amlkernel_ledger::types::{Transaction, columns};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregated flow on one ordered account pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeFlow {
    /// Sum of transaction amounts.
    pub weight: f64,
    /// Number of merged transactions.
    pub count: u32,
}

/// A directed edge with its aggregated flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Source node index.
    pub source: usize,
    /// Target node index.
    pub target: usize,
    /// Aggregated flow.
    pub flow: EdgeFlow,
}

/// Directed weighted graph of money flow between accounts.
///
/// Nodes are account ids indexed in first-seen order. At most one edge
/// exists per ordered pair; repeated transactions are merged into it.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: Vec<String>,
    node_index: HashMap<String, usize>,
    edges: Vec<FlowEdge>,
    edge_index: HashMap<(usize, usize), usize>,
    out_adj: Vec<Vec<usize>>,
    in_adj: Vec<Vec<usize>>,
}

impl FlowGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from transactions in order.
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self> {
        let mut graph = Self::new();
        for tx in transactions {
            graph.add_transaction(tx)?;
        }
        Ok(graph)
    }

    /// Merge one transaction into the graph.
    pub fn add_transaction(&mut self, tx: &Transaction) -> Result<()> {
        if tx.sender_id.is_empty() {
            return Err(KernelError::missing_account(tx.id, columns::SENDER));
        }
        if tx.receiver_id.is_empty() {
            return Err(KernelError::missing_account(tx.id, columns::RECEIVER));
        }
        self.add_flow(&tx.sender_id, &tx.receiver_id, tx.amount);
        Ok(())
    }

    fn add_flow(&mut self, sender: &str, receiver: &str, amount: f64) {
        let u = self.intern(sender);
        let v = self.intern(receiver);

        match self.edge_index.get(&(u, v)) {
            Some(&e) => {
                let flow = &mut self.edges[e].flow;
                flow.weight += amount;
                flow.count += 1;
            }
            None => {
                let e = self.edges.len();
                self.edges.push(FlowEdge {
                    source: u,
                    target: v,
                    flow: EdgeFlow {
                        weight: amount,
                        count: 1,
                    },
                });
                self.edge_index.insert((u, v), e);
                self.out_adj[u].push(e);
                self.in_adj[v].push(e);
            }
        }
    }

    fn intern(&mut self, account: &str) -> usize {
        if let Some(&idx) = self.node_index.get(account) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(account.to_string());
        self.node_index.insert(account.to_string(), idx);
        self.out_adj.push(Vec::new());
        self.in_adj.push(Vec::new());
        idx
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Account ids in node order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Account id of a node.
    pub fn node_id(&self, idx: usize) -> Option<&str> {
        self.nodes.get(idx).map(String::as_str)
    }

    /// Node index of an account.
    pub fn index_of(&self, account: &str) -> Option<usize> {
        self.node_index.get(account).copied()
    }

    /// Flow on the edge `u -> v`, if any.
    pub fn edge(&self, u: usize, v: usize) -> Option<&EdgeFlow> {
        self.edge_index.get(&(u, v)).map(|&e| &self.edges[e].flow)
    }

    /// All edges in creation order.
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Outgoing edges of a node, in creation order.
    pub fn out_edges(&self, idx: usize) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.out_adj
            .get(idx)
            .into_iter()
            .flatten()
            .map(|&e| &self.edges[e])
    }

    /// Incoming edges of a node, in creation order.
    pub fn in_edges(&self, idx: usize) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.in_adj
            .get(idx)
            .into_iter()
            .flatten()
            .map(|&e| &self.edges[e])
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_flow(&self) -> f64 {
        self.edges.iter().map(|e| e.flow.weight).sum()
    }

    /// Summary counts for reporting.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            total_flow: self.total_flow(),
        }
    }
}

/// Size of a flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Number of accounts.
    pub nodes: usize,
    /// Number of distinct sender/receiver pairs.
    pub edges: usize,
    /// Sum of all amounts.
    pub total_flow: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_flow_transactions() -> Vec<Transaction> {
        vec![
            Transaction::new(0, "A", "B", 1000.0),
            Transaction::new(1, "B", "C", 2000.0),
            Transaction::new(2, "C", "A", 1500.0),
            Transaction::new(3, "D", "E", 500.0),
            Transaction::new(4, "D", "E", 500.0),
        ]
    }

    #[test]
    fn test_parallel_transactions_merge() {
        let graph = FlowGraph::from_transactions(&create_flow_transactions()).unwrap();

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);

        let d = graph.index_of("D").unwrap();
        let e = graph.index_of("E").unwrap();
        let flow = graph.edge(d, e).unwrap();
        assert!((flow.weight - 1000.0).abs() < 1e-9);
        assert_eq!(flow.count, 2);
    }

    #[test]
    fn test_first_seen_node_order() {
        let graph = FlowGraph::from_transactions(&create_flow_transactions()).unwrap();
        assert_eq!(graph.nodes(), &["A", "B", "C", "D", "E"]);
        assert_eq!(graph.node_id(2), Some("C"));
        assert!(graph.node_id(9).is_none());
    }

    #[test]
    fn test_adjacency() {
        let graph = FlowGraph::from_transactions(&create_flow_transactions()).unwrap();
        let a = graph.index_of("A").unwrap();
        let b = graph.index_of("B").unwrap();

        let out: Vec<usize> = graph.out_edges(a).map(|e| e.target).collect();
        assert_eq!(out, vec![b]);
        let incoming: Vec<usize> = graph.in_edges(b).map(|e| e.source).collect();
        assert_eq!(incoming, vec![a]);
        assert!(graph.edge(b, a).is_none());
        assert!((graph.total_flow() - 5500.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_account_rejected() {
        let mut graph = FlowGraph::new();
        let err = graph
            .add_transaction(&Transaction::new(7, "A", "", 10.0))
            .unwrap_err();
        assert!(matches!(err, KernelError::MissingAccountIdentifier { row: 7, .. }));
        assert!(graph.is_empty());
    }
}
