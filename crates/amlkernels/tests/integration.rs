//! Integration tests for AmlKernels
//!
//! These tests drive the public API from raw ledger records to the final
//! report.

use amlkernels::compliance::patterns::PatternDetector;
use amlkernels::graph::centrality::CentralityEngine;
use amlkernels::graph::types::FlowGraph;
use amlkernels::ml::clope::ClusterSummary;
use amlkernels::prelude::*;

fn create_scenario_json() -> &'static str {
    r#"[
        {"Sender_account": "A", "Receiver_account": "B", "Amount": "1000", "Date": "2022-10-07", "Time": "10:35:19"},
        {"Sender_account": "B", "Receiver_account": "C", "Amount": "2000", "Date": "2022-10-07", "Time": "10:36:00"},
        {"Sender_account": "C", "Receiver_account": "A", "Amount": "1500", "Date": "2022-10-07", "Time": "11:02:41"},
        {"Sender_account": "D", "Receiver_account": "E", "Amount": "500", "Date": "2022-10-08", "Time": "09:00:00"},
        {"Sender_account": "D", "Receiver_account": "E", "Amount": "500", "Date": "2022-10-08", "Time": "09:05:00"}
    ]"#
}

fn load_scenario() -> TransactionTable {
    let raw = RawTable::from_json(create_scenario_json()).expect("records should parse");
    TransactionTable::from_raw(&raw).expect("records should validate")
}

// ============================================================================
// Catalog and Registry Tests
// ============================================================================

#[test]
fn test_catalog_domains() {
    let domains = amlkernels::catalog::domains();
    let features: Vec<&str> = domains.iter().map(|d| d.feature).collect();
    assert_eq!(features, vec!["ledger", "graph", "ml", "compliance"]);
}

#[test]
fn test_registry_counts() {
    let registry = KernelRegistry::new();
    amlkernels::register_all(&registry).expect("registration should succeed");

    let stats = registry.stats();
    assert_eq!(stats.total, 13);
    assert_eq!(stats.iterative_kernels, 3, "PageRank, HITS and CLOPE iterate");
    assert_eq!(stats.batch_kernels, 10);

    for id in [
        "ledger/validation",
        "graph/centrality-engine",
        "ml/clope",
        "compliance/suspicion-score",
        "compliance/cluster-patterns",
    ] {
        assert!(registry.contains(id), "missing kernel {}", id);
    }
}

#[test]
fn test_double_registration_fails() {
    let registry = KernelRegistry::new();
    amlkernels::register_all(&registry).unwrap();
    assert!(amlkernels::register_all(&registry).is_err());
}

// ============================================================================
// Ingestion Tests
// ============================================================================

#[test]
fn test_missing_columns_reported() {
    let raw = RawTable::from_json(r#"[{"Sender_account": "A", "Amount": "10"}]"#).unwrap();
    match TransactionTable::from_raw(&raw) {
        Err(KernelError::MissingColumns { missing }) => {
            assert_eq!(missing, vec!["Receiver_account".to_string()]);
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn test_empty_account_rejected() {
    let raw = RawTable::from_json(
        r#"[{"Sender_account": " ", "Receiver_account": "B", "Amount": "10"}]"#,
    )
    .unwrap();
    assert!(matches!(
        TransactionTable::from_raw(&raw),
        Err(KernelError::MissingAccountIdentifier { row: 0, .. })
    ));
}

// ============================================================================
// End-to-End Scenario
// ============================================================================

#[test]
fn test_scenario_graph_merges_parallel_edges() {
    let table = load_scenario();
    let graph = FlowGraph::from_transactions(table.transactions()).unwrap();

    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 4);

    let d = graph.index_of("D").unwrap();
    let e = graph.index_of("E").unwrap();
    let flow = graph.edge(d, e).expect("D->E edge");
    assert!((flow.weight - 1000.0).abs() < 1e-9);
    assert_eq!(flow.count, 2);
}

#[test]
fn test_scenario_cycle_scored() {
    let table = load_scenario();
    let whole = vec![ClusterSummary {
        id: 0,
        size: table.len(),
        width: 0,
        occurrences: 0,
        profit: 0.0,
        transaction_ids: (0..table.len()).collect(),
    }];
    let config = PatternConfig {
        report_threshold: 0.3,
        ..Default::default()
    };

    let results = PatternDetector::compute(table.transactions(), &whole, &config);
    assert_eq!(results.len(), 1);
    // min(1, 3/10 + 4500/100000)
    assert!(
        (results[0].circular_score - 0.345).abs() < 1e-9,
        "got {}",
        results[0].circular_score
    );

    let strict = PatternDetector::compute(table.transactions(), &whole, &PatternConfig::default());
    assert!(strict.is_empty(), "0.345 is below the default threshold");
}

#[test]
fn test_scenario_report() {
    let table = load_scenario();
    let config = AnalysisConfig::default();
    let report = AmlAnalysis::new(config.clone()).run(&table).unwrap();

    assert_eq!(report.graph_summary.nodes, 5);
    assert_eq!(report.graph_summary.edges, 4);
    assert!((report.graph_summary.total_flow - 5500.0).abs() < 1e-9);

    for pair in report.suspicion.windows(2) {
        assert!(pair[0].suspicion_score >= pair[1].suspicion_score);
    }
    for record in &report.suspicion {
        assert!(record.suspicion_score > 0.0 && record.suspicion_score <= 1.0);
    }
    for pattern in &report.patterns {
        assert!(pattern.size >= config.patterns.min_cluster_size);
        assert!(pattern.max_score() > config.patterns.report_threshold);
    }
}

fn create_broker_table() -> TransactionTable {
    // Every payment from the A group to the B group passes through M.
    let mut transactions = Vec::new();
    for a in ["A1", "A2", "A3"] {
        transactions.push(Transaction::new(transactions.len(), a, "M", 5_000.0));
    }
    for b in ["B1", "B2", "B3"] {
        transactions.push(Transaction::new(transactions.len(), "M", b, 5_000.0));
    }
    TransactionTable::from_transactions(transactions)
}

#[test]
fn test_broker_ranked_as_central_hub() {
    let table = create_broker_table();
    let report = AmlAnalysis::default().run(&table).unwrap();

    let top = report.suspicion.first().expect("broker should be flagged");
    assert_eq!(top.account_id, "M");
    assert_eq!(top.role, Role::CentralHub);
    assert!(top.betweenness > 0.0);
    assert!(top.suspicion_score >= 0.5, "got {}", top.suspicion_score);

    for record in &report.suspicion[1..] {
        assert_ne!(record.role, Role::CentralHub);
    }
}

#[test]
fn test_broker_betweenness_counts_every_crossing_path() {
    let table = create_broker_table();
    let graph = FlowGraph::from_transactions(table.transactions()).unwrap();
    let measures = CentralityEngine::compute(&graph, &AnalysisConfig::default().centrality);

    // Three senders times three receivers
    let broker = measures.for_account("M").unwrap();
    assert!((broker.betweenness - 9.0).abs() < 1e-9, "got {}", broker.betweenness);
    assert!(broker.closeness > 0.0);
    for account in ["A1", "B3"] {
        assert_eq!(measures.for_account(account).unwrap().betweenness, 0.0);
    }
}

#[test]
fn test_report_serializes_to_json() {
    let report = AmlAnalysis::default().run(&load_scenario()).unwrap();
    let json = report.to_json().unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["graph_summary"]["nodes"], 5);
    assert!(value["suspicion"].is_array());
    assert!(value["patterns"].is_array());
    assert!(value["cluster_summary"]["clusters"].as_u64().unwrap() >= 1);
    assert!(value["convergence"]["pagerank"]["converged"].is_boolean());
}

#[tokio::test]
async fn test_async_pipeline() {
    let config = AnalysisConfig {
        timeout_secs: Some(60),
        ..Default::default()
    };
    let report = AmlAnalysis::new(config)
        .run_with_timeout(&load_scenario())
        .await
        .unwrap();
    assert_eq!(report.graph_summary.nodes, 5);
}

#[test]
fn test_config_roundtrip_drives_analysis() {
    let text = AnalysisConfig::default().to_toml().unwrap();
    let config = AnalysisConfig::from_toml(&text).unwrap();
    config.validate().unwrap();
    assert!(AmlAnalysis::new(config).run(&load_scenario()).is_ok());
}
