//! # AmlKernels
//!
//! Anti-money-laundering analytics over a ledger of transactions.
//!
//! Two detection paths share one validated transaction table:
//!
//! - **Network path**: the ledger becomes a directed money-flow graph; eight
//!   centrality measures are computed per account, min-max normalized, mapped
//!   to a role and combined into a bounded suspicion score.
//! - **Cluster path**: transactions become categorical item sets, CLOPE groups
//!   them, and each cluster is scored for circular flow, smurfing and
//!   integration.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use amlkernels::prelude::*;
//!
//! let raw = RawTable::from_json(&std::fs::read_to_string("ledger.json")?)?;
//! let table = TransactionTable::from_raw(&raw)?;
//!
//! let report = AmlAnalysis::new(AnalysisConfig::default()).run(&table)?;
//! for record in report.suspicion.iter().take(10) {
//!     println!("{} {:.2} {}", record.account_id, record.suspicion_score, record.role);
//! }
//! ```
//!
//! ## Domain Organization
//!
//! | Domain | Kernels | Description |
//! |--------|---------|-------------|
//! | Ledger | 1 | Column checks and typed transaction ingestion |
//! | GraphAnalytics | 8 | Degree, betweenness, closeness, PageRank, HITS, cycles |
//! | StatisticalML | 1 | CLOPE categorical clustering |
//! | Compliance | 3 | Roles, suspicion ranking, cluster patterns |
//!
//! ## Feature Flags
//!
//! - `parallel`: betweenness, closeness and per-cluster scoring on rayon

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pipeline;

pub use amlkernel_core as core;

pub use amlkernel_compliance as compliance;
pub use amlkernel_graph as graph;
pub use amlkernel_ledger as ledger;
pub use amlkernel_ml as ml;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use amlkernels::prelude::*;
/// ```
pub mod prelude {
    pub use amlkernel_core::prelude::*;

    pub use amlkernel_compliance::types::{ClusterPatternResult, Role, SuspicionRecord};
    pub use amlkernel_graph::types::{FlowGraph, GraphSummary};
    pub use amlkernel_ledger::table::{RawTable, TransactionTable};
    pub use amlkernel_ledger::types::Transaction;

    pub use crate::pipeline::{AmlAnalysis, AnalysisReport};
}

/// Version information.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Kernel catalog providing overview of all available kernels.
pub mod catalog {
    use amlkernel_core::domain::Domain;

    /// Domain information.
    #[derive(Debug, Clone)]
    pub struct DomainInfo {
        /// Domain enum value.
        pub domain: Domain,
        /// Human-readable name.
        pub name: &'static str,
        /// Description.
        pub description: &'static str,
        /// Number of kernels.
        pub kernel_count: usize,
        /// Short name used on the command line.
        pub feature: &'static str,
    }

    /// Get all domain information.
    pub fn domains() -> Vec<DomainInfo> {
        vec![
            DomainInfo {
                domain: Domain::Ledger,
                name: "Ledger",
                description: "Required-column checks and typed transaction ingestion",
                kernel_count: 1,
                feature: Domain::Ledger.feature(),
            },
            DomainInfo {
                domain: Domain::GraphAnalytics,
                name: "Graph Analytics",
                description: "Money-flow graph centrality, normalization and cycle enumeration",
                kernel_count: 8,
                feature: Domain::GraphAnalytics.feature(),
            },
            DomainInfo {
                domain: Domain::StatisticalML,
                name: "Statistical ML",
                description: "CLOPE clustering of categorical transactions",
                kernel_count: 1,
                feature: Domain::StatisticalML.feature(),
            },
            DomainInfo {
                domain: Domain::Compliance,
                name: "Compliance",
                description: "Account roles, suspicion ranking and cluster pattern detection",
                kernel_count: 3,
                feature: Domain::Compliance.feature(),
            },
        ]
    }

    /// Get total kernel count across all domains.
    pub fn total_kernel_count() -> usize {
        domains().iter().map(|d| d.kernel_count).sum()
    }

    /// Look up a domain by its short name.
    pub fn find(feature: &str) -> Option<DomainInfo> {
        domains().into_iter().find(|d| d.feature == feature)
    }
}

/// Register every kernel into a registry.
///
/// # Errors
///
/// Returns an error if any kernel registration fails.
pub fn register_all(
    registry: &amlkernel_core::registry::KernelRegistry,
) -> amlkernel_core::error::Result<()> {
    amlkernel_ledger::register_all(registry)?;
    amlkernel_graph::register_all(registry)?;
    amlkernel_ml::register_all(registry)?;
    amlkernel_compliance::register_all(registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _domain = Domain::GraphAnalytics;
        let _mode = KernelMode::Iterative;
        let _config = AnalysisConfig::default();
    }

    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!version::VERSION.is_empty());
    }

    #[test]
    fn test_catalog() {
        let domains = catalog::domains();
        assert_eq!(domains.len(), 4);
        assert_eq!(catalog::total_kernel_count(), 13);
        assert_eq!(
            catalog::find("graph").map(|d| d.domain),
            Some(amlkernel_core::domain::Domain::GraphAnalytics)
        );
        assert!(catalog::find("temporal").is_none());
    }

    #[test]
    fn test_register_all_matches_catalog() {
        let registry = amlkernel_core::registry::KernelRegistry::new();
        register_all(&registry).unwrap();
        assert_eq!(registry.total_count(), catalog::total_kernel_count());

        for info in catalog::domains() {
            assert_eq!(
                registry.by_domain(info.domain).len(),
                info.kernel_count,
                "kernel count mismatch for {}",
                info.name
            );
        }
    }
}
