//! Account role classification.
//!
//! Roles come from fixed thresholds on normalized measures, checked in
//! priority order; the first rule that matches wins.

use crate::types::{Role, RoleAssignment};
use amlkernel_core::{
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use amlkernel_graph::measures::{NodeMeasures, NormalizedMeasureTable};
use async_trait::async_trait;

/// Thresholds shared by role and suspicion rules.
pub mod thresholds {
    /// "High" for betweenness and one-sided degree.
    pub const HIGH: f64 = 0.8;
    /// "High" for total degree and hub score.
    pub const ELEVATED: f64 = 0.7;
    /// "Low" for the opposite-side degree.
    pub const LOW: f64 = 0.2;
    /// "Low" for authority score.
    pub const WEAK_AUTHORITY: f64 = 0.3;
}

use thresholds::{ELEVATED, HIGH, LOW, WEAK_AUTHORITY};

/// Account role classification kernel.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    metadata: KernelMetadata,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleClassifier {
    /// Create a new role classifier kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("compliance/role-classifier", Domain::Compliance)
                .with_description("Threshold-based network role assignment")
                .with_throughput(5_000_000)
                .with_latency_us(1.0),
        }
    }

    /// Role of one node.
    pub fn classify(m: &NodeMeasures) -> Role {
        if m.betweenness > HIGH && m.total_degree > ELEVATED {
            Role::CentralHub
        } else if m.in_degree > HIGH && m.out_degree < LOW {
            Role::Sink
        } else if m.out_degree > HIGH && m.in_degree < LOW {
            Role::Source
        } else if m.hub_score > ELEVATED && m.authority_score < WEAK_AUTHORITY {
            Role::Connector
        } else {
            Role::Normal
        }
    }

    /// Role of every node, in table order.
    pub fn compute(table: &NormalizedMeasureTable) -> Vec<Role> {
        table.rows().iter().map(Self::classify).collect()
    }
}

impl AnalyticsKernel for RoleClassifier {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<NormalizedMeasureTable, Vec<RoleAssignment>> for RoleClassifier {
    async fn execute(&self, input: NormalizedMeasureTable) -> Result<Vec<RoleAssignment>> {
        Ok(input
            .iter()
            .map(|(account, m)| RoleAssignment {
                account_id: account.to_string(),
                role: Self::classify(m),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn measures(f: impl FnOnce(&mut NodeMeasures)) -> NodeMeasures {
        let mut m = NodeMeasures::default();
        f(&mut m);
        m
    }

    #[test]
    fn test_central_hub() {
        let m = measures(|m| {
            m.betweenness = 0.9;
            m.total_degree = 0.75;
            // Would also be a sink; priority keeps CentralHub.
            m.in_degree = 0.9;
        });
        assert_eq!(RoleClassifier::classify(&m), Role::CentralHub);
    }

    #[test]
    fn test_sink_and_source() {
        let sink = measures(|m| m.in_degree = 0.95);
        assert_eq!(RoleClassifier::classify(&sink), Role::Sink);

        let source = measures(|m| m.out_degree = 0.95);
        assert_eq!(RoleClassifier::classify(&source), Role::Source);
    }

    #[test]
    fn test_connector() {
        let m = measures(|m| {
            m.hub_score = 0.8;
            m.authority_score = 0.1;
            m.in_degree = 0.5;
            m.out_degree = 0.5;
        });
        assert_eq!(RoleClassifier::classify(&m), Role::Connector);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let m = measures(|m| {
            m.betweenness = 0.8;
            m.total_degree = 1.0;
            m.in_degree = 0.5;
            m.out_degree = 0.5;
        });
        assert_eq!(RoleClassifier::classify(&m), Role::Normal);
    }

    #[tokio::test]
    async fn test_kernel_execute() {
        let table = NormalizedMeasureTable::from_rows(
            vec!["A".into(), "B".into()],
            vec![measures(|m| m.in_degree = 1.0), NodeMeasures::default()],
        );
        let roles = RoleClassifier::new().execute(table).await.unwrap();
        assert_eq!(roles[0].role, Role::Sink);
        assert_eq!(roles[1].account_id, "B");
        assert_eq!(roles[1].role, Role::Normal);
    }

    proptest! {
        #[test]
        fn prop_every_node_gets_one_role(values in prop::array::uniform8(0.0f64..=1.0)) {
            let mut m = NodeMeasures::default();
            for (measure, v) in amlkernel_graph::measures::Measure::ALL.iter().zip(values) {
                m.set(*measure, v);
            }
            let role = RoleClassifier::classify(&m);
            prop_assert!(Role::ALL.contains(&role));
            prop_assert_eq!(role, RoleClassifier::classify(&m));
        }
    }
}
