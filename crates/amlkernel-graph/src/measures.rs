//! Per-node measure tables and min-max normalization.

use amlkernel_core::{
    convergence::ConvergenceSummary,
    domain::Domain,
    error::Result,
    kernel::KernelMetadata,
    traits::{AnalyticsKernel, BatchKernel},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight network measures computed per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Sum of incoming edge weights.
    InDegree,
    /// Sum of outgoing edge weights.
    OutDegree,
    /// Sum of all incident edge weights.
    TotalDegree,
    /// Weighted shortest-path betweenness.
    Betweenness,
    /// Weighted closeness (weight read as distance).
    Closeness,
    /// Weighted PageRank.
    PageRank,
    /// HITS hub score.
    HubScore,
    /// HITS authority score.
    AuthorityScore,
}

impl Measure {
    /// Every measure, in column order.
    pub const ALL: [Measure; 8] = [
        Measure::InDegree,
        Measure::OutDegree,
        Measure::TotalDegree,
        Measure::Betweenness,
        Measure::Closeness,
        Measure::PageRank,
        Measure::HubScore,
        Measure::AuthorityScore,
    ];

    /// Stable snake_case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Measure::InDegree => "in_degree",
            Measure::OutDegree => "out_degree",
            Measure::TotalDegree => "total_degree",
            Measure::Betweenness => "betweenness",
            Measure::Closeness => "closeness",
            Measure::PageRank => "pagerank",
            Measure::HubScore => "hub_score",
            Measure::AuthorityScore => "authority_score",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All measures of one node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMeasures {
    /// Weighted in-degree.
    pub in_degree: f64,
    /// Weighted out-degree.
    pub out_degree: f64,
    /// Weighted total degree.
    pub total_degree: f64,
    /// Betweenness.
    pub betweenness: f64,
    /// Closeness.
    pub closeness: f64,
    /// PageRank.
    pub pagerank: f64,
    /// Hub score.
    pub hub_score: f64,
    /// Authority score.
    pub authority_score: f64,
}

impl NodeMeasures {
    /// Read one measure.
    #[must_use]
    pub fn get(&self, measure: Measure) -> f64 {
        match measure {
            Measure::InDegree => self.in_degree,
            Measure::OutDegree => self.out_degree,
            Measure::TotalDegree => self.total_degree,
            Measure::Betweenness => self.betweenness,
            Measure::Closeness => self.closeness,
            Measure::PageRank => self.pagerank,
            Measure::HubScore => self.hub_score,
            Measure::AuthorityScore => self.authority_score,
        }
    }

    /// Write one measure.
    pub fn set(&mut self, measure: Measure, value: f64) {
        let slot = match measure {
            Measure::InDegree => &mut self.in_degree,
            Measure::OutDegree => &mut self.out_degree,
            Measure::TotalDegree => &mut self.total_degree,
            Measure::Betweenness => &mut self.betweenness,
            Measure::Closeness => &mut self.closeness,
            Measure::PageRank => &mut self.pagerank,
            Measure::HubScore => &mut self.hub_score,
            Measure::AuthorityScore => &mut self.authority_score,
        };
        *slot = value;
    }
}

/// Raw measures for every node of a graph, in node order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasureTable {
    accounts: Vec<String>,
    rows: Vec<NodeMeasures>,
    /// PageRank convergence.
    pub pagerank_convergence: ConvergenceSummary,
    /// HITS convergence.
    pub hits_convergence: ConvergenceSummary,
}

/// Min-max normalized measures; every value lies in `[0, 1]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedMeasureTable {
    accounts: Vec<String>,
    rows: Vec<NodeMeasures>,
}

macro_rules! table_accessors {
    ($ty:ty) => {
        impl $ty {
            /// Account ids in node order.
            pub fn accounts(&self) -> &[String] {
                &self.accounts
            }

            /// Rows in node order.
            pub fn rows(&self) -> &[NodeMeasures] {
                &self.rows
            }

            /// Number of nodes.
            pub fn len(&self) -> usize {
                self.rows.len()
            }

            /// Whether the table is empty.
            pub fn is_empty(&self) -> bool {
                self.rows.is_empty()
            }

            /// One measure across all nodes.
            pub fn column(&self, measure: Measure) -> Vec<f64> {
                self.rows.iter().map(|r| r.get(measure)).collect()
            }

            /// Measures of one account (linear scan).
            pub fn for_account(&self, account: &str) -> Option<&NodeMeasures> {
                self.accounts
                    .iter()
                    .position(|a| a == account)
                    .map(|i| &self.rows[i])
            }

            /// Iterate `(account, measures)` pairs in node order.
            pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeMeasures)> + '_ {
                self.accounts.iter().map(String::as_str).zip(self.rows.iter())
            }
        }
    };
}

table_accessors!(MeasureTable);
table_accessors!(NormalizedMeasureTable);

impl MeasureTable {
    /// Assemble a table. `accounts` and `rows` must be aligned.
    pub fn new(accounts: Vec<String>, rows: Vec<NodeMeasures>) -> Self {
        debug_assert_eq!(accounts.len(), rows.len());
        Self {
            accounts,
            rows,
            pagerank_convergence: ConvergenceSummary::trivial(),
            hits_convergence: ConvergenceSummary::trivial(),
        }
    }

    /// Rescale every measure to `[0, 1]` independently.
    ///
    /// A measure whose values are all equal maps to 0 for every node.
    #[must_use]
    pub fn normalize(&self) -> NormalizedMeasureTable {
        let mut rows = vec![NodeMeasures::default(); self.rows.len()];
        for measure in Measure::ALL {
            let scaled = min_max_scale(&self.column(measure));
            for (row, value) in rows.iter_mut().zip(scaled) {
                row.set(measure, value);
            }
        }
        NormalizedMeasureTable {
            accounts: self.accounts.clone(),
            rows,
        }
    }
}

impl NormalizedMeasureTable {
    /// Build a normalized table from rows that are already in `[0, 1]`.
    ///
    /// Values outside the range are clamped.
    pub fn from_rows(accounts: Vec<String>, rows: Vec<NodeMeasures>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut r| {
                for m in Measure::ALL {
                    r.set(m, r.get(m).clamp(0.0, 1.0));
                }
                r
            })
            .collect();
        Self { accounts, rows }
    }
}

/// `(v - min) / (max - min)`, or all zeros when `max == min`.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    if values.is_empty() || range == 0.0 || !range.is_finite() {
        return vec![0.0; values.len()];
    }

    values
        .iter()
        .map(|&v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Min-max normalization kernel.
#[derive(Debug, Clone)]
pub struct MeasureNormalizer {
    metadata: KernelMetadata,
}

impl Default for MeasureNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureNormalizer {
    /// Create a new normalizer kernel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: KernelMetadata::batch("graph/measure-normalizer", Domain::GraphAnalytics)
                .with_description("Per-measure min-max rescaling to [0, 1]")
                .with_throughput(10_000_000)
                .with_latency_us(1.0),
        }
    }

    /// Normalize a measure table.
    pub fn compute(table: &MeasureTable) -> NormalizedMeasureTable {
        table.normalize()
    }
}

impl AnalyticsKernel for MeasureNormalizer {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }
}

#[async_trait]
impl BatchKernel<MeasureTable, NormalizedMeasureTable> for MeasureNormalizer {
    async fn execute(&self, input: MeasureTable) -> Result<NormalizedMeasureTable> {
        Ok(Self::compute(&input))
    }
}
