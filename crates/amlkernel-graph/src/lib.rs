//! # AmlKernel Graph
//!
//! Money-flow graph construction and network measures.
//!
//! ## Kernels
//! - `DegreeCentrality` - Weighted in/out/total degree
//! - `BetweennessCentrality` - Brandes over weighted shortest paths
//! - `ClosenessCentrality` - Weighted closeness
//! - `PageRank` - Weighted PageRank
//! - `HitsCentrality` - Hub and authority scores
//! - `CentralityEngine` - All measures into one `MeasureTable`
//! - `MeasureNormalizer` - Per-measure min-max rescaling
//! - `SimpleCycles` - Elementary cycle enumeration
//!
//! ## Features
//! - `parallel` - Spread per-source shortest-path runs over a rayon pool

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod centrality;
pub mod cycles;
pub mod measures;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::centrality::*;
    pub use crate::cycles::*;
    pub use crate::measures::*;
    pub use crate::types::*;
}

/// Register all graph kernels with a registry.
pub fn register_all(
    registry: &amlkernel_core::registry::KernelRegistry,
) -> amlkernel_core::error::Result<()> {
    tracing::info!("Registering graph analytics kernels");

    // Centrality kernels (5)
    registry.register_from(centrality::DegreeCentrality::new)?;
    registry.register_from(centrality::BetweennessCentrality::new)?;
    registry.register_from(centrality::ClosenessCentrality::new)?;
    registry.register_from(centrality::PageRank::new)?;
    registry.register_from(centrality::HitsCentrality::new)?;

    // Measure table kernels (2)
    registry.register_from(centrality::CentralityEngine::new)?;
    registry.register_from(measures::MeasureNormalizer::new)?;

    // Cycle kernels (1)
    registry.register_from(cycles::SimpleCycles::new)?;

    tracing::info!("Registered 8 graph analytics kernels");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlkernel_core::{kernel::KernelMode, registry::KernelRegistry};

    #[test]
    fn test_register_all() {
        let registry = KernelRegistry::new();
        register_all(&registry).expect("Failed to register graph kernels");
        assert_eq!(registry.total_count(), 8);
        assert_eq!(registry.by_mode(KernelMode::Iterative).len(), 2);
    }
}
