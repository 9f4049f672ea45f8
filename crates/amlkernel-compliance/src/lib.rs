//! # AmlKernel Compliance
//!
//! Account risk and transaction-cluster pattern kernels.
//!
//! ## Kernels
//!
//! ### Network roles (2 kernels)
//! - `RoleClassifier` - Threshold rules over normalized measures
//! - `SuspicionScorer` - Bounded per-account suspicion ranking
//!
//! ### Cluster patterns (1 kernel)
//! - `PatternDetector` - Circular, smurfing and integration scores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod patterns;
pub mod roles;
pub mod suspicion;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::patterns::*;
    pub use crate::roles::*;
    pub use crate::suspicion::*;
    pub use crate::types::*;
}

/// Register all compliance kernels with a registry.
pub fn register_all(
    registry: &amlkernel_core::registry::KernelRegistry,
) -> amlkernel_core::error::Result<()> {
    tracing::info!("Registering compliance kernels");

    // Network roles (2)
    registry.register_from(roles::RoleClassifier::new)?;
    registry.register_from(suspicion::SuspicionScorer::new)?;

    // Cluster patterns (1)
    registry.register_from(patterns::PatternDetector::new)?;

    tracing::info!("Registered 3 compliance kernels");
    Ok(())
}
