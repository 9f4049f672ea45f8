//! # AmlKernel Statistical ML
//!
//! Categorical clustering of ledger transactions.
//!
//! ## Kernels
//! - `Clope` - CLOPE clustering over categorical transaction tokens

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod categorical;
pub mod clope;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::categorical::*;
    pub use crate::clope::*;
}

/// Register all ML kernels with a registry.
pub fn register_all(
    registry: &amlkernel_core::registry::KernelRegistry,
) -> amlkernel_core::error::Result<()> {
    tracing::info!("Registering statistical ML kernels");

    registry.register_from(clope::Clope::new)?;

    tracing::info!("Registered 1 statistical ML kernel");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amlkernel_core::{domain::Domain, registry::KernelRegistry};

    #[test]
    fn test_register_all() {
        let registry = KernelRegistry::new();
        register_all(&registry).expect("Failed to register ML kernels");
        assert_eq!(registry.by_domain(Domain::StatisticalML).len(), 1);
    }
}
