//! # AmlKernel Ledger
//!
//! The transaction store every analysis path starts from.
//!
//! ## Kernels
//! - `LedgerValidation` - Mandatory column check and typed conversion

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod table;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::table::*;
    pub use crate::types::*;
}

/// Register all ledger kernels with a registry.
pub fn register_all(
    registry: &amlkernel_core::registry::KernelRegistry,
) -> amlkernel_core::error::Result<()> {
    tracing::info!("Registering ledger kernels");

    registry.register_from(table::LedgerValidation::new)?;

    tracing::info!("Registered 1 ledger kernel");
    Ok(())
}
