//! # AmlKernel Core
//!
//! Core abstractions, traits, and registry for the AmlKernels analytics library.
//!
//! This crate provides:
//! - Domain and kernel type definitions
//! - Kernel metadata and execution modes
//! - Trait definitions for batch kernels
//! - Kernel registry
//! - Convergence tracking for iterative algorithms
//! - Analysis configuration and logging setup

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod convergence;
pub mod domain;
pub mod error;
pub mod kernel;
pub mod logging;
pub mod registry;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        AnalysisConfig, CentralityConfig, ClopeConfig, PatternConfig, SmurfingFormula,
    };
    pub use crate::convergence::{ConvergenceSummary, IterativeState};
    pub use crate::domain::Domain;
    pub use crate::error::{KernelError, Result};
    pub use crate::kernel::{KernelMetadata, KernelMode};
    pub use crate::logging::{LogConfig, LogLevel};
    pub use crate::registry::{KernelRegistry, RegistryStats};
    pub use crate::traits::{AnalyticsKernel, BatchKernel};
}
