//! Kernel registry.
//!
//! The registry records the metadata of every kernel a domain crate exposes
//! and provides lookup by id, domain and mode.

use crate::domain::Domain;
use crate::error::{KernelError, Result};
use crate::kernel::{KernelMetadata, KernelMode};
use crate::traits::AnalyticsKernel;
use hashbrown::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Total number of registered kernels.
    pub total: usize,
    /// Number of single-pass kernels.
    pub batch_kernels: usize,
    /// Number of iterative kernels.
    pub iterative_kernels: usize,
    /// Kernels by domain.
    pub by_domain: HashMap<Domain, usize>,
}

/// Central registry for all kernels.
#[derive(Debug, Default)]
pub struct KernelRegistry {
    kernels: RwLock<HashMap<String, KernelMetadata>>,
}

impl KernelRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, KernelMetadata>> {
        self.kernels.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, KernelMetadata>> {
        self.kernels.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register kernel metadata.
    pub fn register_metadata(&self, metadata: KernelMetadata) -> Result<()> {
        let mut kernels = self.write();
        if kernels.contains_key(&metadata.id) {
            return Err(KernelError::KernelAlreadyRegistered(metadata.id));
        }

        debug!(kernel_id = %metadata.id, domain = %metadata.domain, mode = %metadata.mode, "Registering kernel");
        kernels.insert(metadata.id.clone(), metadata);
        Ok(())
    }

    /// Register a kernel built by `factory`, validating it first.
    pub fn register_from<K, F>(&self, factory: F) -> Result<()>
    where
        K: AnalyticsKernel,
        F: FnOnce() -> K,
    {
        let kernel = factory();
        kernel.validate()?;
        self.register_metadata(kernel.metadata().clone())
    }

    /// Get kernel metadata by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<KernelMetadata> {
        self.read().get(id).cloned()
    }

    /// Get kernel metadata by ID or fail with `KernelNotFound`.
    pub fn require(&self, id: &str) -> Result<KernelMetadata> {
        self.get(id).ok_or_else(|| KernelError::not_found(id))
    }

    /// Check if a kernel exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Get all kernel IDs, sorted.
    #[must_use]
    pub fn all_kernel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get kernels by domain, sorted by id.
    #[must_use]
    pub fn by_domain(&self, domain: Domain) -> Vec<KernelMetadata> {
        let mut result: Vec<KernelMetadata> = self
            .read()
            .values()
            .filter(|m| m.domain == domain)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    /// Get kernels by mode, sorted by id.
    #[must_use]
    pub fn by_mode(&self, mode: KernelMode) -> Vec<KernelMetadata> {
        let mut result: Vec<KernelMetadata> = self
            .read()
            .values()
            .filter(|m| m.mode == mode)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        result
    }

    /// Get registry statistics.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let kernels = self.read();
        let mut by_domain: HashMap<Domain, usize> = HashMap::new();
        let mut batch_kernels = 0;

        for meta in kernels.values() {
            *by_domain.entry(meta.domain).or_default() += 1;
            if meta.mode.is_batch() {
                batch_kernels += 1;
            }
        }

        RegistryStats {
            total: kernels.len(),
            batch_kernels,
            iterative_kernels: kernels.len() - batch_kernels,
            by_domain,
        }
    }

    /// Total number of registered kernels.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.read().len()
    }

    /// Clear all registered kernels.
    pub fn clear(&self) {
        self.write().clear();
        info!("Cleared kernel registry");
    }

    /// Unregister a kernel by ID.
    pub fn unregister(&self, id: &str) -> bool {
        if self.write().remove(id).is_some() {
            debug!(kernel_id = %id, "Unregistered kernel");
            return true;
        }

        warn!(kernel_id = %id, "Attempted to unregister non-existent kernel");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, domain: Domain) -> KernelMetadata {
        KernelMetadata::batch(id, domain)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = KernelRegistry::new();
        registry
            .register_metadata(meta("graph/flow-graph", Domain::GraphAnalytics))
            .unwrap();
        registry
            .register_metadata(KernelMetadata::iterative("ml/clope", Domain::StatisticalML))
            .unwrap();

        assert_eq!(registry.total_count(), 2);
        assert!(registry.contains("ml/clope"));
        assert_eq!(registry.by_domain(Domain::GraphAnalytics).len(), 1);
        assert_eq!(registry.by_mode(KernelMode::Iterative).len(), 1);

        let stats = registry.stats();
        assert_eq!(stats.batch_kernels, 1);
        assert_eq!(stats.iterative_kernels, 1);
        assert_eq!(stats.by_domain.get(&Domain::StatisticalML), Some(&1));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = KernelRegistry::new();
        registry
            .register_metadata(meta("graph/pagerank", Domain::GraphAnalytics))
            .unwrap();
        let err = registry
            .register_metadata(meta("graph/pagerank", Domain::GraphAnalytics))
            .unwrap_err();
        assert!(matches!(err, KernelError::KernelAlreadyRegistered(_)));
    }

    #[test]
    fn test_require_missing_kernel() {
        let registry = KernelRegistry::new();
        assert!(matches!(
            registry.require("nope"),
            Err(KernelError::KernelNotFound(_))
        ));
    }

    #[test]
    fn test_unregister_and_clear() {
        let registry = KernelRegistry::new();
        registry
            .register_metadata(meta("a/one", Domain::Ledger))
            .unwrap();
        registry
            .register_metadata(meta("a/two", Domain::Ledger))
            .unwrap();

        assert!(registry.unregister("a/one"));
        assert!(!registry.unregister("a/one"));
        assert_eq!(registry.all_kernel_ids(), vec!["a/two".to_string()]);

        registry.clear();
        assert_eq!(registry.total_count(), 0);
    }
}
