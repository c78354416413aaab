//! Provider Registry module.
//!
//! Provides thread-safe in-memory storage and querying of provider records.

mod error;
mod record;

pub use error::*;
pub use record::*;

use dashmap::DashMap;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::provider::RpcProvider;

/// The Provider Registry stores all configured upstream providers.
///
/// Records are registered once at construction and live for the router's
/// lifetime; they are never destroyed, only disabled. Name lookups go
/// through a lock-free concurrent map (DashMap); ranked iteration uses the
/// registration order, which `Router::from_config` makes the configuration
/// order.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use rpc_router::config::ProviderConfig;
/// use rpc_router::provider::{ProviderError, RpcProvider};
/// use rpc_router::registry::ProviderRegistry;
/// use serde_json::Value;
/// use std::sync::Arc;
///
/// struct Stub;
///
/// #[async_trait]
/// impl RpcProvider for Stub {
///     async fn call(&self, _method: &str, _params: Value) -> Result<Value, ProviderError> {
///         Ok(Value::Null)
///     }
///
///     async fn health_check(&self) -> Result<bool, ProviderError> {
///         Ok(true)
///     }
/// }
///
/// let mut registry = ProviderRegistry::new();
/// let config: ProviderConfig = toml::from_str("name = \"primary\"").unwrap();
/// registry.register(&config, Arc::new(Stub)).unwrap();
/// assert_eq!(registry.len(), 1);
/// ```
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<ProviderRecord>>,
    order: Vec<String>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a provider from its configuration and handle.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateProvider` if a provider with the
    /// same name already exists.
    pub fn register(
        &mut self,
        config: &ProviderConfig,
        handle: Arc<dyn RpcProvider>,
    ) -> Result<(), RegistryError> {
        if self.providers.contains_key(&config.name) {
            return Err(RegistryError::DuplicateProvider(config.name.clone()));
        }

        let record = Arc::new(ProviderRecord::new(config, handle));
        self.order.push(config.name.clone());
        self.providers.insert(config.name.clone(), record);
        Ok(())
    }

    /// Get a provider record by name.
    pub fn get(&self, name: &str) -> Option<Arc<ProviderRecord>> {
        self.providers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// All records in registration order.
    pub fn records(&self) -> Vec<Arc<ProviderRecord>> {
        self.order
            .iter()
            .filter_map(|name| self.get(name))
            .collect()
    }

    /// Serializable views of all records, in registration order.
    pub fn views(&self) -> Vec<ProviderView> {
        self.records()
            .iter()
            .map(|record| ProviderView::from(record.as_ref()))
            .collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Flip the operator-controlled enabled switch on a provider.
    ///
    /// Disabled providers keep their statistics and handle; they are only
    /// removed from routing eligibility.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), RegistryError> {
        let record = self
            .get(name)
            .ok_or_else(|| RegistryError::ProviderNotFound(name.to_string()))?;
        record.set_enabled(enabled);
        tracing::info!(provider = %name, enabled, "provider enabled flag changed");
        Ok(())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
