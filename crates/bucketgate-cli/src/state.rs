//! Application state

use crate::config::GatewayConfig;
use bucketgate_core::{
    Gateway, RegionRegistry, S3StoreFactory, SharedStoreFactory, StoreFactory,
};
use bucketgate_store::MemoryObjectStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Validation and file services over the configured regions
    pub gateway: Gateway,
}

impl AppState {
    /// Build the registry and pick the backend from the configuration
    ///
    /// A registry that fails validation is fatal.
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let settings = config.registry_settings()?;
        let registry = Arc::new(RegionRegistry::from_env(&settings)?);

        for region in registry.regions() {
            info!(
                region,
                buckets = ?registry.permitted_buckets(region),
                "Region configured"
            );
        }

        let factory: Arc<dyn StoreFactory> = if config.use_memory_store {
            warn!("Using in-memory object store - data will NOT persist!");
            let buckets = registry
                .regions()
                .flat_map(|region| registry.permitted_buckets(region).iter().cloned())
                .collect::<Vec<_>>();
            Arc::new(SharedStoreFactory::new(Arc::new(
                MemoryObjectStore::with_buckets(buckets),
            )))
        } else {
            Arc::new(S3StoreFactory::new(Arc::clone(&registry)))
        };

        Ok(Self::with_factory(config, registry, factory))
    }

    /// Create state over an explicit registry and store factory
    pub fn with_factory(
        config: GatewayConfig,
        registry: Arc<RegionRegistry>,
        factory: Arc<dyn StoreFactory>,
    ) -> Self {
        let gateway = Gateway::new(registry, factory).with_list_page_size(config.list_page_size);
        Self { config, gateway }
    }
}
