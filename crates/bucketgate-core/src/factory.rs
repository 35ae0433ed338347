//! Backend clients bound to a region

use crate::{GatewayError, RegionRegistry, Result, ValidatedTarget};
use bucketgate_store::{ObjectStore, S3ObjectStore, S3StoreConfig};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Produces the object store serving a validated target
pub trait StoreFactory: Send + Sync {
    fn store_for(&self, target: &ValidatedTarget) -> Result<Arc<dyn ObjectStore>>;
}

/// One S3 client per region, built on first use and kept for the process lifetime
pub struct S3StoreFactory {
    registry: Arc<RegionRegistry>,
    clients: DashMap<String, Arc<S3ObjectStore>>,
}

impl S3StoreFactory {
    pub fn new(registry: Arc<RegionRegistry>) -> Self {
        Self {
            registry,
            clients: DashMap::new(),
        }
    }

    #[cfg(test)]
    fn cached_clients(&self) -> usize {
        self.clients.len()
    }
}

impl StoreFactory for S3StoreFactory {
    fn store_for(&self, target: &ValidatedTarget) -> Result<Arc<dyn ObjectStore>> {
        let region = target.region();
        if let Some(client) = self.clients.get(region) {
            return Ok(client.clone());
        }

        // Re-check rather than trust the caller; the registry is the authority.
        let config = self
            .registry
            .resolve_region(region)
            .ok_or_else(|| GatewayError::UnknownRegion(region.to_string()))?;

        let store = S3ObjectStore::new(&S3StoreConfig {
            endpoint: config.endpoint.as_str().trim_end_matches('/').to_string(),
            region: region.to_string(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            force_path_style: true,
        })
        .map_err(GatewayError::BackendFailure)?;

        info!(region = %region, endpoint = %config.endpoint, "Created S3 client");

        let client = self
            .clients
            .entry(region.to_string())
            .or_insert_with(|| Arc::new(store))
            .clone();
        Ok(client)
    }
}

/// Serves every region from a single store
///
/// Used for in-memory development mode and tests.
#[derive(Clone)]
pub struct SharedStoreFactory {
    store: Arc<dyn ObjectStore>,
}

impl SharedStoreFactory {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

impl StoreFactory for SharedStoreFactory {
    fn store_for(&self, _target: &ValidatedTarget) -> Result<Arc<dyn ObjectStore>> {
        Ok(Arc::clone(&self.store))
    }
}
