/*
 * Copyright 2026 Registry Mock Team
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Spec content cache.
//!
//! Entries are keyed by spec name, not by revision, and are never
//! invalidated: a hit is served verbatim even after the registry publishes a
//! newer revision under the same name. Staleness is bounded only by a
//! process restart (memory store) or by clearing the cache directory (disk
//! store).
//!
//! Concurrent misses on the same name may each fetch and each write the
//! entry; the last write wins and both writes carry the same content.

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::config::{CacheBackend, CacheConfig};
use crate::error::{Error, Result};
use crate::registry::{Contents, NameKind, RegistryClient, ResourceName};
use crate::telemetry::metrics::{record_cache_lookup, record_registry_call};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Backing storage for cached spec contents.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<Contents>>;

    async fn put(&self, name: &str, contents: &Contents) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct SpecCache {
    store: Arc<dyn CacheStore>,
    registry: Arc<dyn RegistryClient>,
}

impl SpecCache {
    pub fn new(store: Arc<dyn CacheStore>, registry: Arc<dyn RegistryClient>) -> Self {
        Self { store, registry }
    }

    pub fn from_config(config: &CacheConfig, registry: Arc<dyn RegistryClient>) -> Self {
        let store: Arc<dyn CacheStore> = match config.backend {
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
            CacheBackend::Disk => Arc::new(DiskStore::new(&config.directory)),
        };
        Self::new(store, registry)
    }

    /// Returns the contents of `name`, fetching and storing them on a miss.
    ///
    /// Only spec names are cacheable; deployments must be resolved first.
    pub async fn get_spec_content(&self, name: &ResourceName) -> Result<Contents> {
        if name.kind() != NameKind::Spec {
            return Err(Error::InvalidName(format!("{} is not a spec name", name)));
        }

        match self.store.get(name.as_str()).await {
            Ok(Some(contents)) => {
                record_cache_lookup(true);
                debug!(spec = %name, "Spec cache hit");
                return Ok(contents);
            }
            Ok(None) => {}
            Err(e) => warn!(spec = %name, error = %e, "Spec cache read failed, treating as miss"),
        }

        record_cache_lookup(false);
        debug!(spec = %name, "Spec cache miss, fetching from registry");

        let fetched = self.registry.get_api_spec_contents(name.as_str()).await;
        record_registry_call("GetApiSpecContents", fetched.is_ok());
        let contents = fetched?;

        if let Err(e) = self.store.put(name.as_str(), &contents).await {
            warn!(spec = %name, error = %e, "Failed to store spec in cache");
        }

        Ok(contents)
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
