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

use crate::cache::CacheStore;
use crate::error::Result;
use crate::registry::Contents;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Process-lifetime store, emptied on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Contents>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<Contents>> {
        Ok(self.entries.get(name).map(|entry| entry.value().clone()))
    }

    async fn put(&self, name: &str, contents: &Contents) -> Result<()> {
        self.entries.insert(name.to_string(), contents.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
