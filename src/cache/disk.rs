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

//! Filesystem store that survives restarts.
//!
//! Layout: `{root}/{spec name}/content` holds the bytes and
//! `{root}/{spec name}/content-type` the declared content type. Directories
//! are created on first write.

use crate::cache::CacheStore;
use crate::error::Result;
use crate::registry::Contents;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const CONTENT_FILE: &str = "content";
const CONTENT_TYPE_FILE: &str = "content-type";

#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Names reaching the store are validated resource names, so each
    /// segment is a plain path component.
    fn entry_dir(&self, name: &str) -> PathBuf {
        name.split('/').fold(self.root.clone(), |path, segment| path.join(segment))
    }

    async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn get(&self, name: &str) -> Result<Option<Contents>> {
        let dir = self.entry_dir(name);
        let data = match fs::read(dir.join(CONTENT_FILE)).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let content_type = match fs::read_to_string(dir.join(CONTENT_TYPE_FILE)).await {
            Ok(content_type) => content_type,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Contents { content_type, data }))
    }

    async fn put(&self, name: &str, contents: &Contents) -> Result<()> {
        let dir = self.entry_dir(name);
        fs::create_dir_all(&dir).await?;

        Self::write_atomic(&dir.join(CONTENT_TYPE_FILE), contents.content_type.as_bytes()).await?;
        Self::write_atomic(&dir.join(CONTENT_FILE), &contents.data).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = "projects/p/locations/l/apis/a/versions/v/specs/s";

    fn contents() -> Contents {
        Contents {
            content_type: "application/yaml".to_string(),
            data: b"openapi: 3.0.0".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path());
        assert!(store.get(SPEC).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_survives_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        DiskStore::new(dir.path()).put(SPEC, &contents()).await.unwrap();

        let reopened = DiskStore::new(dir.path());
        assert_eq!(reopened.get(SPEC).await.unwrap(), Some(contents()));
        assert!(dir.path().join(SPEC).join("content").exists());
    }

    #[tokio::test]
    async fn test_overwrite_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cache");
        let store = DiskStore::new(&root);

        store.put(SPEC, &contents()).await.unwrap();
        let updated = Contents {
            content_type: "application/json".to_string(),
            data: b"{}".to_vec(),
        };
        store.put(SPEC, &updated).await.unwrap();
        assert_eq!(store.get(SPEC).await.unwrap(), Some(updated));

        store.clear().await.unwrap();
        assert!(store.get(SPEC).await.unwrap().is_none());
        store.clear().await.unwrap();
    }
}
