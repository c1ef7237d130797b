//! Blob stores for photo and report bytes.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use autoinspect_core::BlobStore;

/// Stores blobs as files under a root directory.
///
/// Paths are relative (`inspections/<id>/photos/...`); absolute paths and
/// `..` components are rejected so nothing escapes the root.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let rel = Path::new(path);
        if path.is_empty() {
            anyhow::bail!("Empty blob path");
        }
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => anyhow::bail!("Blob path {path:?} must stay inside the store root"),
            }
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&full, &data)
            .await
            .with_context(|| format!("Failed to write blob {}", full.display()))?;
        debug!(path = %path, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let full = self.resolve(path)?;
        let data = tokio::fs::read(&full)
            .await
            .with_context(|| format!("Failed to read blob {}", full.display()))?;
        Ok(Bytes::from(data))
    }
}

/// Keeps blobs in a map; contents are lost when the store is dropped.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let mut blobs = self.blobs.write().map_err(|_| anyhow!("blob map lock poisoned"))?;
        blobs.insert(path.to_string(), data);
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        let blobs = self.blobs.read().map_err(|_| anyhow!("blob map lock poisoned"))?;
        blobs
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("Blob not found: {path}"))
    }
}
