//! Uploaded image storage
//!
//! Images are stored under a root directory in per-kind subdirectories
//! (`books/`, `avatars/`) with a random file name. Database rows keep the
//! path relative to the root, e.g. `books/0b6f...e1.png`.

use anyhow::Context;
use async_trait::async_trait;
use axum::body::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Subdirectory for book cover images
pub const BOOK_IMAGES: &str = "books";

/// Subdirectory for profile avatars
pub const AVATARS: &str = "avatars";

/// An image received from a multipart form, already checked against the
/// extension allow-list
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub extension: String,
    pub body: Bytes,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `body` under `subdir` and return its relative path
    async fn save(&self, subdir: &str, extension: &str, body: Bytes) -> anyhow::Result<String>;

    /// Delete a previously saved file. Missing files are not an error.
    async fn remove(&self, relative_path: &str) -> anyhow::Result<()>;
}

/// Remove a file, logging instead of failing. Used for cleanup after the
/// database write already decided the outcome.
pub async fn remove_quietly(store: &dyn UploadStore, relative_path: &str) {
    if relative_path.is_empty() {
        return;
    }
    if let Err(e) = store.remove(relative_path).await {
        warn!(path = relative_path, error = %e, "Failed to remove uploaded file");
    }
}

/// Stores uploads on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalUploadStore {
    root: PathBuf,
}

impl LocalUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path, refusing anything that escapes the root
    fn resolve(&self, relative_path: &str) -> anyhow::Result<PathBuf> {
        let path = Path::new(relative_path);
        let safe = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            anyhow::bail!("refusing upload path outside the upload root: {}", relative_path);
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    async fn save(&self, subdir: &str, extension: &str, body: Bytes) -> anyhow::Result<String> {
        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload directory {}", dir.display()))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let target = dir.join(&file_name);
        tokio::fs::write(&target, &body)
            .await
            .with_context(|| format!("write upload {}", target.display()))?;

        debug!(path = %target.display(), bytes = body.len(), "Stored upload");
        Ok(format!("{}/{}", subdir, file_name))
    }

    async fn remove(&self, relative_path: &str) -> anyhow::Result<()> {
        let target = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove upload {}", target.display())),
        }
    }
}
