//! [`FsBlobStore`]: uploaded files kept as plain files on disk.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use cursada_core::{
  path::{BlobPath, BlobPrefix},
  store::BlobStore,
};

use crate::{Error, Result};

/// Stores each blob at `{root}/{key}` and hands out `{base_url}/{key}` as
/// its download URL. Serving `root` under `base_url` is left to the caller.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
  root:     PathBuf,
  base_url: String,
}

impl FsBlobStore {
  /// Create the root directory if needed.
  pub async fn open(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self> {
    let root = root.into();
    tokio::fs::create_dir_all(&root).await?;
    let base_url = base_url.into().trim_end_matches('/').to_owned();
    Ok(Self { root, base_url })
  }

  pub fn root(&self) -> &Path { &self.root }

  fn file_path(&self, key: &str) -> PathBuf { self.root.join(key) }
}

fn not_found_or(key: String) -> impl FnOnce(std::io::Error) -> Error {
  move |e| {
    if e.kind() == ErrorKind::NotFound {
      Error::NotFound(key)
    } else {
      Error::Io(e)
    }
  }
}

/// Count regular files below `dir`, walking iteratively.
async fn count_files(dir: &Path) -> std::io::Result<usize> {
  let mut count = 0;
  let mut pending = vec![dir.to_path_buf()];
  while let Some(next) = pending.pop() {
    let mut entries = tokio::fs::read_dir(&next).await?;
    while let Some(entry) = entries.next_entry().await? {
      if entry.file_type().await?.is_dir() {
        pending.push(entry.path());
      } else {
        count += 1;
      }
    }
  }
  Ok(count)
}

impl BlobStore for FsBlobStore {
  type Error = Error;

  async fn put(&self, path: BlobPath, bytes: Vec<u8>) -> Result<u64> {
    let target = self.file_path(&path.to_string());
    if let Some(parent) = target.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    let size = bytes.len() as u64;
    tokio::fs::write(&target, bytes).await?;
    tracing::debug!(%path, size, "stored blob");
    Ok(size)
  }

  async fn download_url(&self, path: BlobPath) -> Result<String> {
    let key = path.to_string();
    tokio::fs::metadata(self.file_path(&key))
      .await
      .map_err(not_found_or(key.clone()))?;
    Ok(format!("{}/{key}", self.base_url))
  }

  async fn delete(&self, path: BlobPath) -> Result<()> {
    let key = path.to_string();
    tokio::fs::remove_file(self.file_path(&key))
      .await
      .map_err(not_found_or(key))?;
    Ok(())
  }

  async fn delete_prefix(&self, prefix: BlobPrefix) -> Result<usize> {
    let key = prefix.to_string();
    let dir = self.file_path(key.trim_end_matches('/'));

    let count = count_files(&dir).await.map_err(not_found_or(key.clone()))?;
    tokio::fs::remove_dir_all(&dir)
      .await
      .map_err(not_found_or(key.clone()))?;

    tracing::debug!(prefix = %key, count, "deleted blob folder");
    Ok(count)
  }
}
