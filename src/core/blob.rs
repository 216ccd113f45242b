//! Blob storage collaborator
//!
//! The core never holds raw document bytes; it stores only the opaque
//! reference handed back by a `BlobStore`. The filesystem implementation is
//! content-addressed by SHA-256, sharded by the first two hex digits.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::core::error::{RegistryError, Result};

/// Reference returned by a successful store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
    pub size: u64,
}

/// Opaque binary storage. Upload/download may be slow blocking I/O; timeout
/// and retry belong to the caller, never to the core.
pub trait BlobStore {
    fn store(&self, bytes: &[u8], file_name: &str, media_type: &str) -> Result<StoredBlob>;
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Content-addressed blob store under `.fdc/blobs/`
///
/// URLs have the form `blob://<ab>/<sha256hex>`; identical content
/// deduplicates naturally.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Compute the SHA-256 hex digest of a byte slice
    pub fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Filesystem path for a blob URL, if the URL is well-formed
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let hash = url.strip_prefix("blob://")?;
        let (shard, rest) = hash.split_once('/')?;
        if shard.len() != 2 || rest.is_empty() {
            return None;
        }
        Some(self.root.join(shard).join(rest))
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FsBlobStore {
    fn store(&self, bytes: &[u8], _file_name: &str, _media_type: &str) -> Result<StoredBlob> {
        let hash = Self::digest(bytes);
        let shard = &hash[..2];
        let dir = self.root.join(shard);
        std::fs::create_dir_all(&dir)
            .map_err(|e| RegistryError::Dependency(format!("blob store: {}", e)))?;

        let path = dir.join(&hash);
        if !path.exists() {
            std::fs::write(&path, bytes)
                .map_err(|e| RegistryError::Dependency(format!("blob store: {}", e)))?;
        }

        Ok(StoredBlob {
            url: format!("blob://{}/{}", shard, hash),
            size: bytes.len() as u64,
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = self
            .path_for(url)
            .ok_or_else(|| RegistryError::Dependency(format!("malformed blob url: {}", url)))?;
        std::fs::read(&path)
            .map_err(|e| RegistryError::Dependency(format!("blob fetch {}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_and_fetch_roundtrip() {
        let tmp = tempdir().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let bytes = b"controlled document body";
        let blob = store
            .store(bytes, "proc.pdf", "application/pdf")
            .unwrap();

        assert!(blob.url.starts_with("blob://"));
        assert_eq!(blob.size, bytes.len() as u64);

        let fetched = store.fetch(&blob.url).unwrap();
        assert_eq!(fetched, bytes);
    }

    #[test]
    fn test_identical_content_deduplicates() {
        let tmp = tempdir().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let a = store.store(b"same bytes", "a.pdf", "application/pdf").unwrap();
        let b = store.store(b"same bytes", "b.pdf", "application/pdf").unwrap();
        assert_eq!(a.url, b.url);
    }

    #[test]
    fn test_fetch_missing_is_dependency_error() {
        let tmp = tempdir().unwrap();
        let store = FsBlobStore::new(tmp.path());

        let hash = FsBlobStore::digest(b"never stored");
        let err = store
            .fetch(&format!("blob://{}/{}", &hash[..2], hash))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Dependency(_)));
    }

    #[test]
    fn test_malformed_url_rejected() {
        let tmp = tempdir().unwrap();
        let store = FsBlobStore::new(tmp.path());
        assert!(store.fetch("not-a-blob-url").is_err());
        assert!(store.path_for("blob://toolong/abc").is_none());
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(FsBlobStore::digest(b""), FsBlobStore::digest(b""));
        assert_ne!(FsBlobStore::digest(b"a"), FsBlobStore::digest(b"b"));
    }
}
