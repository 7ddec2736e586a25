//! Ephemeral ROM blobs
//!
//! A locally picked ROM is copied into a temporary file that the engine can
//! load by URL. The copy lives until the session manager revokes it.
//! [`BlobUrl`] is move-only and [`BlobStore::revoke`] consumes it, so a blob
//! can be released at most once.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::Url;
use tempfile::TempPath;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create blob: {0}")]
    Create(#[source] io::Error),

    #[error("Cannot express {0} as a file URL")]
    Url(PathBuf),
}

/// Handle to a live blob. Not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct BlobUrl {
    id: u64,
    url: String,
}

impl BlobUrl {
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

/// Creates and releases blobs.
pub trait BlobStore {
    /// Copy `source` into a new blob.
    fn create(&mut self, source: &Path) -> Result<BlobUrl, BlobError>;

    /// Release a blob and its storage.
    fn revoke(&mut self, blob: BlobUrl);
}

/// Blob store backed by temporary files.
#[derive(Default)]
pub struct TempBlobStore {
    dir: Option<PathBuf>,
    next_id: u64,
    live: HashMap<u64, TempPath>,
}

impl TempBlobStore {
    /// Store blobs in the system temporary directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store blobs in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Number of blobs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl BlobStore for TempBlobStore {
    fn create(&mut self, source: &Path) -> Result<BlobUrl, BlobError> {
        let mut input = File::open(source).map_err(|source_err| BlobError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        // Keep the extension: engines use it to detect the ROM format
        let suffix = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut builder = tempfile::Builder::new();
        builder.prefix("retroshelf-rom-").suffix(&suffix);
        let mut tmp = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(BlobError::Create)?;

        io::copy(&mut input, &mut tmp).map_err(|err| BlobError::Read {
            path: source.to_path_buf(),
            source: err,
        })?;

        let path = tmp.into_temp_path();
        let url = Url::from_file_path(&path).map_err(|()| BlobError::Url(path.to_path_buf()))?;

        self.next_id += 1;
        let id = self.next_id;
        tracing::debug!("Created blob {} for {}", id, source.display());
        self.live.insert(id, path);

        Ok(BlobUrl::new(id, url.as_str()))
    }

    fn revoke(&mut self, blob: BlobUrl) {
        match self.live.remove(&blob.id) {
            Some(path) => {
                if let Err(err) = path.close() {
                    tracing::warn!("Failed to delete blob {}: {}", blob.id, err);
                }
                tracing::debug!("Revoked blob {}", blob.id);
            }
            None => tracing::warn!("Revoking unknown blob {}", blob.id),
        }
    }
}
