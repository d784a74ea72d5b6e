//! Durable key-value storage for the two record buckets
//!
//! Each bucket holds the whole serialized collection. Writers replace the
//! bucket wholesale; there is no partial update.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// The named buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Custody requests, most recent first
    Requests,
    /// Reference-data entities
    Entities,
}

impl Bucket {
    pub fn key(&self) -> &'static str {
        match self {
            Bucket::Requests => "requests",
            Bucket::Entities => "entities",
        }
    }

    /// File name used by [`FileStorage`]
    pub fn file_name(&self) -> String {
        format!("{}.json", self.key())
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Durable storage backend
pub trait Storage {
    /// Read a bucket; `Ok(None)` when it has never been written
    fn load(&self, bucket: Bucket) -> Result<Option<String>, StorageError>;

    /// Replace a bucket's contents
    fn save(&mut self, bucket: Bucket, contents: &str) -> Result<(), StorageError>;
}

/// One JSON file per bucket inside a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn bucket_path(&self, bucket: Bucket) -> PathBuf {
        self.dir.join(bucket.file_name())
    }
}

impl Storage for FileStorage {
    fn load(&self, bucket: Bucket) -> Result<Option<String>, StorageError> {
        let path = self.bucket_path(bucket);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(bucket = %bucket, path = %path.display(), bytes = contents.len(), "loaded bucket");
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save(&mut self, bucket: Bucket, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        // Write beside the target, then rename over it
        let path = self.bucket_path(bucket);
        let tmp = self.dir.join(format!(".{}.tmp", bucket.file_name()));
        fs::write(&tmp, contents).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(bucket = %bucket, path = %path.display(), bytes = contents.len(), "saved bucket");
        Ok(())
    }
}

/// In-process storage with an optional byte quota across all buckets
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    buckets: HashMap<Bucket, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total stored bytes; writes beyond it fail with `QuotaExceeded`
    pub fn with_quota(quota: usize) -> Self {
        Self {
            buckets: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Seed a bucket directly, bypassing the quota
    pub fn insert(&mut self, bucket: Bucket, contents: impl Into<String>) {
        self.buckets.insert(bucket, contents.into());
    }

    pub fn get(&self, bucket: Bucket) -> Option<&str> {
        self.buckets.get(&bucket).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, bucket: Bucket) -> Result<Option<String>, StorageError> {
        Ok(self.buckets.get(&bucket).cloned())
    }

    fn save(&mut self, bucket: Bucket, contents: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let others: usize = self
                .buckets
                .iter()
                .filter(|(b, _)| **b != bucket)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + contents.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.buckets.insert(bucket, contents.to_string());
        Ok(())
    }
}

/// Errors raised by a storage backend
#[derive(Debug, Error, Diagnostic)]
pub enum StorageError {
    #[error("cannot access {path:?}: {source}")]
    #[diagnostic(code(gestdoc::storage::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    #[diagnostic(
        code(gestdoc::storage::quota),
        help("Delete records you no longer need, then repeat the action.")
    )]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("cannot encode {bucket}: {source}")]
    #[diagnostic(code(gestdoc::storage::encode))]
    Encode {
        bucket: Bucket,
        #[source]
        source: serde_json::Error,
    },
}
