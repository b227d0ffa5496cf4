//! The flat metadata record for one cached model artifact.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Metadata for one downloaded model artifact: its name, the SHA-256 of its
/// content, and its size in bytes. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCacheRecord {
    /// Artifact name (the model name used in the store keys).
    pub name: String,

    /// Lowercase hex SHA-256 of the artifact content.
    pub sha256: String,

    /// Artifact size in bytes.
    pub size_bytes: u64,
}

impl ModelCacheRecord {
    /// Create a record from already-known metadata.
    pub fn new(name: impl Into<String>, sha256: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            sha256: sha256.into(),
            size_bytes,
        }
    }

    /// Build a record by hashing a downloaded file.
    ///
    /// The artifact name is the file stem (file name minus extension).
    pub fn for_file(path: &Path) -> io::Result<Self> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("no file name in {}", path.display()),
                )
            })?;

        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let size_bytes = io::copy(&mut file, &mut hasher)?;

        Ok(Self {
            name,
            sha256: hex::encode(hasher.finalize()),
            size_bytes,
        })
    }

    /// Re-hash `path` and check it still matches this record.
    pub fn matches_file(&self, path: &Path) -> io::Result<bool> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let size = io::copy(&mut file, &mut hasher)?;
        Ok(size == self.size_bytes && hex::encode(hasher.finalize()) == self.sha256)
    }
}
