//! Published puzzle files.
//!
//! Each record becomes `{dateKey}.v{version}.json`: 2-space indented JSON
//! with a trailing newline. The file's SHA-256 (over the exact bytes,
//! newline included) goes into the manifest as an integrity checksum. This is
//! a different digest from the content hash: it covers the version too.
//!
//! Files are never deleted. Publishing `v2` leaves `v1` in place so clients
//! holding an old manifest can still fetch what it points to.

use crate::atomic;
use crate::puzzle::{PuzzleRecord, sha256_hex};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL path under which artifacts are served.
pub const URL_PREFIX: &str = "/puzzles";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rendered artifact, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub url: String,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

/// `2024-01-01`, `3` → `2024-01-01.v3.json`
pub fn artifact_file_name(date_key: &str, version: u64) -> String {
    format!("{date_key}.v{version}.json")
}

/// `2024-01-01`, `3` → `/puzzles/2024-01-01.v3.json`
pub fn artifact_url(date_key: &str, version: u64) -> String {
    format!("{URL_PREFIX}/{}", artifact_file_name(date_key, version))
}

/// Serialize a record and compute its checksum. No I/O.
pub fn render(record: &PuzzleRecord) -> Result<Artifact, ArtifactError> {
    let mut bytes = serde_json::to_vec_pretty(record)?;
    bytes.push(b'\n');
    let sha256 = sha256_hex(&bytes);
    Ok(Artifact {
        file_name: artifact_file_name(&record.date_key, record.version),
        url: artifact_url(&record.date_key, record.version),
        bytes,
        sha256,
    })
}

impl Artifact {
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }

    /// Atomically write into `dir`, returning the written path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ArtifactError> {
        let path = self.path_in(dir);
        atomic::write_atomic(&path, &self.bytes).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
