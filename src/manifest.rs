//! The manifest index.
//!
//! `manifest.json` maps every day key to its latest published artifact:
//!
//! ```json
//! {
//!   "meta": { "generatedAtUtc": "2024-01-01T08:00:00Z" },
//!   "puzzles": {
//!     "2024-01-01": {
//!       "version": 2,
//!       "url": "/puzzles/2024-01-01.v2.json",
//!       "sha256": "…"
//!     }
//!   }
//! }
//! ```
//!
//! The file must already exist; the tool never creates it. Keys other than
//! `meta.generatedAtUtc` and `puzzles` are carried through untouched, and a
//! missing or malformed `meta`/`puzzles` object is replaced by an empty one.
//!
//! ## Change Tracking
//!
//! [`PuzzleManifest::upsert`] compares the new entry with the stored one and
//! remembers whether anything differed. The timestamp is only stamped, and
//! the file only saved, when something did. A run with no effective
//! changes leaves `manifest.json` byte-for-byte alone.

use crate::atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const GENERATED_AT_KEY: &str = "generatedAtUtc";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Manifest not found: {0}")]
    Missing(PathBuf),
    #[error("Manifest is not a JSON object: {0}")]
    NotAnObject(PathBuf),
}

/// Latest published artifact for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub version: u64,
    pub url: String,
    pub sha256: String,
}

/// In-memory manifest with change tracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PuzzleManifest {
    pub generated_at_utc: Option<String>,
    /// Entries as stored, so unknown shapes compare as changed.
    puzzles: BTreeMap<String, Value>,
    meta_extra: Map<String, Value>,
    extra: Map<String, Value>,
    changed: bool,
}

impl PuzzleManifest {
    /// Load an existing manifest. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ManifestError::Missing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let value: Value = serde_json::from_str(&content)?;
        Self::from_value(value).ok_or_else(|| ManifestError::NotAnObject(path.to_path_buf()))
    }

    /// Build from parsed JSON, repairing the `meta`/`puzzles` shape.
    ///
    /// Returns `None` if the top level is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut root) = value else {
            return None;
        };
        let mut meta_extra = match root.remove("meta") {
            Some(Value::Object(meta)) => meta,
            _ => Map::new(),
        };
        let generated_at_utc = match meta_extra.remove(GENERATED_AT_KEY) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        let puzzles = match root.remove("puzzles") {
            Some(Value::Object(puzzles)) => puzzles.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Some(Self {
            generated_at_utc,
            puzzles,
            meta_extra,
            extra: root,
            changed: false,
        })
    }

    /// The stored entry for `date_key`, if it has the expected shape.
    pub fn entry(&self, date_key: &str) -> Option<ManifestEntry> {
        self.puzzles
            .get(date_key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// Insert or replace the entry for `date_key`.
    ///
    /// Returns `true` if the stored value differed.
    pub fn upsert(
        &mut self,
        date_key: &str,
        entry: &ManifestEntry,
    ) -> Result<bool, ManifestError> {
        let new_value = serde_json::to_value(entry)?;
        let differs = self.puzzles.get(date_key) != Some(&new_value);
        if differs {
            self.puzzles.insert(date_key.to_string(), new_value);
            self.changed = true;
        }
        Ok(differs)
    }

    /// Whether any upsert changed an entry.
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    /// Record `now` as the generation time.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.generated_at_utc = Some(format_timestamp(now));
    }

    pub fn to_value(&self) -> Value {
        let mut meta = self.meta_extra.clone();
        if let Some(ts) = &self.generated_at_utc {
            meta.insert(GENERATED_AT_KEY.to_string(), Value::String(ts.clone()));
        }
        let mut root = self.extra.clone();
        root.insert("meta".to_string(), Value::Object(meta));
        root.insert(
            "puzzles".to_string(),
            Value::Object(self.puzzles.clone().into_iter().collect()),
        );
        Value::Object(root)
    }

    /// 2-space indented JSON with a trailing newline.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ManifestError> {
        let mut bytes = serde_json::to_vec_pretty(&self.to_value())?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Atomically write the manifest to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        atomic::write_atomic(path, &self.to_json_bytes()?)?;
        Ok(())
    }
}

/// Second-precision ISO-8601 UTC with a `Z` suffix.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
