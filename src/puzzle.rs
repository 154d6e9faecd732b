//! The puzzle record and its content fingerprint.
//!
//! A [`PuzzleRecord`] is the canonical form of one table row. It is what gets
//! published as `{dateKey}.v{version}.json` and what the content hash is
//! computed over.
//!
//! ## Content Hash
//!
//! [`content_hash`] identifies *what a puzzle says*, independent of which
//! version number it carries:
//!
//! - `version` is removed before hashing
//! - object keys are sorted (`serde_json`'s default `Map` is key-ordered)
//! - `hints` are ordered by `index`
//! - compact separators, non-ASCII written literally
//! - SHA-256, lowercase hex
//!
//! Two records that differ only in `version` hash identically; any other
//! difference changes the hash. The stored hash in the table is compared
//! against this value to decide whether a version bump is needed.

use crate::config::{ColumnConfig, hint_columns};
use crate::normalize::{split_comma_list, split_semicolon_list, strip_wrapping_quotes};
use crate::table::Row;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// One day's puzzle, as published.
///
/// Field order here is the field order of the published JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    /// Same as `date_key`.
    pub id: String,
    pub date_key: String,
    pub version: u64,
    pub category: String,
    pub tags: Vec<String>,
    pub answer_canonical: String,
    pub answer_aliases: Vec<String>,
    /// Only non-empty hint slots, in slot order.
    pub hints: Vec<Hint>,
    pub solution_explanation: String,
}

/// A hint slot with non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    /// `h1`..`h5`, from the slot position.
    pub id: String,
    /// Zero-based slot position.
    pub index: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_text: Option<String>,
}

impl PuzzleRecord {
    /// The same record carrying a different version.
    pub fn with_version(self, version: u64) -> Self {
        Self { version, ..self }
    }
}

/// Build the canonical record for a table row.
///
/// Every cell is quote-normalized; list cells are split; hint slots with
/// empty text are left out entirely.
pub fn build_record(row: &Row<'_>, columns: &ColumnConfig, version: u64) -> PuzzleRecord {
    let date_key = strip_wrapping_quotes(row.get(&columns.date_key));

    let hints = hint_columns()
        .iter()
        .enumerate()
        .filter_map(|(idx, (text_col, expl_col))| {
            let text = strip_wrapping_quotes(row.get(text_col));
            if text.is_empty() {
                return None;
            }
            let explanation = strip_wrapping_quotes(row.get(expl_col));
            Some(Hint {
                id: format!("h{}", idx + 1),
                index: idx as u32,
                text,
                explanation_text: (!explanation.is_empty()).then_some(explanation),
            })
        })
        .collect();

    PuzzleRecord {
        id: date_key.clone(),
        date_key,
        version,
        category: strip_wrapping_quotes(row.get(&columns.category)),
        tags: split_semicolon_list(row.get(&columns.tags)),
        answer_canonical: strip_wrapping_quotes(row.get(&columns.answer_canonical)),
        answer_aliases: split_comma_list(row.get(&columns.answer_aliases)),
        hints,
        solution_explanation: strip_wrapping_quotes(row.get(&columns.solution_explanation)),
    }
}

/// Version-independent fingerprint of a record. See the module docs.
pub fn content_hash(record: &PuzzleRecord) -> Result<String, serde_json::Error> {
    let mut content = serde_json::to_value(record)?;
    if let Some(fields) = content.as_object_mut() {
        fields.remove("version");
        if let Some(serde_json::Value::Array(hints)) = fields.get_mut("hints") {
            hints.sort_by_key(|h| h.get("index").and_then(|i| i.as_u64()).unwrap_or(0));
        }
    }
    let canonical = serde_json::to_string(&content)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// SHA-256 of `bytes` as a lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
