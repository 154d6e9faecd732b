//! Version reconciliation.
//!
//! Each row carries the version it was last published at and the content
//! hash of that publication. Comparing the stored hash with a fresh
//! [`content_hash`] decides what happens to the version:
//!
//! | Stored hash | vs. computed | Decision | Version |
//! |-------------|--------------|----------|---------|
//! | empty | n/a | [`VersionDecision::HashInitialized`] | kept |
//! | present | equal | [`VersionDecision::Unchanged`] | kept |
//! | present | different | [`VersionDecision::Bumped`] | +1 |
//!
//! The version is excluded from the hash, so rebuilding the record with the
//! bumped version leaves the hash unchanged and the next run sees a match.

use crate::config::ColumnConfig;
use crate::normalize::{VersionOutOfRange, parse_version, strip_wrapping_quotes};
use crate::puzzle::{PuzzleRecord, build_record, content_hash};
use crate::table::{Row, Table};
use thiserror::Error;

/// Version assumed when the version cell is blank or unparseable.
pub const DEFAULT_VERSION: u64 = 1;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Row {date_key}: {source}")]
    VersionOutOfRange {
        date_key: String,
        source: VersionOutOfRange,
    },
    #[error("Row {date_key}: version {version} cannot be bumped")]
    VersionExhausted { date_key: String, version: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionDecision {
    /// Stored hash matches; nothing to do.
    Unchanged,
    /// No stored hash yet; record it without bumping.
    HashInitialized,
    /// Content changed since `from` was published.
    Bumped { from: u64 },
}

/// A row's final record, its hash, and how the version was decided.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub record: PuzzleRecord,
    pub content_hash: String,
    pub decision: VersionDecision,
}

impl Reconciled {
    pub fn bumped(&self) -> bool {
        matches!(self.decision, VersionDecision::Bumped { .. })
    }

    /// Whether the table needs rewriting to persist this row's state.
    pub fn changes_row(&self) -> bool {
        !matches!(self.decision, VersionDecision::Unchanged)
    }
}

/// Decide the version of one row.
///
/// A bump past `u64::MAX` is an error; the published version never repeats.
pub fn reconcile(
    row: &Row<'_>,
    columns: &ColumnConfig,
) -> Result<Reconciled, ReconcileError> {
    let date_key = || strip_wrapping_quotes(row.get(&columns.date_key));
    let current = parse_version(row.get(&columns.version), DEFAULT_VERSION).map_err(|source| {
        ReconcileError::VersionOutOfRange {
            date_key: date_key(),
            source,
        }
    })?;
    let stored_hash = strip_wrapping_quotes(row.get(&columns.content_hash));

    let record = build_record(row, columns, current);
    let computed = content_hash(&record)?;

    let decision = if stored_hash.is_empty() {
        VersionDecision::HashInitialized
    } else if stored_hash != computed {
        VersionDecision::Bumped { from: current }
    } else {
        VersionDecision::Unchanged
    };

    let record = match decision {
        VersionDecision::Bumped { from } => {
            let next = from
                .checked_add(1)
                .ok_or_else(|| ReconcileError::VersionExhausted {
                    date_key: date_key(),
                    version: from,
                })?;
            record.with_version(next)
        }
        _ => record,
    };

    Ok(Reconciled {
        record,
        content_hash: computed,
        decision,
    })
}

/// Write the reconciled state back into row `index` of `table`.
///
/// The hash cell is always refreshed; the version cell only on a bump, so an
/// unparseable version cell survives until the content actually changes.
pub fn write_back(
    table: &mut Table,
    index: usize,
    columns: &ColumnConfig,
    reconciled: &Reconciled,
) {
    if reconciled.bumped() {
        table.set(index, &columns.version, reconciled.record.version.to_string());
    }
    table.set(index, &columns.content_hash, reconciled.content_hash.clone());
}
