//! The generation run.
//!
//! Ties the stages together for one pass over the content table:
//!
//! ```text
//! table ──► classify rows ──► reconcile ──► render artifact ──► write artifact
//!                                │                   │
//!                                ▼                   ▼
//!                        write back to row     upsert manifest
//!                                │                   │
//!                                ▼                   ▼
//!                       rewrite table (if dirty)  save manifest (if changed)
//! ```
//!
//! Rows are processed in table order, one at a time. Blank rows and rows
//! without a day key are counted and skipped. Day keys must be unique across
//! processed rows; a duplicate aborts the run before anything is written.
//!
//! ## Idempotence
//!
//! Running twice over an unchanged table produces the same artifacts and the
//! same manifest, and the second run reports no updates: every stored hash
//! matches, every manifest entry compares equal, so neither the table nor the
//! manifest is rewritten and the manifest timestamp is not touched.
//!
//! ## Dry Run
//!
//! With `dry_run` set nothing is written (not even the puzzles directory),
//! but every decision is computed the same way, so the report shows exactly
//! what a real run would do.

use crate::artifact::{self, ArtifactError};
use crate::config::{ColumnConfig, GenerateConfig};
use crate::manifest::{ManifestEntry, ManifestError, PuzzleManifest};
use crate::normalize::strip_wrapping_quotes;
use crate::reconcile::{self, ReconcileError, VersionDecision};
use crate::table::{self, Table, TableError, TableWriteOutcome};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("Duplicate day key {date_key:?} in rows {first} and {second}")]
    DuplicateDateKey {
        date_key: String,
        first: usize,
        second: usize,
    },
}

/// Why a row ended up at its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowReason {
    Bumped,
    HashInitialized,
    Unchanged,
}

impl From<VersionDecision> for RowReason {
    fn from(decision: VersionDecision) -> Self {
        match decision {
            VersionDecision::Bumped { .. } => RowReason::Bumped,
            VersionDecision::HashInitialized => RowReason::HashInitialized,
            VersionDecision::Unchanged => RowReason::Unchanged,
        }
    }
}

impl fmt::Display for RowReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowReason::Bumped => write!(f, "content changed -> version bumped"),
            RowReason::HashInitialized => write!(f, "initialized contentHash"),
            RowReason::Unchanged => write!(f, "no content change"),
        }
    }
}

/// What happened to one processed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub date_key: String,
    pub version: u64,
    /// The artifact file did not exist before this run.
    pub created: bool,
    /// The artifact file existed and was rewritten (same bytes if unchanged).
    pub refreshed: bool,
    pub bumped: bool,
    pub reason: RowReason,
}

impl RowOutcome {
    pub fn file_name(&self) -> String {
        artifact::artifact_file_name(&self.date_key, self.version)
    }
}

/// Fate of the source table at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Unchanged,
    Updated,
    /// Dry run: the table would have been rewritten.
    WouldUpdate,
    /// The table was locked; the update was written here instead.
    Fallback(PathBuf),
}

/// Summary of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub dry_run: bool,
    pub csv_path: PathBuf,
    pub manifest_path: PathBuf,
    pub rows: Vec<RowOutcome>,
    pub skipped_blank: usize,
    pub skipped_missing_date: usize,
    pub table: TableStatus,
    /// Any manifest entry changed (saved, or would be in a dry run).
    pub manifest_updated: bool,
}

impl GenerateReport {
    pub fn created(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|r| r.created)
    }

    pub fn bumped(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|r| r.bumped)
    }

    pub fn refreshed(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|r| r.refreshed && !r.created)
    }

    /// Whether the run changed (or would change) anything at all.
    pub fn has_updates(&self) -> bool {
        self.manifest_updated || self.table != TableStatus::Unchanged
    }
}

/// Result of `check`: what a run would do, without needing the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub rows: usize,
    pub skipped_blank: usize,
    pub skipped_missing_date: usize,
    pub unchanged: usize,
    pub hash_missing: usize,
    /// `(day key, version it would be bumped to)`
    pub would_bump: Vec<(String, u64)>,
    pub hash_column_missing: bool,
}

/// Rows sorted into processable and skipped.
struct RowPlan {
    /// `(row index, day key)` in table order.
    process: Vec<(usize, String)>,
    skipped_blank: usize,
    skipped_missing_date: usize,
}

fn plan_rows(table: &Table, columns: &ColumnConfig) -> Result<RowPlan, GenerateError> {
    let mut plan = RowPlan {
        process: Vec::new(),
        skipped_blank: 0,
        skipped_missing_date: 0,
    };
    let mut seen: HashMap<String, usize> = HashMap::new();

    for index in 0..table.rows.len() {
        let row = table.row(index);
        if !row.has_content() {
            plan.skipped_blank += 1;
            continue;
        }
        let date_key = strip_wrapping_quotes(row.get(&columns.date_key));
        if date_key.is_empty() {
            plan.skipped_missing_date += 1;
            continue;
        }
        if let Some(&first) = seen.get(&date_key) {
            return Err(GenerateError::DuplicateDateKey {
                date_key,
                first: first + 1,
                second: index + 1,
            });
        }
        seen.insert(date_key.clone(), index);
        plan.process.push((index, date_key));
    }
    Ok(plan)
}

fn load_table(config: &GenerateConfig) -> Result<(Table, bool), GenerateError> {
    let mut table = table::read_table(&config.csv_path)?;
    table.require_columns(&config.columns.required())?;
    let hash_column_added = table.ensure_column(&config.columns.content_hash);
    Ok((table, hash_column_added))
}

/// Run the pipeline, stamping the manifest with the current time.
pub fn generate(config: &GenerateConfig) -> Result<GenerateReport, GenerateError> {
    generate_with_clock(config, Utc::now)
}

/// [`generate`] with an injectable clock for the manifest timestamp.
pub fn generate_with_clock<C>(
    config: &GenerateConfig,
    clock: C,
) -> Result<GenerateReport, GenerateError>
where
    C: FnOnce() -> DateTime<Utc>,
{
    generate_with(config, clock, |from, to| fs::rename(from, to))
}

/// [`generate_with_clock`] with the table's replace step supplied by the
/// caller, as in [`table::write_table_with`].
pub fn generate_with<C, R>(
    config: &GenerateConfig,
    clock: C,
    replace_table: R,
) -> Result<GenerateReport, GenerateError>
where
    C: FnOnce() -> DateTime<Utc>,
    R: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let columns = &config.columns;
    let (mut table, hash_column_added) = load_table(config)?;
    let plan = plan_rows(&table, columns)?;

    // Every row is reconciled before anything is written.
    let reconciled = plan
        .process
        .into_iter()
        .map(|(index, date_key)| {
            let r = reconcile::reconcile(&table.row(index), columns)?;
            Ok((index, date_key, r))
        })
        .collect::<Result<Vec<_>, ReconcileError>>()?;

    let mut manifest = PuzzleManifest::load(&config.manifest_path)?;
    if !config.dry_run {
        fs::create_dir_all(&config.puzzles_dir)?;
    }

    let mut table_dirty = hash_column_added;
    let mut rows = Vec::with_capacity(reconciled.len());

    for (index, date_key, reconciled) in reconciled {
        reconcile::write_back(&mut table, index, columns, &reconciled);
        table_dirty |= reconciled.changes_row();

        let artifact = artifact::render(&reconciled.record)?;
        let existed_before = artifact.path_in(&config.puzzles_dir).exists();
        if !config.dry_run {
            artifact.write_to(&config.puzzles_dir)?;
        }

        let version = reconciled.record.version;
        let entry_changed = manifest.upsert(
            &date_key,
            &ManifestEntry {
                version,
                url: artifact.url.clone(),
                sha256: artifact.sha256.clone(),
            },
        )?;

        debug!(
            date_key = %date_key,
            version,
            decision = ?reconciled.decision,
            entry_changed,
            "row reconciled"
        );

        rows.push(RowOutcome {
            date_key,
            version,
            created: !existed_before,
            refreshed: existed_before,
            bumped: reconciled.bumped(),
            reason: reconciled.decision.into(),
        });
    }

    let manifest_updated = manifest.has_changes();
    if manifest_updated {
        manifest.stamp(clock());
    }

    let table_status = if !table_dirty {
        TableStatus::Unchanged
    } else if config.dry_run {
        TableStatus::WouldUpdate
    } else {
        match table::write_table_with(&config.csv_path, &table, replace_table)? {
            TableWriteOutcome::Replaced => TableStatus::Updated,
            TableWriteOutcome::Fallback(path) => TableStatus::Fallback(path),
        }
    };

    if manifest_updated && !config.dry_run {
        manifest.save(&config.manifest_path)?;
    }

    info!(
        rows = rows.len(),
        dry_run = config.dry_run,
        manifest_updated,
        "generation finished"
    );

    Ok(GenerateReport {
        dry_run: config.dry_run,
        csv_path: config.csv_path.clone(),
        manifest_path: config.manifest_path.clone(),
        rows,
        skipped_blank: plan.skipped_blank,
        skipped_missing_date: plan.skipped_missing_date,
        table: table_status,
        manifest_updated,
    })
}

/// Validate the table and report what a run would do. Writes nothing.
pub fn check(config: &GenerateConfig) -> Result<CheckReport, GenerateError> {
    let columns = &config.columns;
    let (table, hash_column_added) = load_table(config)?;
    let plan = plan_rows(&table, columns)?;

    let mut report = CheckReport {
        rows: plan.process.len(),
        skipped_blank: plan.skipped_blank,
        skipped_missing_date: plan.skipped_missing_date,
        hash_column_missing: hash_column_added,
        ..CheckReport::default()
    };

    for (index, date_key) in plan.process {
        let reconciled = reconcile::reconcile(&table.row(index), columns)?;
        match reconciled.decision {
            VersionDecision::Unchanged => report.unchanged += 1,
            VersionDecision::HashInitialized => report.hash_missing += 1,
            VersionDecision::Bumped { .. } => {
                report.would_bump.push((date_key, reconciled.record.version));
            }
        }
    }
    Ok(report)
}
