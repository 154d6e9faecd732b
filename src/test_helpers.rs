//! Shared test utilities for the puzzle-gen test suite.
//!
//! Provides in-memory table builders, a sample record, and a throwaway
//! workspace (content table, empty manifest, puzzles dir) for pipeline tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let ws = Workspace::new(&[puzzle_row("2024-01-01", "1", "")]);
//! let report = generate_with_clock(&ws.config(), fixed_clock).unwrap();
//!
//! let manifest = read_manifest(&ws.manifest_path());
//! assert_eq!(manifest["puzzles"]["2024-01-01"]["version"], 1);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{ColumnConfig, GenerateConfig};
use crate::puzzle::{Hint, PuzzleRecord};
use crate::table::{self, Delimiter, Table};

// =========================================================================
// Records and rows
// =========================================================================

/// A one-row tab-delimited table with the given `(header, value)` cells.
pub fn row_table(cells: &[(&str, &str)]) -> Table {
    Table {
        header: cells.iter().map(|(h, _)| h.to_string()).collect(),
        rows: vec![cells.iter().map(|(_, v)| v.to_string()).collect()],
        delimiter: Delimiter::Tab,
    }
}

/// A fully populated record: two hints (the first explained), two aliases.
pub fn sample_record(date_key: &str, version: u64) -> PuzzleRecord {
    PuzzleRecord {
        id: date_key.to_string(),
        date_key: date_key.to_string(),
        version,
        category: "Space".into(),
        tags: vec!["moon".into(), "apollo".into()],
        answer_canonical: "Apollo 11".into(),
        answer_aliases: vec!["Apollo XI".into(), "AS-506".into()],
        hints: vec![
            Hint {
                id: "h1".into(),
                index: 0,
                text: "Summer of 1969".into(),
                explanation_text: Some("Landed on July 20th".into()),
            },
            Hint {
                id: "h2".into(),
                index: 1,
                text: "Three crew".into(),
                explanation_text: None,
            },
        ],
        solution_explanation: "First crewed lunar landing.".into(),
    }
}

/// One row of the content table, cell by cell.
#[derive(Debug, Clone)]
pub struct PuzzleRow {
    pub date_key: String,
    pub category: String,
    pub tags: String,
    pub answer_canonical: String,
    pub answer_aliases: String,
    pub hint1: String,
    pub hint1_explanation: String,
    pub hint2: String,
    pub solution_explanation: String,
    pub version: String,
    pub content_hash: String,
}

/// A typical row for `date_key` with the given version and stored hash.
pub fn puzzle_row(date_key: &str, version: &str, content_hash: &str) -> PuzzleRow {
    PuzzleRow {
        date_key: date_key.into(),
        category: "Space".into(),
        tags: "moon; apollo".into(),
        answer_canonical: "Apollo 11".into(),
        answer_aliases: "Apollo XI, AS-506".into(),
        hint1: "Summer of 1969".into(),
        hint1_explanation: "Landed on July 20th".into(),
        hint2: "Three crew".into(),
        solution_explanation: "First crewed lunar landing.".into(),
        version: version.into(),
        content_hash: content_hash.into(),
    }
}

/// A row with every cell empty.
pub fn blank_row() -> PuzzleRow {
    PuzzleRow {
        category: String::new(),
        tags: String::new(),
        answer_canonical: String::new(),
        answer_aliases: String::new(),
        hint1: String::new(),
        hint1_explanation: String::new(),
        hint2: String::new(),
        solution_explanation: String::new(),
        ..puzzle_row("", "", "")
    }
}

fn rows_to_table(rows: &[PuzzleRow]) -> Table {
    let columns = ColumnConfig::default();
    let header = vec![
        columns.date_key,
        columns.category,
        columns.tags,
        columns.answer_canonical,
        columns.answer_aliases,
        "hint1".to_string(),
        "hint1Explanation".to_string(),
        "hint2".to_string(),
        columns.solution_explanation,
        columns.version,
        columns.content_hash,
    ];
    let rows = rows
        .iter()
        .map(|r| {
            vec![
                r.date_key.clone(),
                r.category.clone(),
                r.tags.clone(),
                r.answer_canonical.clone(),
                r.answer_aliases.clone(),
                r.hint1.clone(),
                r.hint1_explanation.clone(),
                r.hint2.clone(),
                r.solution_explanation.clone(),
                r.version.clone(),
                r.content_hash.clone(),
            ]
        })
        .collect();
    Table {
        header,
        rows,
        delimiter: Delimiter::Tab,
    }
}

// =========================================================================
// Workspace
// =========================================================================

/// A temp directory holding `content.tsv`, an empty `manifest.json`, and
/// the (not yet created) `puzzles/` output dir.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new(rows: &[PuzzleRow]) -> Self {
        let bytes = table::render_table(&rows_to_table(rows)).unwrap();
        Self::from_bytes(&bytes)
    }

    /// Workspace with a hand-written content table.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("content.tsv"), bytes).unwrap();
        std::fs::write(dir.path().join("manifest.json"), "{}\n").unwrap();
        Self { dir }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.path().join("content.tsv")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("manifest.json")
    }

    pub fn puzzles_dir(&self) -> PathBuf {
        self.dir.path().join("puzzles")
    }

    pub fn config(&self) -> GenerateConfig {
        GenerateConfig::new(self.csv_path(), self.puzzles_dir(), self.manifest_path())
    }
}

/// 2024-01-01T12:00:00Z, for stable manifest timestamps.
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

// =========================================================================
// Readers
// =========================================================================

pub fn read_manifest(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Table rows as `header -> cell` maps.
pub fn read_table_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let table = table::read_table(path).unwrap();
    table
        .rows
        .iter()
        .map(|row| {
            table
                .header
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
        .collect()
}
