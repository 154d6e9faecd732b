//! Content table I/O.
//!
//! The content source is a spreadsheet export with a header row. Despite the
//! usual `.csv` name, most exports are tab-separated, so the delimiter is
//! sniffed from the first line: a tab anywhere in it means TSV, otherwise CSV.
//!
//! ## Shape
//!
//! A [`Table`] keeps the header and every row as positional string vectors of
//! the same length. Short rows are padded with empty strings and surplus
//! cells beyond the header are dropped, so any column lookup on any row is
//! well-defined.
//!
//! ## Writing Back
//!
//! The pipeline writes version and hash columns back into the source table.
//! [`write_table`] replaces the file atomically. When the table is locked
//! (typically open in a spreadsheet app) the rewrite lands next to it in
//! `{stem}.updated{.ext}` and the run carries on.

use crate::atomic;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Empty CSV/TSV: {0}")]
    Empty(PathBuf),
    #[error("No header detected in: {0}")]
    NoHeader(PathBuf),
    #[error("Missing required column(s): {missing:?}. Present columns: {present:?}")]
    MissingColumns {
        missing: Vec<String>,
        present: Vec<String>,
    },
}

/// Field delimiter of a content table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    /// Tab wins if the line contains one anywhere; comma otherwise.
    pub fn detect(first_line: &str) -> Self {
        if first_line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// A header plus rows, each row exactly as wide as the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: Delimiter,
}

/// Borrowed view of one row with by-name lookups.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    header: &'a [String],
    fields: &'a [String],
}

impl<'a> Row<'a> {
    /// Raw value of `column`, or `""` if the table has no such column.
    pub fn get(&self, column: &str) -> &'a str {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.fields.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether any cell holds something other than whitespace.
    pub fn has_content(&self) -> bool {
        self.fields.iter().any(|v| !v.trim().is_empty())
    }
}

impl Table {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.header.iter().position(|h| h == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Append `column` to the header if absent, padding every row.
    ///
    /// Returns `true` if the column was added.
    pub fn ensure_column(&mut self, column: &str) -> bool {
        if self.has_column(column) {
            return false;
        }
        self.header.push(column.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        true
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row {
            header: &self.header,
            fields: &self.rows[index],
        }
    }

    /// Set a cell by column name. Unknown columns are ignored.
    pub fn set(&mut self, index: usize, column: &str, value: impl Into<String>) {
        if let Some(col) = self.column_index(column) {
            self.rows[index][col] = value.into();
        }
    }

    /// Fail with the full list of missing columns if any are absent.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), TableError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TableError::MissingColumns {
                missing,
                present: self.header.clone(),
            })
        }
    }
}

/// Outcome of writing a table back to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableWriteOutcome {
    /// The original file was replaced.
    Replaced,
    /// The original was locked; the table was written to this path instead.
    Fallback(PathBuf),
}

/// Read a CSV/TSV file. Invalid UTF-8 is replaced, a leading BOM dropped.
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    parse_table(&text, path)
}

/// Parse table text. `source` is only used in error messages.
pub fn parse_table(text: &str, source: &Path) -> Result<Table, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_line) = text.lines().next() else {
        return Err(TableError::Empty(source.to_path_buf()));
    };
    let delimiter = Delimiter::detect(first_line);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.iter().all(String::is_empty) {
        return Err(TableError::NoHeader(source.to_path_buf()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut fields: Vec<String> = record
            .iter()
            .take(header.len())
            .map(str::to_string)
            .collect();
        fields.resize(header.len(), String::new());
        rows.push(fields);
    }

    Ok(Table {
        header,
        rows,
        delimiter,
    })
}

/// Serialize a table with its own delimiter, minimal quoting and `\n` endings.
pub fn render_table(table: &Table) -> Result<Vec<u8>, TableError> {
    let mut writer = WriterBuilder::new()
        .delimiter(table.delimiter.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&table.header)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| TableError::Io(e.into_error()))
}

/// Sibling path used when the table itself cannot be replaced.
///
/// `content.csv` → `content.updated.csv`, `content` → `content.updated`.
pub fn updated_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}.updated.{}", stem, ext.to_string_lossy()),
        None => format!("{}.updated", stem),
    };
    path.with_file_name(name)
}

/// Atomically rewrite `path`, falling back to [`updated_path`] when locked.
pub fn write_table(path: &Path, table: &Table) -> Result<TableWriteOutcome, TableError> {
    write_table_with(path, table, |from, to| fs::rename(from, to))
}

/// [`write_table`] with the replace step supplied by the caller.
pub fn write_table_with<F>(
    path: &Path,
    table: &Table,
    rename: F,
) -> Result<TableWriteOutcome, TableError>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let bytes = render_table(table)?;
    match atomic::replace_with(path, &bytes, rename) {
        Ok(()) => Ok(TableWriteOutcome::Replaced),
        Err(err) if atomic::is_locked(&err) => {
            let fallback = updated_path(path);
            fs::write(&fallback, &bytes)?;
            warn!(
                table = %path.display(),
                fallback = %fallback.display(),
                error = %err,
                "could not overwrite table (file may be open); wrote updated copy instead"
            );
            Ok(TableWriteOutcome::Fallback(fallback))
        }
        Err(err) => Err(err.into()),
    }
}
