//! CLI output formatting for generate and check runs.
//!
//! # Information-First Display
//!
//! Output is organized around puzzles (day keys and versions), not files.
//! Each run prints one status line followed by indented detail lines, so
//! the summary reads as an inventory of what was published.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! [OK] Processed 3 puzzles
//!     Created 2024-01-03.v1.json
//!     Bumped 2024-01-02 to v3 (content changed -> version bumped)
//!     Refreshed 2 existing files
//!     Skipped 1 blank row
//!     Table updated: content.tsv
//!     Manifest updated: manifest.json
//! ```
//!
//! In a dry run the prefix is `[DRY RUN]`, verbs become "Would create" and
//! "Would bump", and the refreshed count is left out.
//!
//! ## Check
//!
//! ```text
//! [OK] content.tsv: 3 puzzles ready
//!     1 unchanged
//!     1 missing contentHash
//!     Stale 2024-01-02 (would bump to v4)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::generate::{CheckReport, GenerateReport, TableStatus};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 row`, `2 rows`
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn status_prefix(dry_run: bool) -> &'static str {
    if dry_run { "[DRY RUN]" } else { "[OK]" }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn skipped_lines(skipped_blank: usize, skipped_missing_date: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if skipped_blank > 0 {
        lines.push(format!(
            "{}Skipped {}",
            indent(1),
            count(skipped_blank, "blank row", "blank rows")
        ));
    }
    if skipped_missing_date > 0 {
        lines.push(format!(
            "{}Skipped {} without a day key",
            indent(1),
            count(skipped_missing_date, "row", "rows")
        ));
    }
    lines
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_report(report: &GenerateReport) -> Vec<String> {
    let dry = report.dry_run;
    let mut lines = vec![format!(
        "{} Processed {}",
        status_prefix(dry),
        count(report.rows.len(), "puzzle", "puzzles")
    )];

    let create_verb = if dry { "Would create" } else { "Created" };
    for row in report.created() {
        lines.push(format!("{}{} {}", indent(1), create_verb, row.file_name()));
    }

    let bump_verb = if dry { "Would bump" } else { "Bumped" };
    for row in report.bumped() {
        lines.push(format!(
            "{}{} {} to v{} ({})",
            indent(1),
            bump_verb,
            row.date_key,
            row.version,
            row.reason
        ));
    }

    if !dry {
        let refreshed = report.refreshed().count();
        if refreshed > 0 {
            lines.push(format!(
                "{}Refreshed {}",
                indent(1),
                count(refreshed, "existing file", "existing files")
            ));
        }
    }

    lines.extend(skipped_lines(
        report.skipped_blank,
        report.skipped_missing_date,
    ));

    let csv = display_path(&report.csv_path);
    lines.push(match &report.table {
        TableStatus::Unchanged => format!("{}Table unchanged: {}", indent(1), csv),
        TableStatus::Updated => format!("{}Table updated: {}", indent(1), csv),
        TableStatus::WouldUpdate => format!("{}Table would be updated: {}", indent(1), csv),
        TableStatus::Fallback(path) => format!(
            "{}Table locked, update written to: {}",
            indent(1),
            display_path(path)
        ),
    });

    let manifest = display_path(&report.manifest_path);
    lines.push(match (report.manifest_updated, dry) {
        (false, _) => format!("{}Manifest unchanged: {}", indent(1), manifest),
        (true, false) => format!("{}Manifest updated: {}", indent(1), manifest),
        (true, true) => format!("{}Manifest would be updated: {}", indent(1), manifest),
    });

    lines
}

pub fn print_generate_report(report: &GenerateReport) {
    for line in format_generate_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_report(report: &CheckReport, csv_path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "[OK] {}: {} ready",
        display_path(csv_path),
        count(report.rows, "puzzle", "puzzles")
    )];

    if report.unchanged > 0 {
        lines.push(format!("{}{} unchanged", indent(1), report.unchanged));
    }
    if report.hash_missing > 0 {
        lines.push(format!(
            "{}{} missing contentHash",
            indent(1),
            report.hash_missing
        ));
    }
    for (date_key, version) in &report.would_bump {
        lines.push(format!(
            "{}Stale {} (would bump to v{})",
            indent(1),
            date_key,
            version
        ));
    }
    if report.hash_column_missing {
        lines.push(format!("{}contentHash column would be added", indent(1)));
    }

    lines.extend(skipped_lines(
        report.skipped_blank,
        report.skipped_missing_date,
    ));
    lines
}

pub fn print_check_report(report: &CheckReport, csv_path: &Path) {
    for line in format_check_report(report, csv_path) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{RowOutcome, RowReason};
    use std::path::PathBuf;

    fn outcome(date_key: &str, version: u64, created: bool, reason: RowReason) -> RowOutcome {
        RowOutcome {
            date_key: date_key.into(),
            version,
            created,
            refreshed: !created,
            bumped: reason == RowReason::Bumped,
            reason,
        }
    }

    fn report(dry_run: bool, rows: Vec<RowOutcome>) -> GenerateReport {
        GenerateReport {
            dry_run,
            csv_path: PathBuf::from("content.tsv"),
            manifest_path: PathBuf::from("manifest.json"),
            rows,
            skipped_blank: 0,
            skipped_missing_date: 0,
            table: TableStatus::Unchanged,
            manifest_updated: false,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(0, "row", "rows"), "0 rows");
        assert_eq!(count(1, "row", "rows"), "1 row");
        assert_eq!(count(2, "row", "rows"), "2 rows");
    }

    #[test]
    fn status_prefix_by_mode() {
        assert_eq!(status_prefix(false), "[OK]");
        assert_eq!(status_prefix(true), "[DRY RUN]");
    }

    // =========================================================================
    // Generate report
    // =========================================================================

    #[test]
    fn generate_full_run() {
        let mut r = report(
            false,
            vec![
                outcome("2024-01-01", 1, false, RowReason::Unchanged),
                outcome("2024-01-02", 3, true, RowReason::Bumped),
                outcome("2024-01-03", 1, true, RowReason::HashInitialized),
            ],
        );
        r.skipped_blank = 1;
        r.table = TableStatus::Updated;
        r.manifest_updated = true;

        assert_eq!(
            format_generate_report(&r),
            vec![
                "[OK] Processed 3 puzzles",
                "    Created 2024-01-02.v3.json",
                "    Created 2024-01-03.v1.json",
                "    Bumped 2024-01-02 to v3 (content changed -> version bumped)",
                "    Refreshed 1 existing file",
                "    Skipped 1 blank row",
                "    Table updated: content.tsv",
                "    Manifest updated: manifest.json",
            ]
        );
    }

    #[test]
    fn generate_no_changes() {
        let r = report(
            false,
            vec![outcome("2024-01-01", 1, false, RowReason::Unchanged)],
        );
        assert_eq!(
            format_generate_report(&r),
            vec![
                "[OK] Processed 1 puzzle",
                "    Refreshed 1 existing file",
                "    Table unchanged: content.tsv",
                "    Manifest unchanged: manifest.json",
            ]
        );
    }

    #[test]
    fn generate_dry_run_uses_conditional_wording() {
        let mut r = report(
            true,
            vec![
                outcome("2024-01-01", 2, false, RowReason::Bumped),
                outcome("2024-01-02", 1, true, RowReason::HashInitialized),
            ],
        );
        r.skipped_missing_date = 2;
        r.table = TableStatus::WouldUpdate;
        r.manifest_updated = true;

        assert_eq!(
            format_generate_report(&r),
            vec![
                "[DRY RUN] Processed 2 puzzles",
                "    Would create 2024-01-02.v1.json",
                "    Would bump 2024-01-01 to v2 (content changed -> version bumped)",
                "    Skipped 2 rows without a day key",
                "    Table would be updated: content.tsv",
                "    Manifest would be updated: manifest.json",
            ]
        );
    }

    #[test]
    fn generate_reports_table_fallback() {
        let mut r = report(false, vec![]);
        r.table = TableStatus::Fallback(PathBuf::from("content.updated.tsv"));
        let lines = format_generate_report(&r);
        assert!(lines.contains(&"    Table locked, update written to: content.updated.tsv".to_string()));
    }

    // =========================================================================
    // Check report
    // =========================================================================

    #[test]
    fn check_report_lines() {
        let r = CheckReport {
            rows: 3,
            skipped_blank: 0,
            skipped_missing_date: 1,
            unchanged: 1,
            hash_missing: 1,
            would_bump: vec![("2024-01-02".into(), 4)],
            hash_column_missing: false,
        };
        assert_eq!(
            format_check_report(&r, Path::new("content.tsv")),
            vec![
                "[OK] content.tsv: 3 puzzles ready",
                "    1 unchanged",
                "    1 missing contentHash",
                "    Stale 2024-01-02 (would bump to v4)",
                "    Skipped 1 row without a day key",
            ]
        );
    }

    #[test]
    fn check_report_new_hash_column() {
        let r = CheckReport {
            rows: 1,
            hash_missing: 1,
            hash_column_missing: true,
            ..CheckReport::default()
        };
        let lines = format_check_report(&r, Path::new("content.csv"));
        assert_eq!(lines[0], "[OK] content.csv: 1 puzzle ready");
        assert!(lines.contains(&"    contentHash column would be added".to_string()));
    }
}
