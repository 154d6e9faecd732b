//! # Puzzle Gen
//!
//! Publishes a daily-puzzle content table as immutable, versioned JSON files
//! plus a manifest that points clients at the latest version of each day.
//! The spreadsheet is the data source: one row per day, edited by hand.
//!
//! # Architecture: One Pass Over the Table
//!
//! ```text
//! content.tsv ──► rows ──► PuzzleRecord ──► content hash ──► version decision
//!                                                               │
//!          puzzles/{dateKey}.v{N}.json ◄── artifact ◄───────────┤
//!          manifest.json               ◄── entry    ◄───────────┤
//!          content.tsv (hash/version)  ◄── write-back ◄─────────┘
//! ```
//!
//! Every stage below the table is a pure function of the row, so the version
//! logic is unit-tested without touching the filesystem. I/O happens at the
//! edges: [`table`] reads and rewrites the source, [`artifact`] and
//! [`manifest`] write outputs, and [`generate`] sequences the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`table`] | CSV/TSV reading with delimiter sniffing; write-back with locked-file fallback |
//! | [`normalize`] | Quote stripping and list splitting for spreadsheet cells |
//! | [`puzzle`] | The published record and its version-independent content hash |
//! | [`reconcile`] | Stored hash vs. computed hash → keep, initialize, or bump the version |
//! | [`artifact`] | `{dateKey}.v{version}.json` rendering and checksums |
//! | [`manifest`] | `manifest.json` loading, change-tracked upserts, saving |
//! | [`generate`] | The run itself, plus the read-only `check` |
//! | [`config`] | `puzzle-gen.toml` loading, merging, and validation |
//! | [`atomic`] | Temp-file-and-rename writes |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Versions Follow Content
//!
//! Editors never touch version numbers. The table keeps a `contentHash` per
//! row; when a row's content stops matching it, the version goes up by one.
//! The hash leaves the version out, so a bump does not itself invalidate the
//! hash on the next run.
//!
//! ## Immutable Artifacts
//!
//! A published `{dateKey}.v{N}.json` is never modified or deleted. Clients
//! cache by URL forever; the manifest is the only mutable file they fetch.
//!
//! ## Quiet Reruns
//!
//! Running over an unchanged table rewrites nothing that matters: the
//! manifest keeps its timestamp and the table is left alone. Rerunning after
//! every edit is always safe.

pub mod artifact;
pub mod atomic;
pub mod config;
pub mod generate;
pub mod manifest;
pub mod normalize;
pub mod output;
pub mod puzzle;
pub mod reconcile;
pub mod table;

#[cfg(test)]
pub(crate) mod test_helpers;
