//! Field normalization for table cells.
//!
//! Content tables are exported from spreadsheets and LLM generators that
//! occasionally leave quoting debris behind: a whole value wrapped in quotes,
//! or only the closing half of a pair surviving after punctuation. Every cell
//! read by the pipeline goes through [`strip_wrapping_quotes`] before use.
//!
//! ## Quote Repair Policy
//!
//! Applied to the trimmed value, in this order:
//!
//! | Repair | When | Result |
//! |--------|------|--------|
//! | `Wrapped` | at least 2 chars, same `"` or `'` at both ends | inner text, trimmed (no further rules) |
//! | `OrphanTrailingAfterPunctuation` | ends in `'`, doesn't start with `'`, preceded by `.` `!` `?` | trailing quote dropped |
//! | `LoneTrailing` | ends in `'`, doesn't start with `'`, only `'` in the value | trailing quote dropped |
//! | `LoneLeading` | starts with `'`, doesn't end with `'`, only `'` in the value | leading quote dropped |
//!
//! At most one trailing repair fires; the leading repair is checked against
//! the result. The lone-quote repairs also eat real apostrophes (`'tis`,
//! `dogs'`). That is accepted: the source data does not distinguish them.
//!
//! - `"\"Paris\""` → `Paris`
//! - `"It was 1969.'"` → `It was 1969.`
//! - `"'Moon landing"` → `Moon landing`
//! - `"It's"` → `It's` (quote is interior)

use std::num::IntErrorKind;
use thiserror::Error;
use tracing::{trace, warn};

/// A version cell holding a number too large to represent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("version {0:?} is out of range")]
pub struct VersionOutOfRange(pub String);

/// Named quote repairs, in the order they are considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteRepair {
    Wrapped,
    OrphanTrailingAfterPunctuation,
    LoneTrailing,
    LoneLeading,
}

struct QuoteRule {
    repair: QuoteRepair,
    matches: fn(&str) -> bool,
    apply: fn(&str) -> &str,
}

const TRAILING_RULES: &[QuoteRule] = &[
    QuoteRule {
        repair: QuoteRepair::OrphanTrailingAfterPunctuation,
        matches: is_orphan_after_punctuation,
        apply: drop_last_char,
    },
    QuoteRule {
        repair: QuoteRepair::LoneTrailing,
        matches: is_lone_trailing,
        apply: drop_last_char,
    },
];

const LEADING_RULES: &[QuoteRule] = &[QuoteRule {
    repair: QuoteRepair::LoneLeading,
    matches: is_lone_leading,
    apply: drop_first_char,
}];

/// Strip one layer of wrapping quotes and repair orphaned single quotes.
///
/// See the module docs for the full policy.
pub fn strip_wrapping_quotes(text: &str) -> String {
    let s = text.trim();
    if let Some(inner) = unwrap_matching_pair(s) {
        trace!(repair = ?QuoteRepair::Wrapped, value = s, "quote repair");
        return inner.trim().to_string();
    }
    let s = apply_first(TRAILING_RULES, s);
    let s = apply_first(LEADING_RULES, s);
    s.to_string()
}

/// Unquote, split on `;`, trim, drop empties. Used for `tags`.
pub fn split_semicolon_list(text: &str) -> Vec<String> {
    split_list(text, ';')
}

/// Unquote, split on `,`, trim, drop empties. Used for `answerAliases`.
pub fn split_comma_list(text: &str) -> Vec<String> {
    split_list(text, ',')
}

/// Parse a version cell, falling back to `default` for blank or invalid input.
///
/// Negative numbers are invalid: versions start at 0 or 1 and only grow. A
/// non-blank cell that is discarded is logged. A number too large for `u64`
/// is an error, not a fallback.
pub fn parse_version(text: &str, default: u64) -> Result<u64, VersionOutOfRange> {
    let s = strip_wrapping_quotes(text);
    if s.is_empty() {
        return Ok(default);
    }
    match s.parse::<u64>() {
        Ok(version) => Ok(version),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(VersionOutOfRange(s)),
        Err(_) => {
            warn!(cell = %s, fallback = default, "unparseable version cell, using fallback");
            Ok(default)
        }
    }
}

fn split_list(text: &str, separator: char) -> Vec<String> {
    let s = strip_wrapping_quotes(text);
    s.split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn apply_first<'a>(rules: &[QuoteRule], s: &'a str) -> &'a str {
    match rules.iter().find(|rule| (rule.matches)(s)) {
        Some(rule) => {
            trace!(repair = ?rule.repair, value = s, "quote repair");
            (rule.apply)(s)
        }
        None => s,
    }
}

fn unwrap_matching_pair(s: &str) -> Option<&str> {
    let mut chars = s.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first == last && (first == '"' || first == '\'') {
        Some(&s[first.len_utf8()..s.len() - last.len_utf8()])
    } else {
        None
    }
}

fn has_unopened_trailing_quote(s: &str) -> bool {
    s.ends_with('\'') && !s.starts_with('\'')
}

fn is_orphan_after_punctuation(s: &str) -> bool {
    has_unopened_trailing_quote(s) && char_before_last(s).is_some_and(is_terminal)
}

fn is_lone_trailing(s: &str) -> bool {
    has_unopened_trailing_quote(s) && single_quote_count(s) == 1
}

fn is_lone_leading(s: &str) -> bool {
    s.starts_with('\'') && !s.ends_with('\'') && single_quote_count(s) == 1
}

fn char_before_last(s: &str) -> Option<char> {
    let mut chars = s.chars();
    chars.next_back()?;
    chars.next_back()
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn single_quote_count(s: &str) -> usize {
    s.matches('\'').count()
}

fn drop_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str().trim_end()
}

fn drop_first_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str().trim_start()
}
