//! Write-then-rename file replacement.
//!
//! Every file the pipeline produces (puzzle artifacts, the manifest, the
//! rewritten table) is written to a `{name}.tmp` sibling first and renamed
//! over the target, so readers never observe a half-written file.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The temporary sibling used while replacing `path`: `{name}.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically replace `path` with `bytes`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    replace_with(path, bytes, |from, to| fs::rename(from, to))
}

/// Like [`write_atomic`], with the final rename step supplied by the caller.
///
/// The temporary file is removed if either step fails.
pub fn replace_with<F>(path: &Path, bytes: &[u8], rename: F) -> io::Result<()>
where
    F: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let tmp = temp_path(path);
    let result = fs::write(&tmp, bytes).and_then(|()| rename(&tmp, path));
    if result.is_err() && tmp.exists() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Whether an I/O error means another process holds the file open.
///
/// Spreadsheet applications on Windows lock the CSV they have open, which
/// surfaces as access-denied or sharing-violation errors on replace. The
/// latter has no `ErrorKind` of its own and is matched by raw OS code.
pub fn is_locked(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
    ) || is_os_lock_violation(err)
}

/// `ERROR_SHARING_VIOLATION` (32) or `ERROR_LOCK_VIOLATION` (33).
#[cfg(windows)]
fn is_os_lock_violation(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(32 | 33))
}

#[cfg(not(windows))]
fn is_os_lock_violation(_err: &io::Error) -> bool {
    false
}
