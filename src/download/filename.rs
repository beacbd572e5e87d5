//! Local file name checks.
//!
//! Listing names become path components under the output directory, so
//! anything that could escape it is refused rather than rewritten.

use std::path::{Path, PathBuf};

/// Characters never allowed in a listed file name.
const FORBIDDEN_CHARS: [char; 3] = ['/', '\\', '\0'];

/// Whether `name` is usable as a single path component.
#[must_use]
pub fn is_safe_file_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(FORBIDDEN_CHARS)
}

/// Joins `name` onto `dir` when it is a safe single component.
#[must_use]
pub fn destination_for(dir: &Path, name: &str) -> Option<PathBuf> {
    is_safe_file_name(name).then(|| dir.join(name))
}
