// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-temp-then-rename: every persisted file either fully updates or
//! keeps its previous contents.

use std::path::{Path, PathBuf};

/// Replace the contents of `path` with `bytes`, or leave it untouched.
///
/// Writes `<path>.tmp` in the same directory, then renames over `path`.
/// On any error the temp file is removed and the original error surfaced.
/// Creating the parent directory is the caller's responsibility.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path_for(path);
    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
