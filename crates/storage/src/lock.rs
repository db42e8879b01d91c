// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-path advisory lock files with stale detection.
//!
//! The lock for `<target>` is the existence of `<target>.lock`, created with
//! an exclusive-create open. Cooperating processes on the same host respect
//! it; a lock older than [`STALE_LOCK_THRESHOLD`] is presumed abandoned and
//! taken over. Operations spanning multiple files must acquire locks in
//! ascending lexicographic path order.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Locks whose mtime is older than this are presumed abandoned.
pub const STALE_LOCK_THRESHOLD: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out waiting for lock on {path}")]
    Timeout { path: PathBuf },
    #[error("lock io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Acquisition tuning. Defaults: 20 retries at 100ms.
#[derive(Debug, Clone)]
pub struct LockOptions {
    pub retries: u32,
    pub retry_delay: Duration,
    pub stale_after: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            retries: 20,
            retry_delay: Duration::from_millis(100),
            stale_after: STALE_LOCK_THRESHOLD,
        }
    }
}

/// RAII guard for one advisory lock. Dropping releases the lock; a missing
/// lock file on release is not an error.
#[derive(Debug)]
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquire the lock for `target` with default options.
    pub fn acquire(target: &Path) -> Result<Self, LockError> {
        Self::acquire_with(target, &LockOptions::default())
    }

    /// Acquire the lock for `target`, retrying on contention and taking over
    /// stale locks.
    pub fn acquire_with(target: &Path, opts: &LockOptions) -> Result<Self, LockError> {
        let lock_path = lock_path_for(target);
        let mut attempts = 0u32;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(mut file) => {
                    // Owner pid, for humans debugging a wedged lock
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { lock_path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if is_stale(&lock_path, opts.stale_after) {
                        // Re-check before removal: another waiter may have
                        // reclaimed and re-created it between the two reads.
                        if is_stale(&lock_path, opts.stale_after) {
                            warn!(lock = %lock_path.display(), "removing stale lock");
                            match std::fs::remove_file(&lock_path) {
                                Ok(()) => continue,
                                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                                Err(source) => {
                                    return Err(LockError::Io { path: lock_path, source })
                                }
                            }
                        }
                        continue;
                    }
                    if attempts >= opts.retries {
                        return Err(LockError::Timeout { path: lock_path });
                    }
                    attempts += 1;
                    std::thread::sleep(opts.retry_delay);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // Parent directory missing: create it and retry
                    if let Some(parent) = lock_path.parent() {
                        std::fs::create_dir_all(parent).map_err(|source| LockError::Io {
                            path: lock_path.clone(),
                            source,
                        })?;
                    }
                }
                Err(source) => return Err(LockError::Io { path: lock_path, source }),
            }
        }
    }

    /// Path of the lock file itself.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.lock_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!(lock = %self.lock_path.display(), error = %e, "lock release failed"),
        }
    }
}

/// Run `op` while holding the lock for `target`. The lock is released on
/// every exit path, including panics unwinding out of `op`.
pub fn with_lock<T>(target: &Path, op: impl FnOnce() -> T) -> Result<T, LockError> {
    let guard = FileLock::acquire(target)?;
    let out = op();
    drop(guard);
    Ok(out)
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut os = target.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}

fn is_stale(lock_path: &Path, stale_after: Duration) -> bool {
    match std::fs::metadata(lock_path).and_then(|m| m.modified()) {
        Ok(mtime) => mtime.elapsed().map(|age| age > stale_after).unwrap_or(false),
        // Gone already, or unreadable: not ours to remove
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
