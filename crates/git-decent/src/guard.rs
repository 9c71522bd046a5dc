// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Hook guard
//!
//! Amending from a post-commit hook fires the hook again. A run is skipped
//! when its environment carries the amend marker set on every git process we
//! spawn, and concurrent runs on the same repository are serialised with an
//! exclusive advisory lock. The lock is released on drop, or by the OS when
//! the process dies.

use std::collections::hash_map::DefaultHasher;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use decent_git::AMEND_OPERATION_ENV;
use fs2::FileExt;
use tracing::debug;

use crate::error::CommandError;

/// Exclusive hook lock, released when dropped
#[derive(Debug)]
pub struct HookGuard {
    _file: File,
    path: PathBuf,
}

impl HookGuard {
    /// Guard a hook run for the repository whose git dir is `git_dir`
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Reentrant` when running inside one of our own
    /// rewrites and `CommandError::AlreadyRunning` when another run holds the
    /// lock.
    pub fn acquire(git_dir: &Path) -> anyhow::Result<Self> {
        let marker = std::env::var(AMEND_OPERATION_ENV).ok();
        Self::acquire_with(marker.as_deref(), &lock_path(git_dir))
    }

    /// Guard a hook run given the amend marker value and the lock file
    ///
    /// # Errors
    ///
    /// See [`HookGuard::acquire`]; also fails if the lock file can't be opened.
    pub fn acquire_with(marker: Option<&str>, lock: &Path) -> anyhow::Result<Self> {
        if marker == Some("1") {
            debug!("Amend marker set, skipping");
            return Err(CommandError::Reentrant.into());
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(lock)
            .map_err(|e| anyhow::anyhow!("cannot open lock file {}: {}", lock.display(), e))?;

        file.try_lock_exclusive()
            .map_err(|_| CommandError::AlreadyRunning {
                lock: lock.to_path_buf(),
            })?;

        debug!(lock = %lock.display(), "Acquired hook lock");
        Ok(Self {
            _file: file,
            path: lock.to_path_buf(),
        })
    }

    /// Path of the held lock file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lock file in the temp directory, one per repository
#[must_use]
pub fn lock_path(git_dir: &Path) -> PathBuf {
    let canonical = git_dir.canonicalize().unwrap_or_else(|_| git_dir.to_path_buf());
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    std::env::temp_dir().join(format!("git-decent-{:016x}.lock", hasher.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downcast(err: &anyhow::Error) -> Option<&CommandError> {
        err.downcast_ref::<CommandError>()
    }

    #[test]
    fn test_acquire_and_drop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lock = dir.path().join("hook.lock");

        let guard = HookGuard::acquire_with(None, &lock).expect("first acquire");
        assert_eq!(guard.path(), lock.as_path());

        let err = HookGuard::acquire_with(None, &lock).expect_err("lock is held");
        assert!(matches!(
            downcast(&err),
            Some(CommandError::AlreadyRunning { .. })
        ));

        drop(guard);
        let _again = HookGuard::acquire_with(None, &lock).expect("acquire after drop");
    }

    #[test]
    fn test_marker_skips_before_locking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lock = dir.path().join("hook.lock");

        let err = HookGuard::acquire_with(Some("1"), &lock).expect_err("reentrant");
        assert!(matches!(downcast(&err), Some(CommandError::Reentrant)));
        assert!(!lock.exists());
    }

    #[test]
    fn test_other_marker_values_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lock = dir.path().join("hook.lock");
        let _guard = HookGuard::acquire_with(Some("0"), &lock).expect("not our marker");
    }

    #[test]
    fn test_lock_path_is_per_repository() {
        let a = tempfile::tempdir().expect("tempdir");
        let b = tempfile::tempdir().expect("tempdir");
        assert_eq!(lock_path(a.path()), lock_path(a.path()));
        assert_ne!(lock_path(a.path()), lock_path(b.path()));
        assert!(lock_path(a.path()).starts_with(std::env::temp_dir()));
    }
}
