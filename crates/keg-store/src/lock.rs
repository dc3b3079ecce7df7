//! Per-formula advisory locks
//!
//! A [`FormulaLock`] holds an exclusive `flock`-style lock on
//! `<lock_dir>/<name>.formula.lock` until dropped.

use crate::error::{StoreError, StoreResult};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive advisory lock scoped to one formula name
#[derive(Debug)]
pub struct FormulaLock {
    name: String,
    path: PathBuf,
    file: File,
}

impl FormulaLock {
    /// Block until the lock for `name` is held
    ///
    /// # Errors
    /// Returns [`StoreError::Lock`] if the lock file cannot be created or locked.
    pub fn acquire(lock_dir: &Path, name: &str) -> StoreResult<Self> {
        std::fs::create_dir_all(lock_dir).map_err(|source| StoreError::Lock {
            path: lock_dir.to_path_buf(),
            source,
        })?;
        let path = lock_dir.join(format!("{name}.formula.lock"));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| StoreError::Lock {
                path: path.clone(),
                source,
            })?;
        FileExt::lock_exclusive(&file).map_err(|source| StoreError::Lock {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(formula = name, "lock acquired");
        Ok(Self {
            name: name.to_string(),
            path,
            file,
        })
    }

    /// Locked formula name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FormulaLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(formula = %self.name, "failed to release lock: {e}");
        }
    }
}

/// Locks on several formula names, taken in sorted order
#[derive(Debug)]
pub struct LockSet {
    locks: Vec<FormulaLock>,
}

impl LockSet {
    /// Lock every distinct name in `names`
    ///
    /// Sorting keeps two callers locking overlapping sets from deadlocking.
    ///
    /// # Errors
    /// Returns the first lock error; locks taken so far are released.
    pub fn acquire(lock_dir: &Path, names: &[&str]) -> StoreResult<Self> {
        let mut sorted: Vec<&str> = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let locks = sorted
            .into_iter()
            .map(|name| FormulaLock::acquire(lock_dir, name))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self { locks })
    }

    /// Names currently held
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locks.iter().map(FormulaLock::name)
    }
}
