//! Cellar access
//!
//! The cellar holds one entry per formula name: a real directory containing
//! version subdirectories, or a symlink aliasing another entry after a
//! rename migration.

use crate::error::{StoreError, StoreResult};
use crate::fs::{FsOps, OsFs};
use crate::lock::LockSet;
use crate::receipt::{InstallReceipt, RECEIPT_FILE};
use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Shape of a cellar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellarEntry {
    /// Nothing exists under the name
    Missing,
    /// A real directory owning installed files
    Keg(PathBuf),
    /// A symlink aliasing another entry
    Alias {
        /// Path of the symlink
        path: PathBuf,
        /// Raw link content
        target: PathBuf,
    },
}

impl CellarEntry {
    /// Check if the entry is a real directory
    #[inline]
    #[must_use]
    pub fn is_keg(&self) -> bool {
        matches!(self, Self::Keg(_))
    }

    /// Check if the entry is a symlink
    #[inline]
    #[must_use]
    pub fn is_alias(&self) -> bool {
        matches!(self, Self::Alias { .. })
    }
}

/// File-system-backed install store
///
/// Holds the cellar root and the directory for per-formula lock files. All
/// mutations go through the [`FsOps`] implementation `F`.
#[derive(Debug, Clone)]
pub struct InstallStore<F: FsOps = OsFs> {
    cellar: PathBuf,
    lock_dir: PathBuf,
    ops: F,
}

impl InstallStore<OsFs> {
    /// Store over the real filesystem
    #[inline]
    #[must_use]
    pub fn new(cellar: impl Into<PathBuf>, lock_dir: impl Into<PathBuf>) -> Self {
        Self::with_ops(cellar, lock_dir, OsFs)
    }
}

impl<F: FsOps> InstallStore<F> {
    /// Store with custom mutation primitives
    #[inline]
    #[must_use]
    pub fn with_ops(cellar: impl Into<PathBuf>, lock_dir: impl Into<PathBuf>, ops: F) -> Self {
        Self {
            cellar: cellar.into(),
            lock_dir: lock_dir.into(),
            ops,
        }
    }

    /// Cellar root
    #[inline]
    #[must_use]
    pub fn cellar(&self) -> &Path {
        &self.cellar
    }

    /// Path of the entry for `name`
    #[inline]
    #[must_use]
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.cellar.join(name)
    }

    /// Mutation primitives
    #[inline]
    pub fn ops(&self) -> &F {
        &self.ops
    }

    /// Take exclusive locks on `names`
    ///
    /// # Errors
    /// Returns [`StoreError::Lock`] if any lock cannot be taken.
    pub fn lock(&self, names: &[&str]) -> StoreResult<LockSet> {
        LockSet::acquire(&self.lock_dir, names)
    }

    /// Classify the entry for `name` without following symlinks
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] for a regular file and
    /// [`StoreError::Io`] for unreadable entries.
    pub fn entry(&self, name: &str) -> StoreResult<CellarEntry> {
        let path = self.entry_path(name);
        let meta = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CellarEntry::Missing),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        if meta.file_type().is_symlink() {
            let target = std::fs::read_link(&path).map_err(|e| StoreError::io_error(&path, e))?;
            Ok(CellarEntry::Alias { path, target })
        } else if meta.is_dir() {
            Ok(CellarEntry::Keg(path))
        } else {
            Err(StoreError::conflict(path, "not a directory"))
        }
    }

    /// Version directories under `name`, oldest first, following an alias
    ///
    /// Ordering compares dotted segments numerically, so `1.10` is newer
    /// than `1.9`.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the entry exists but cannot be listed.
    pub fn versions(&self, name: &str) -> StoreResult<Vec<PathBuf>> {
        let path = self.entry_path(name);
        let entries = match std::fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        let mut versions: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_dir() && !is_hidden(p))
            .collect();
        versions.sort_by(|a, b| compare_versions(&version_of(a), &version_of(b)));
        Ok(versions)
    }

    /// Receipts of every version of `name` that has one
    ///
    /// # Errors
    /// Returns the first unreadable or malformed receipt.
    pub fn receipts(&self, name: &str) -> StoreResult<Vec<(PathBuf, InstallReceipt)>> {
        let mut out = Vec::new();
        for version in self.versions(name)? {
            let path = version.join(RECEIPT_FILE);
            if !path.is_file() {
                tracing::debug!(keg = %version.display(), "version without install receipt");
                continue;
            }
            let receipt = InstallReceipt::read(&path)?;
            out.push((path, receipt));
        }
        Ok(out)
    }

    /// Receipt of the newest installed version of `name`
    ///
    /// Follows an alias, so an old name reports the receipt of the keg it
    /// now points at. `None` means nothing is installed under the name.
    ///
    /// # Errors
    /// See [`InstallStore::receipts`].
    pub fn receipt(&self, name: &str) -> StoreResult<Option<InstallReceipt>> {
        Ok(self.receipts(name)?.pop().map(|(_, receipt)| receipt))
    }

    /// Write `receipt` to `path` atomically
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the write fails.
    pub fn write_receipt(&self, path: &Path, receipt: &InstallReceipt) -> StoreResult<()> {
        let bytes = receipt.to_bytes(path)?;
        self.ops
            .write_atomic(path, &bytes)
            .map_err(|e| StoreError::io_error(path, e))
    }

    /// Names of every real keg directory in the cellar, sorted
    ///
    /// Aliases left behind by migrations are skipped.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the cellar exists but cannot be listed.
    pub fn keg_names(&self) -> StoreResult<Vec<String>> {
        let entries = match std::fs::read_dir(&self.cellar) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io_error(&self.cellar, e)),
        };
        let mut names = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => names.push(name),
                Ok(_) => {}
                Err(e) => tracing::warn!(entry = %entry.path().display(), "cannot stat cellar entry: {e}"),
            }
        }
        names.sort();
        Ok(names)
    }

    /// Receipts of every installed keg (newest version each)
    ///
    /// Kegs without a readable receipt are logged and skipped.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the cellar cannot be listed.
    pub fn installed(&self) -> StoreResult<Vec<InstallReceipt>> {
        let mut out = Vec::new();
        for name in self.keg_names()? {
            match self.receipt(&name) {
                Ok(Some(receipt)) => out.push(receipt),
                Ok(None) => tracing::warn!(keg = %name, "no install receipt, skipping"),
                Err(e) => tracing::warn!(keg = %name, "unreadable install receipt, skipping: {e}"),
            }
        }
        Ok(out)
    }

    /// Aliases in the cellar pointing at the keg `real`
    ///
    /// Matches symlinks that resolve to the same directory, and dangling ones
    /// whose content is the keg's bare name.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the cellar cannot be listed or `real`
    /// cannot be resolved.
    pub fn aliases_of(&self, real: &Path) -> StoreResult<Vec<PathBuf>> {
        let canonical = std::fs::canonicalize(real).map_err(|e| StoreError::io_error(real, e))?;
        let real_name = real.file_name();
        let entries = std::fs::read_dir(&self.cellar).map_err(|e| StoreError::io_error(&self.cellar, e))?;

        let mut aliases = Vec::new();
        for entry in entries.flatten() {
            let is_link = entry.file_type().is_ok_and(|ft| ft.is_symlink());
            if !is_link {
                continue;
            }
            let path = entry.path();
            let resolves = std::fs::canonicalize(&path).is_ok_and(|resolved| resolved == canonical);
            let names = std::fs::read_link(&path).is_ok_and(|target| Some(target.as_os_str()) == real_name);
            if resolves || names {
                aliases.push(path);
            }
        }
        aliases.sort();
        Ok(aliases)
    }
}

fn version_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare version strings segment by segment
///
/// Segments split on `.`, `_` and `-`. Two numeric segments compare as
/// numbers, two text segments as text, and a numeric segment sorts before a
/// text one. A version that is a prefix of another sorts first.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let split = |v: &str| v.split(['.', '_', '-']).map(str::to_owned).collect::<Vec<_>>();
    let (left, right) = (split(a), split(b));

    for (l, r) in left.iter().zip(&right) {
        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => l.cmp(r),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
