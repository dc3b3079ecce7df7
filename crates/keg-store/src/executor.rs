//! Rename migration
//!
//! [`MigrationExecutor`] moves an installed keg from its old name to its new
//! one, leaves a relative symlink at the old name and rewrites receipts. Every
//! mutation is journaled; if any step or the final verification fails the
//! journal is replayed backwards and the cellar is left as it was found.

use crate::cellar::{CellarEntry, InstallStore};
use crate::error::{StoreError, StoreResult};
use crate::fs::{FsOps, OsFs};
use keg_catalog::RenameEntry;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of a successful migration call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The keg now lives under the new name
    Migrated {
        /// Previous name, now an alias
        old_name: String,
        /// Current name
        new_name: String,
        /// An install under the new name already existed and won
        superseded: bool,
        /// Receipts whose name field changed
        receipts_rewritten: usize,
    },
    /// The old name was already an alias; nothing changed
    AlreadyMigrated {
        /// Previous name
        old_name: String,
        /// Current name
        new_name: String,
    },
}

impl MigrationOutcome {
    /// Check if the cellar changed
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Migrated { .. })
    }
}

/// Undo record for one applied step
#[derive(Debug)]
enum Step {
    Moved { from: PathBuf, to: PathBuf },
    Linked(PathBuf),
    ReceiptWritten { path: PathBuf, previous: Vec<u8> },
}

/// Applies rename migrations against an [`InstallStore`]
#[derive(Debug)]
pub struct MigrationExecutor<'a, F: FsOps = OsFs> {
    store: &'a InstallStore<F>,
}

impl<'a, F: FsOps> MigrationExecutor<'a, F> {
    /// Create executor over `store`
    #[inline]
    #[must_use]
    pub fn new(store: &'a InstallStore<F>) -> Self {
        Self { store }
    }

    /// Migrate the keg installed as `entry.old_name` to `entry.new_name`
    ///
    /// Holds the locks of both names for the whole operation. Calling this
    /// again after success returns [`MigrationOutcome::AlreadyMigrated`].
    ///
    /// # Errors
    /// - [`StoreError::NotInstalled`] if nothing is installed as the old name
    /// - [`StoreError::Conflict`] if the new name is taken by a non-keg
    /// - [`StoreError::Postcondition`] if verification fails
    /// - any IO error from the steps; the cellar has been rolled back
    pub fn migrate(&self, entry: &RenameEntry) -> StoreResult<MigrationOutcome> {
        let old_name = entry.old_name.as_str();
        let new_name = entry.new_name.as_str();
        let _locks = self.store.lock(&[old_name, new_name])?;

        let old_path = match self.store.entry(old_name)? {
            CellarEntry::Missing => return Err(StoreError::NotInstalled(old_name.to_string())),
            CellarEntry::Alias { target, .. } => {
                if target != Path::new(new_name) {
                    tracing::warn!(
                        old = old_name,
                        new = new_name,
                        target = %target.display(),
                        "old name is an alias to an unexpected target"
                    );
                }
                tracing::debug!(old = old_name, new = new_name, "already migrated");
                return Ok(MigrationOutcome::AlreadyMigrated {
                    old_name: old_name.to_string(),
                    new_name: new_name.to_string(),
                });
            }
            CellarEntry::Keg(path) => path,
        };

        let superseded = match self.store.entry(new_name)? {
            CellarEntry::Missing => false,
            CellarEntry::Keg(_) => true,
            CellarEntry::Alias { path, .. } => {
                return Err(StoreError::conflict(path, "new name is already an alias"));
            }
        };

        tracing::info!(
            authority = %entry.authority,
            old = old_name,
            new = new_name,
            superseded,
            "migrating renamed formula"
        );

        let mut journal = Vec::new();
        let result = self.apply(entry, &old_path, superseded, &mut journal);
        match result {
            Ok(rewritten) => {
                if superseded {
                    self.discard_staged(&journal);
                }
                tracing::info!(old = old_name, new = new_name, rewritten, "migration complete");
                Ok(MigrationOutcome::Migrated {
                    old_name: old_name.to_string(),
                    new_name: new_name.to_string(),
                    superseded,
                    receipts_rewritten: rewritten,
                })
            }
            Err(e) => {
                tracing::warn!(old = old_name, new = new_name, "migration failed, rolling back: {e}");
                self.rollback(journal);
                Err(e)
            }
        }
    }

    fn apply(
        &self,
        entry: &RenameEntry,
        old_path: &Path,
        superseded: bool,
        journal: &mut Vec<Step>,
    ) -> StoreResult<usize> {
        let ops = self.store.ops();
        let new_path = self.store.entry_path(&entry.new_name);

        let moved_to = if superseded {
            staging_path(self.store.cellar(), &entry.old_name)
        } else {
            new_path.clone()
        };
        if superseded && std::fs::symlink_metadata(&moved_to).is_ok() {
            return Err(StoreError::conflict(&moved_to, "stale staging directory"));
        }
        ops.rename(old_path, &moved_to)
            .map_err(|e| StoreError::io_error(old_path, e))?;
        journal.push(Step::Moved {
            from: old_path.to_path_buf(),
            to: moved_to,
        });

        ops.symlink_dir(Path::new(&entry.new_name), old_path)
            .map_err(|e| StoreError::io_error(old_path, e))?;
        journal.push(Step::Linked(old_path.to_path_buf()));

        let mut rewritten = 0;
        for (path, receipt) in self.store.receipts(&entry.new_name)? {
            if receipt.installed_name() == entry.new_name {
                continue;
            }
            let previous = std::fs::read(&path).map_err(|e| StoreError::io_error(&path, e))?;
            self.store.write_receipt(&path, &receipt.renamed(&entry.new_name))?;
            journal.push(Step::ReceiptWritten { path, previous });
            rewritten += 1;
        }

        self.verify(&entry.old_name, &entry.new_name)?;
        Ok(rewritten)
    }

    /// Check the cellar is in the migrated shape for `old_name -> new_name`
    fn verify(&self, old_name: &str, new_name: &str) -> StoreResult<()> {
        let new_path = match self.store.entry(new_name)? {
            CellarEntry::Keg(path) => path,
            other => {
                return Err(StoreError::postcondition(
                    new_name,
                    format!("expected a keg directory, found {other:?}"),
                ))
            }
        };
        let old_path = match self.store.entry(old_name)? {
            CellarEntry::Alias { path, .. } => path,
            other => {
                return Err(StoreError::postcondition(
                    old_name,
                    format!("expected an alias, found {other:?}"),
                ))
            }
        };

        let resolved = std::fs::canonicalize(&old_path).map_err(|e| StoreError::io_error(&old_path, e))?;
        let expected = std::fs::canonicalize(&new_path).map_err(|e| StoreError::io_error(&new_path, e))?;
        if resolved != expected {
            return Err(StoreError::postcondition(
                old_name,
                format!("alias resolves to {}", resolved.display()),
            ));
        }

        for (path, receipt) in self.store.receipts(new_name)? {
            if receipt.installed_name() != new_name {
                return Err(StoreError::postcondition(
                    new_name,
                    format!("receipt {} still names {}", path.display(), receipt.installed_name()),
                ));
            }
        }
        Ok(())
    }

    fn rollback(&self, journal: Vec<Step>) {
        let ops = self.store.ops();
        for step in journal.into_iter().rev() {
            let undone = match &step {
                Step::ReceiptWritten { path, previous } => ops.write_atomic(path, previous),
                Step::Linked(path) => ops.remove_link(path),
                Step::Moved { from, to } => ops.rename(to, from),
            };
            if let Err(e) = undone {
                tracing::error!(?step, "rollback step failed: {e}");
            }
        }
    }

    fn discard_staged(&self, journal: &[Step]) {
        let staged = journal.iter().find_map(|step| match step {
            Step::Moved { to, .. } => Some(to),
            _ => None,
        });
        if let Some(staged) = staged {
            if let Err(e) = self.store.ops().remove_dir_all(staged) {
                tracing::warn!(path = %staged.display(), "cannot remove superseded keg: {e}");
            }
        }
    }
}

fn staging_path(cellar: &Path, old_name: &str) -> PathBuf {
    cellar.join(format!(".{old_name}.superseded"))
}
