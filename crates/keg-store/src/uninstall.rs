//! Keg removal
//!
//! Uninstalling by either name of a migrated package removes the real keg
//! and every alias pointing at it.

use crate::cellar::{CellarEntry, InstallStore};
use crate::error::{StoreError, StoreResult};
use crate::fs::FsOps;
use serde::Serialize;
use std::path::PathBuf;

/// What an uninstall removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallReport {
    /// Name of the real keg directory
    pub keg: String,
    /// Removed keg directory
    pub removed_keg: PathBuf,
    /// Removed aliases
    pub removed_aliases: Vec<PathBuf>,
}

/// Attempts to lock a stable view of the keg and its aliases
const PLAN_ATTEMPTS: usize = 3;

/// Keg and aliases an uninstall will remove
#[derive(Debug, PartialEq, Eq)]
struct Removal {
    keg: String,
    keg_path: PathBuf,
    aliases: Vec<PathBuf>,
}

impl Removal {
    fn names(&self) -> Vec<String> {
        self.aliases
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .chain(std::iter::once(self.keg.clone()))
            .collect()
    }
}

impl<F: FsOps> InstallStore<F> {
    /// Remove the package installed as `name`
    ///
    /// `name` may be the real keg or an alias to it. The keg and alias
    /// locks are held while the cellar is re-read and for the whole removal.
    /// Aliases are removed before the keg.
    ///
    /// # Errors
    /// - [`StoreError::NotInstalled`] if nothing is installed as `name` or
    ///   the alias is dangling
    /// - [`StoreError::Conflict`] if the cellar keeps changing underneath
    /// - [`StoreError::Io`] if removal fails
    pub fn uninstall(&self, name: &str) -> StoreResult<UninstallReport> {
        let mut planned = self.plan_removal(name)?;
        for _ in 0..PLAN_ATTEMPTS {
            let names = planned.names();
            let lock_names: Vec<&str> = names.iter().map(String::as_str).collect();
            let locks = self.lock(&lock_names)?;

            let current = self.plan_removal(name)?;
            if current != planned {
                tracing::debug!(formula = name, "cellar changed while locking, retrying");
                drop(locks);
                planned = current;
                continue;
            }

            tracing::info!(keg = %planned.keg, aliases = planned.aliases.len(), "uninstalling");
            for alias in &planned.aliases {
                self.ops()
                    .remove_link(alias)
                    .map_err(|e| StoreError::io_error(alias, e))?;
            }
            self.ops()
                .remove_dir_all(&planned.keg_path)
                .map_err(|e| StoreError::io_error(&planned.keg_path, e))?;

            return Ok(UninstallReport {
                keg: planned.keg,
                removed_keg: planned.keg_path,
                removed_aliases: planned.aliases,
            });
        }
        Err(StoreError::conflict(
            self.entry_path(name),
            "cellar changed during uninstall",
        ))
    }

    fn plan_removal(&self, name: &str) -> StoreResult<Removal> {
        let keg_path = match self.entry(name)? {
            CellarEntry::Missing => return Err(StoreError::NotInstalled(name.to_string())),
            CellarEntry::Keg(path) => path,
            CellarEntry::Alias { path, .. } => {
                let resolved = std::fs::canonicalize(&path)
                    .map_err(|_| StoreError::NotInstalled(name.to_string()))?;
                let file_name = resolved
                    .file_name()
                    .ok_or_else(|| StoreError::conflict(&path, "alias resolves to cellar root"))?;
                let keg_path = self.entry_path(&file_name.to_string_lossy());
                if !self.entry(&file_name.to_string_lossy())?.is_keg() {
                    return Err(StoreError::conflict(&path, "alias does not resolve into the cellar"));
                }
                keg_path
            }
        };
        let keg = keg_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let aliases = self.aliases_of(&keg_path)?;
        Ok(Removal {
            keg,
            keg_path,
            aliases,
        })
    }
}
