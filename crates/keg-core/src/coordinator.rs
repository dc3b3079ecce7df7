//! Trigger coordination
//!
//! [`TriggerCoordinator`] is the entry point for both triggers. Each call
//! loads a fresh catalog snapshot, resolves with the trigger's policy and
//! hands resolved renames to the executor.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::report::{MigrateReport, SweepReport};
use keg_catalog::{CatalogIndex, CatalogSet, QualifiedName, RenameMapLoader, RenameMaps};
use keg_resolve::{Decision, NameResolver, NotFoundReason, Trigger};
use keg_store::{
    FsOps, InstallReceipt, InstallStore, MigrationExecutor, MigrationOutcome, OsFs, StoreError,
    UninstallReport,
};

/// Catalog state for one run
#[derive(Debug)]
struct Snapshot {
    maps: RenameMaps,
    index: CatalogIndex,
}

impl Snapshot {
    fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(&self.maps, &self.index)
    }
}

/// Runs manual requests and automatic sweeps against one installation
#[derive(Debug)]
pub struct TriggerCoordinator<F: FsOps = OsFs> {
    config: EngineConfig,
    store: InstallStore<F>,
}

impl TriggerCoordinator<OsFs> {
    /// Create coordinator over the real filesystem
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let store = InstallStore::new(config.cellar_path(), config.lock_dir_path());
        Self { config, store }
    }
}

impl<F: FsOps> TriggerCoordinator<F> {
    /// Create coordinator with a prepared store
    #[inline]
    #[must_use]
    pub fn with_store(config: EngineConfig, store: InstallStore<F>) -> Self {
        Self { config, store }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &InstallStore<F> {
        &self.store
    }

    /// Handle `migrate [authority/]name`
    ///
    /// With `dry_run` the decision is reported and nothing is touched.
    ///
    /// # Errors
    /// - [`EngineError::Catalog`] if catalogs fail to load or validate
    /// - [`EngineError::NotFound`] or [`EngineError::Ambiguous`] from resolution
    /// - [`EngineError::MigrationFailed`] if the executor fails
    pub fn migrate(&self, request: &QualifiedName, dry_run: bool) -> EngineResult<MigrateReport> {
        let snapshot = self.snapshot()?;
        let receipt = self.store.receipt(request.name())?;
        let decision = snapshot
            .resolver()
            .resolve(request, receipt.as_ref(), Trigger::Manual);

        let entry = match &decision {
            Decision::Resolved(entry) => entry.clone(),
            Decision::NoOp => {
                return Ok(MigrateReport {
                    decision,
                    outcome: None,
                })
            }
            Decision::Ambiguous { name, authorities } => {
                return Err(EngineError::Ambiguous {
                    name: name.clone(),
                    authorities: authorities.clone(),
                })
            }
            Decision::NotFound { name, reason } => {
                return Err(EngineError::NotFound {
                    name: name.clone(),
                    reason: reason.clone(),
                })
            }
        };

        if dry_run {
            tracing::info!(rename = %entry, "dry run, not migrating");
            return Ok(MigrateReport {
                decision,
                outcome: None,
            });
        }

        let outcome = MigrationExecutor::new(&self.store)
            .migrate(&entry)
            .map_err(|e| EngineError::migration_failed(&entry.old_name, e))?;
        Ok(MigrateReport {
            decision,
            outcome: Some(outcome),
        })
    }

    /// Post-sync sweep over every installed package
    ///
    /// Packages no rename applies to are skipped silently. A failed
    /// migration is recorded and the sweep continues.
    ///
    /// # Errors
    /// Returns [`EngineError::Catalog`] if catalogs fail to load or validate
    /// and [`EngineError::Store`] if the cellar cannot be listed; no package
    /// is touched in either case.
    pub fn sweep(&self) -> EngineResult<SweepReport> {
        let snapshot = self.snapshot()?;
        let resolver = snapshot.resolver();
        let executor = MigrationExecutor::new(&self.store);
        let mut report = SweepReport::default();

        for receipt in self.store.installed()? {
            let name = receipt.installed_name().to_string();
            let request = match QualifiedName::bare(&name) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(keg = %name, "skipping: {e}");
                    report.skip(name, e);
                    continue;
                }
            };

            let entry = match resolver.resolve(&request, Some(&receipt), Trigger::Automatic) {
                Decision::Resolved(entry) => entry,
                other => {
                    report.skip(name, other);
                    continue;
                }
            };

            match executor.migrate(&entry) {
                Ok(MigrationOutcome::AlreadyMigrated { .. }) => report.skip(name, "already migrated"),
                Ok(outcome) => report.migrated.push(outcome),
                Err(e) => {
                    tracing::warn!(rename = %entry, "automatic migration failed: {e}");
                    report.fail(name, e);
                }
            }
        }

        tracing::info!(
            migrated = report.migrated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "sweep finished"
        );
        Ok(report)
    }

    /// Remove the package installed as `name` and every alias of it
    ///
    /// # Errors
    /// Returns [`EngineError::NotFound`] if nothing is installed as `name`
    /// and [`EngineError::Store`] if removal fails.
    pub fn uninstall(&self, name: &str) -> EngineResult<UninstallReport> {
        self.store.uninstall(name).map_err(|e| match e {
            StoreError::NotInstalled(name) => EngineError::NotFound {
                name,
                reason: NotFoundReason::NotInstalled,
            },
            other => EngineError::Store(other),
        })
    }

    /// Validated rename maps of every authority
    ///
    /// # Errors
    /// Returns [`EngineError::Catalog`] if catalogs fail to load or validate.
    pub fn renames(&self) -> EngineResult<RenameMaps> {
        Ok(self.snapshot()?.maps)
    }

    /// Receipts of every installed package
    ///
    /// # Errors
    /// Returns [`EngineError::Store`] if the cellar cannot be listed.
    pub fn installed(&self) -> EngineResult<Vec<InstallReceipt>> {
        Ok(self.store.installed()?)
    }

    fn snapshot(&self) -> EngineResult<Snapshot> {
        let catalogs = CatalogSet::discover(&self.config.core_catalog_path(), &self.config.taps_root_path())?;
        let maps = RenameMapLoader::new().load(&catalogs)?;
        let index = CatalogIndex::build(&catalogs);
        tracing::debug!(
            authorities = catalogs.len(),
            renames = maps.len(),
            "catalog snapshot loaded"
        );
        Ok(Snapshot { maps, index })
    }
}
