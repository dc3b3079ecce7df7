//! Results of manual requests and automatic sweeps

use keg_resolve::Decision;
use keg_store::MigrationOutcome;
use serde::Serialize;

/// Result of a successful manual `migrate` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrateReport {
    /// What the resolver decided
    pub decision: Decision,
    /// What the executor did; `None` for a dry run
    pub outcome: Option<MigrationOutcome>,
}

impl MigrateReport {
    /// Check if this was a dry run
    #[inline]
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Package left alone by a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPackage {
    /// Installed name
    pub name: String,
    /// Why it was skipped
    pub reason: String,
}

/// Package whose migration failed during a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPackage {
    /// Installed name
    pub name: String,
    /// Failure message
    pub error: String,
}

/// Outcome of an automatic sweep over every installed package
///
/// Resolution problems never fail a sweep; only migrations that were
/// attempted and did not complete land in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Packages moved to a new name
    pub migrated: Vec<MigrationOutcome>,
    /// Packages with nothing to do
    pub skipped: Vec<SkippedPackage>,
    /// Packages whose migration failed and was rolled back
    pub failed: Vec<FailedPackage>,
}

impl SweepReport {
    /// Check if no migration failed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Record a skipped package
    pub fn skip(&mut self, name: impl Into<String>, reason: impl ToString) {
        self.skipped.push(SkippedPackage {
            name: name.into(),
            reason: reason.to_string(),
        });
    }

    /// Record a failed package
    pub fn fail(&mut self, name: impl Into<String>, error: impl ToString) {
        self.failed.push(FailedPackage {
            name: name.into(),
            error: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_fails_only_on_failed_migrations() {
        let mut report = SweepReport::default();
        report.skip("zint", "nothing to do");
        assert!(report.is_success());

        report.fail("libpng", "disk full");
        assert!(!report.is_success());
        assert_eq!(report.failed[0].name, "libpng");
    }
}
