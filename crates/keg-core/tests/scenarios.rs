//! Rename scenarios end to end
//!
//! Designations: CI core installed, TI tap installed, CR core renamed,
//! TR tap renamed.

#![cfg(unix)]

use keg_catalog::{Authority, CatalogError, QualifiedName};
use keg_core::EngineError;
use keg_resolve::NotFoundReason;
use keg_store::MigrationOutcome;
use keg_test_utils::{tap, Sandbox};
use pretty_assertions::assert_eq;

fn request(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

fn migrate(sandbox: &Sandbox, name: &str) -> Result<keg_core::MigrateReport, EngineError> {
    sandbox.coordinator().migrate(&request(name), false)
}

fn migrate_and_uninstall(sandbox: &Sandbox, name: &str) {
    migrate(sandbox, name).unwrap();
    sandbox.assert_migrated("libpng", "newlibpng");
    sandbox.coordinator().uninstall("libpng").unwrap();
    sandbox.assert_uninstalled(&["libpng", "newlibpng"]);
}

fn sweep_and_uninstall(sandbox: &Sandbox) {
    let report = sandbox.coordinator().sweep().unwrap();
    assert!(report.is_success());
    assert_eq!(report.migrated.len(), 1);
    sandbox.assert_migrated("libpng", "newlibpng");
    sandbox.coordinator().uninstall("libpng").unwrap();
    sandbox.assert_uninstalled(&["libpng", "newlibpng"]);
}

#[test]
fn migrate_ci_cr_requires_qualified_name() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    let err = migrate(&sandbox, "libpng").unwrap_err();
    match err {
        EngineError::Ambiguous { name, authorities } => {
            assert_eq!(name, "libpng");
            assert_eq!(authorities, vec![Authority::Core, tap()]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(!sandbox.migration_occurred());

    migrate_and_uninstall(&sandbox, "homebrew/homebrew/libpng");
}

#[test]
fn migrate_ci_tr_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_tap();
    let before = sandbox.cellar_listing();

    let err = migrate(&sandbox, "libpng").unwrap_err();

    assert!(matches!(
        err,
        EngineError::NotFound {
            reason: NotFoundReason::NoRename { authority: Authority::Core },
            ..
        }
    ));
    assert!(!sandbox.migration_occurred());
    assert_eq!(sandbox.cellar_listing(), before);
}

#[test]
fn migrate_ti_cr_is_ambiguous_and_tap_has_no_rename() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_core();

    assert!(migrate(&sandbox, "libpng").unwrap_err().needs_qualified_name());
    let err = migrate(&sandbox, "vladshablinsky/taptest/libpng").unwrap_err();
    assert!(matches!(
        err,
        EngineError::NotFound {
            reason: NotFoundReason::NoRename { .. },
            ..
        }
    ));
    assert!(!sandbox.migration_occurred());
}

#[test]
fn migrate_ti_tr() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_tap();

    migrate_and_uninstall(&sandbox, "libpng");
}

#[test]
fn migrate_ci_cr_tr() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();
    sandbox.rename_tap();

    migrate_and_uninstall(&sandbox, "libpng");
}

#[test]
fn migrate_ti_cr_tr() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_core();
    sandbox.rename_tap();

    migrate(&sandbox, "libpng").unwrap();
    sandbox.assert_migrated("libpng", "newlibpng");
    assert_eq!(sandbox.receipt("newlibpng").source_authority(), &tap());
}

#[test]
fn update_ci_cr() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    sweep_and_uninstall(&sandbox);
}

#[test]
fn update_ci_tr_leaves_install_alone() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_tap();

    let report = sandbox.coordinator().sweep().unwrap();

    assert!(report.is_success());
    assert!(report.migrated.is_empty());
    assert!(!sandbox.migration_occurred());
}

#[test]
fn update_ti_cr_leaves_install_alone() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_core();

    let report = sandbox.coordinator().sweep().unwrap();

    assert!(report.migrated.is_empty());
    assert!(!sandbox.migration_occurred());
}

#[test]
fn update_ti_tr() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_tap();

    sweep_and_uninstall(&sandbox);
}

#[test]
fn update_ci_cr_tr() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();
    sandbox.rename_tap();

    sweep_and_uninstall(&sandbox);
}

#[test]
fn update_ti_cr_tr() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_core();
    sandbox.rename_tap();

    sweep_and_uninstall(&sandbox);
}

#[test]
fn migrating_twice_equals_migrating_once() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    migrate(&sandbox, "core/libpng").unwrap();
    let listing = sandbox.cellar_listing();
    let second = migrate(&sandbox, "core/libpng").unwrap();

    assert!(matches!(second.outcome, Some(MigrationOutcome::AlreadyMigrated { .. })));
    assert_eq!(sandbox.cellar_listing(), listing);
    sandbox.assert_migrated("libpng", "newlibpng");
}

#[test]
fn second_sweep_migrates_nothing() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.install("zint", Authority::Core);
    sandbox.rename_core();

    assert_eq!(sandbox.coordinator().sweep().unwrap().migrated.len(), 1);
    let again = sandbox.coordinator().sweep().unwrap();

    assert!(again.migrated.is_empty());
    assert_eq!(again.skipped.len(), 2);
}

#[test]
fn migration_rewrites_receipt_and_keeps_source() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    migrate(&sandbox, "core/libpng").unwrap();
    let receipt = sandbox.receipt("libpng");

    assert_eq!(receipt.installed_name(), "newlibpng");
    assert_eq!(receipt.source_authority(), &Authority::Core);
    assert_eq!(receipt.extra("poured_from_bottle"), Some(&serde_json::Value::Bool(true)));
}

#[test]
fn dry_run_reports_without_mutating() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    let report = sandbox.coordinator().migrate(&request("core/libpng"), true).unwrap();

    assert!(report.is_dry_run());
    assert_eq!(report.decision.rename().map(|e| e.new_name.as_str()), Some("newlibpng"));
    assert!(!sandbox.migration_occurred());
}

#[test]
fn qualified_request_for_other_source_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_tap();

    let err = migrate(&sandbox, "vladshablinsky/taptest/libpng").unwrap_err();

    assert!(matches!(
        err,
        EngineError::NotFound {
            reason: NotFoundReason::SourceMismatch { .. },
            ..
        }
    ));
    assert!(!sandbox.migration_occurred());
}

#[test]
fn existing_new_keg_supersedes_old() {
    let sandbox = Sandbox::new();
    sandbox.install_version("libpng", "1.6.20", Authority::Core);
    sandbox.install_version("newlibpng", "1.6.21", Authority::Core);
    sandbox.rename_core();

    let report = sandbox.coordinator().sweep().unwrap();

    assert!(matches!(
        report.migrated.as_slice(),
        [MigrationOutcome::Migrated { superseded: true, .. }]
    ));
    sandbox.assert_migrated("libpng", "newlibpng");
    assert_eq!(sandbox.receipt("libpng").version, "1.6.21");
    assert_eq!(sandbox.cellar_listing(), vec!["libpng", "newlibpng"]);
}

#[test]
fn malformed_renames_abort_before_touching_cellar() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.write_renames(&Authority::Core, "{\"libpng\": ");

    let err = sandbox.coordinator().sweep().unwrap_err();

    assert!(matches!(err, EngineError::Catalog(CatalogError::Syntax { .. })));
    assert!(err.is_load_error());
    assert!(!sandbox.migration_occurred());
}

#[test]
fn duplicate_rename_aborts_manual_request() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.write_renames(&tap(), r#"{"libpng": "newlibpng", "libpng": "otherpng"}"#);

    let err = migrate(&sandbox, "libpng").unwrap_err();

    assert!(matches!(err, EngineError::Catalog(CatalogError::DuplicateRename { .. })));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn uninstall_missing_package_is_not_found() {
    let sandbox = Sandbox::new();

    let err = sandbox.coordinator().uninstall("libpng").unwrap_err();

    assert!(matches!(
        err,
        EngineError::NotFound {
            reason: NotFoundReason::NotInstalled,
            ..
        }
    ));
}

#[test]
fn manual_request_for_uninstalled_package_is_not_found() {
    let sandbox = Sandbox::new();
    sandbox.rename_core();

    let err = migrate(&sandbox, "zint").unwrap_err();

    assert!(matches!(
        err,
        EngineError::NotFound {
            reason: NotFoundReason::NotInstalled,
            ..
        }
    ));
}

#[test]
fn renames_lists_every_authority() {
    let sandbox = Sandbox::new();
    sandbox.rename_core();
    sandbox.rename_tap();

    let maps = sandbox.coordinator().renames().unwrap();

    assert_eq!(maps.get(&Authority::Core, "libpng"), Some("newlibpng"));
    assert_eq!(maps.get(&tap(), "libpng"), Some("newlibpng"));
    assert_eq!(maps.len(), 2);
}
