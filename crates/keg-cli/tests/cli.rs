#![cfg(unix)]

use keg_test_utils::Sandbox;
use pretty_assertions::assert_eq;
use std::process::{Command, Output};

fn keg_migrate(sandbox: &Sandbox, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_keg-migrate"))
        .args(args)
        .arg("--prefix")
        .arg(&sandbox.config().prefix)
        .env_remove("RUST_LOG")
        .output()
        .expect("run keg-migrate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn ambiguous_migrate_exits_nonzero_and_suggests_qualifier() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    let output = keg_migrate(&sandbox, &["migrate", "libpng"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("core/libpng"), "{stderr}");
    assert!(!sandbox.migration_occurred());
}

#[test]
fn qualified_migrate_succeeds() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_core();

    let output = keg_migrate(&sandbox, &["migrate", "homebrew/homebrew/libpng"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Migrated libpng to newlibpng\n");
    sandbox.assert_migrated("libpng", "newlibpng");
}

#[test]
fn update_without_renames_is_silent_success() {
    let sandbox = Sandbox::new();
    sandbox.install_core();
    sandbox.rename_tap();

    let output = keg_migrate(&sandbox, &["update"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
    assert!(!sandbox.migration_occurred());
}

#[test]
fn update_json_reports_migration() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_tap();

    let output = keg_migrate(&sandbox, &["update", "--json"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["migrated"][0]["status"], "migrated");
    assert_eq!(report["migrated"][0]["new_name"], "newlibpng");
    assert_eq!(report["failed"].as_array().map(Vec::len), Some(0));
}

#[test]
fn uninstall_removes_both_names() {
    let sandbox = Sandbox::new();
    sandbox.install_tap();
    sandbox.rename_tap();
    assert!(keg_migrate(&sandbox, &["migrate", "libpng"]).status.success());

    let output = keg_migrate(&sandbox, &["uninstall", "libpng"]);

    assert!(output.status.success());
    sandbox.assert_uninstalled(&["libpng", "newlibpng"]);
}

#[test]
fn renames_lists_declarations() {
    let sandbox = Sandbox::new();
    sandbox.rename_core();
    sandbox.rename_tap();

    let output = keg_migrate(&sandbox, &["renames"]);

    assert_eq!(
        stdout(&output),
        "core: libpng -> newlibpng\nvladshablinsky/taptest: libpng -> newlibpng\n"
    );
}

#[test]
fn broken_catalog_exits_with_load_error() {
    let sandbox = Sandbox::new();
    sandbox.write_renames(&keg_catalog::Authority::Core, "[]");

    let output = keg_migrate(&sandbox, &["update"]);

    assert_eq!(output.status.code(), Some(2));
}
