//! Testing utilities for the keg-migrate workspace
//!
//! A [`Sandbox`] is a throwaway installation prefix with a core catalog, one
//! tap and a cellar, plus helpers to install and rename `libpng`-style
//! fixtures.

#![allow(missing_docs)]

use keg_catalog::{Authority, TapId, FORMULA_DIR, RENAMES_FILE};
use keg_core::{EngineConfig, TriggerCoordinator};
use keg_store::{InstallReceipt, InstallStore, RECEIPT_FILE};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TAP_OWNER: &str = "vladshablinsky";
pub const TAP_REPO: &str = "taptest";
pub const VERSION: &str = "1.6.21";

pub fn tap() -> Authority {
    TapId::new(TAP_OWNER, TAP_REPO)
        .expect("fixture tap id is valid")
        .into()
}

/// Temporary prefix with core, one tap and an empty cellar
///
/// Both catalogs start out defining `libpng` and `zint`.
#[derive(Debug)]
pub struct Sandbox {
    dir: TempDir,
    config: EngineConfig,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create sandbox dir");
        let config = EngineConfig::new(dir.path().join("prefix"));
        let sandbox = Self { dir, config };

        for name in ["libpng", "zint"] {
            sandbox.define(&Authority::Core, name);
            sandbox.define(&tap(), name);
        }
        std::fs::create_dir_all(sandbox.cellar()).expect("create cellar");
        sandbox
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cellar(&self) -> PathBuf {
        self.config.cellar_path()
    }

    pub fn keg(&self, name: &str) -> PathBuf {
        self.cellar().join(name)
    }

    pub fn coordinator(&self) -> TriggerCoordinator {
        TriggerCoordinator::new(self.config.clone())
    }

    pub fn store(&self) -> InstallStore {
        InstallStore::new(self.cellar(), self.config.lock_dir_path())
    }

    /// Directory formula files of `authority` live in
    pub fn formula_dir(&self, authority: &Authority) -> PathBuf {
        match authority {
            Authority::Core => self.config.core_catalog_path().join(FORMULA_DIR),
            Authority::Tap(_) => self.catalog_root(authority),
        }
    }

    pub fn catalog_root(&self, authority: &Authority) -> PathBuf {
        match authority {
            Authority::Core => self.config.core_catalog_path(),
            Authority::Tap(id) => self
                .config
                .taps_root_path()
                .join(id.owner())
                .join(id.checkout_dir_name()),
        }
    }

    pub fn define(&self, authority: &Authority, name: &str) {
        let dir = self.formula_dir(authority);
        std::fs::create_dir_all(&dir).expect("create formula dir");
        std::fs::write(dir.join(format!("{name}.rb")), format!("class Formula_{name}; end\n"))
            .expect("write formula");
    }

    pub fn undefine(&self, authority: &Authority, name: &str) {
        std::fs::remove_file(self.formula_dir(authority).join(format!("{name}.rb"))).expect("remove formula");
    }

    pub fn write_renames(&self, authority: &Authority, json: &str) {
        let root = self.catalog_root(authority);
        std::fs::create_dir_all(&root).expect("create catalog root");
        std::fs::write(root.join(RENAMES_FILE), json).expect("write renames");
    }

    /// Rename `old` to `new` in `authority`: new formula file, old one removed,
    /// declaration added
    pub fn rename(&self, authority: &Authority, old: &str, new: &str) {
        self.define(authority, new);
        self.undefine(authority, old);
        let mut declarations = serde_json::Map::new();
        declarations.insert(old.to_string(), serde_json::Value::from(new));
        self.write_renames(authority, &serde_json::Value::Object(declarations).to_string());
    }

    pub fn rename_core(&self) {
        self.rename(&Authority::Core, "libpng", "newlibpng");
    }

    pub fn rename_tap(&self) {
        self.rename(&tap(), "libpng", "newlibpng");
    }

    /// Install `name` from `source` at `version`
    pub fn install_version(&self, name: &str, version: &str, source: Authority) {
        let dir = self.keg(name).join(version);
        std::fs::create_dir_all(dir.join("bin")).expect("create keg");
        std::fs::write(dir.join("bin").join(name), "#!/bin/sh\n").expect("write keg file");
        let receipt = InstallReceipt::new(name, version, source)
            .with_extra("poured_from_bottle", serde_json::Value::Bool(true));
        let path = dir.join(RECEIPT_FILE);
        std::fs::write(&path, receipt.to_bytes(&path).expect("serialize receipt")).expect("write receipt");
    }

    pub fn install(&self, name: &str, source: Authority) {
        self.install_version(name, VERSION, source);
    }

    pub fn install_core(&self) {
        self.install("libpng", Authority::Core);
    }

    pub fn install_tap(&self) {
        self.install("libpng", tap());
    }

    pub fn is_alias(&self, name: &str) -> bool {
        std::fs::symlink_metadata(self.keg(name)).is_ok_and(|m| m.file_type().is_symlink())
    }

    pub fn exists(&self, name: &str) -> bool {
        std::fs::symlink_metadata(self.keg(name)).is_ok()
    }

    pub fn migration_occurred(&self) -> bool {
        self.is_alias("libpng")
    }

    /// Panic unless `old` aliases the real keg `new`
    pub fn assert_migrated(&self, old: &str, new: &str) {
        let new_keg = self.keg(new);
        let meta = std::fs::symlink_metadata(&new_keg).expect("new keg exists");
        assert!(meta.is_dir(), "{new} must be a real directory");
        assert!(self.is_alias(old), "{old} must be an alias");
        assert_eq!(
            std::fs::canonicalize(self.keg(old)).expect("resolve old"),
            std::fs::canonicalize(&new_keg).expect("resolve new"),
        );
    }

    pub fn assert_uninstalled(&self, names: &[&str]) {
        for name in names {
            assert!(!self.exists(name), "{name} must be gone");
        }
    }

    /// Receipt of the newest version under `name`, following aliases
    pub fn receipt(&self, name: &str) -> InstallReceipt {
        self.store()
            .receipt(name)
            .expect("read receipt")
            .expect("receipt exists")
    }

    /// Sorted listing of cellar entry names
    pub fn cellar_listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.cellar())
            .expect("list cellar")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
