//! Catalog sources
//!
//! A [`Catalog`] exposes one authority's current formula names and its rename
//! declarations. [`FsCatalog`] reads a checked-out catalog directory;
//! [`StaticCatalog`] holds the same data in memory.

use crate::authority::{Authority, TapId};
use crate::error::{CatalogError, CatalogResult};
use crate::renames::RenameDeclarations;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File holding an authority's rename declarations
pub const RENAMES_FILE: &str = "formula_renames.json";

/// Subdirectory holding formula definitions
pub const FORMULA_DIR: &str = "Formula";

/// Extension of formula definition files
const FORMULA_EXT: &str = "rb";

/// One authority's catalog state
pub trait Catalog: std::fmt::Debug {
    /// Authority this catalog speaks for
    fn authority(&self) -> &Authority;

    /// Names of formulae the catalog currently defines
    ///
    /// Unreadable catalogs are treated as empty.
    fn formula_names(&self) -> BTreeSet<String>;

    /// Rename declarations in declaration order
    ///
    /// # Errors
    /// Returns an error if the declarations exist but cannot be read or parsed.
    fn rename_declarations(&self) -> CatalogResult<RenameDeclarations>;
}

/// Catalog backed by a checked-out directory
#[derive(Debug, Clone)]
pub struct FsCatalog {
    authority: Authority,
    root: PathBuf,
}

impl FsCatalog {
    /// Catalog rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(authority: Authority, root: impl Into<PathBuf>) -> Self {
        Self {
            authority,
            root: root.into(),
        }
    }

    /// Root directory of the checkout
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories scanned for formula files
    ///
    /// Core keeps formulae under `Formula/`; taps may use either the
    /// repository root or `Formula/`.
    fn formula_dirs(&self) -> Vec<PathBuf> {
        match self.authority {
            Authority::Core => vec![self.root.join(FORMULA_DIR)],
            Authority::Tap(_) => vec![self.root.clone(), self.root.join(FORMULA_DIR)],
        }
    }
}

impl Catalog for FsCatalog {
    fn authority(&self) -> &Authority {
        &self.authority
    }

    fn formula_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for dir in self.formula_dirs() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(authority = %self.authority, dir = %dir.display(), "cannot read catalog: {e}");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(FORMULA_EXT) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_string());
                }
            }
        }
        names
    }

    fn rename_declarations(&self) -> CatalogResult<RenameDeclarations> {
        let path = self.root.join(RENAMES_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(RenameDeclarations::default()),
            Err(e) => return Err(CatalogError::io_error(path, e)),
        };
        serde_json::from_str(&content).map_err(|source| CatalogError::Syntax { path, source })
    }
}

/// In-memory catalog
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    authority: Authority,
    formulae: BTreeSet<String>,
    renames: RenameDeclarations,
}

impl StaticCatalog {
    /// Empty catalog for `authority`
    #[inline]
    #[must_use]
    pub fn new(authority: Authority) -> Self {
        Self {
            authority,
            formulae: BTreeSet::new(),
            renames: RenameDeclarations::default(),
        }
    }

    /// Add defined formulae
    #[must_use]
    pub fn with_formulae<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formulae.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a rename declaration
    #[must_use]
    pub fn with_rename(mut self, old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        self.renames.push(old_name, new_name);
        self
    }
}

impl Catalog for StaticCatalog {
    fn authority(&self) -> &Authority {
        &self.authority
    }

    fn formula_names(&self) -> BTreeSet<String> {
        self.formulae.clone()
    }

    fn rename_declarations(&self) -> CatalogResult<RenameDeclarations> {
        Ok(self.renames.clone())
    }
}

/// The set of authorities known to this installation
///
/// Always starts with the core catalog; taps follow in registration order.
#[derive(Debug)]
pub struct CatalogSet {
    catalogs: Vec<Box<dyn Catalog>>,
}

impl CatalogSet {
    /// Create a set holding only the core catalog
    ///
    /// # Errors
    /// Returns [`CatalogError::MissingCore`] if `core` is not the core authority.
    pub fn new(core: impl Catalog + 'static) -> CatalogResult<Self> {
        if !core.authority().is_core() {
            return Err(CatalogError::MissingCore(core.authority().clone()));
        }
        Ok(Self {
            catalogs: vec![Box::new(core)],
        })
    }

    /// Register a tap catalog
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateAuthority`] if the authority is
    /// already registered (including a second core).
    pub fn add(&mut self, catalog: impl Catalog + 'static) -> CatalogResult<()> {
        if self.get(catalog.authority()).is_some() {
            return Err(CatalogError::DuplicateAuthority(catalog.authority().clone()));
        }
        self.catalogs.push(Box::new(catalog));
        Ok(())
    }

    /// Builder form of [`CatalogSet::add`]
    ///
    /// # Errors
    /// See [`CatalogSet::add`].
    pub fn with(mut self, catalog: impl Catalog + 'static) -> CatalogResult<Self> {
        self.add(catalog)?;
        Ok(self)
    }

    /// Discover the core checkout and every tap under `taps_root`
    ///
    /// Taps live at `<taps_root>/<owner>/homebrew-<repo>`. Directories that do
    /// not follow that layout are ignored. A missing `taps_root` means no taps.
    ///
    /// # Errors
    /// Returns an IO error if `taps_root` exists but cannot be listed.
    pub fn discover(core_root: &Path, taps_root: &Path) -> CatalogResult<Self> {
        let mut set = Self::new(FsCatalog::new(Authority::Core, core_root))?;

        let owners = match std::fs::read_dir(taps_root) {
            Ok(owners) => owners,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(set),
            Err(e) => return Err(CatalogError::io_error(taps_root, e)),
        };

        let mut found = Vec::new();
        for owner in owners.flatten() {
            let owner_path = owner.path();
            if !owner_path.is_dir() {
                continue;
            }
            let repos = std::fs::read_dir(&owner_path)
                .map_err(|e| CatalogError::io_error(&owner_path, e))?;
            for repo in repos.flatten() {
                let repo_path = repo.path();
                if !repo_path.is_dir() {
                    continue;
                }
                let owner_name = owner.file_name().to_string_lossy().into_owned();
                let repo_name = repo.file_name().to_string_lossy().into_owned();
                let Some(short) = repo_name.strip_prefix("homebrew-") else {
                    tracing::debug!(path = %repo_path.display(), "skipping non-tap directory");
                    continue;
                };
                match TapId::new(owner_name, short) {
                    Ok(id) => found.push((id, repo_path)),
                    Err(e) => tracing::warn!(path = %repo_path.display(), "skipping tap: {e}"),
                }
            }
        }

        found.sort();
        for (id, path) in found {
            set.add(FsCatalog::new(Authority::Tap(id), path))?;
        }
        Ok(set)
    }

    /// Catalog for a given authority
    #[must_use]
    pub fn get(&self, authority: &Authority) -> Option<&dyn Catalog> {
        self.catalogs
            .iter()
            .find(|c| c.authority() == authority)
            .map(|c| c.as_ref())
    }

    /// Iterate catalogs, core first
    pub fn iter(&self) -> impl Iterator<Item = &dyn Catalog> {
        self.catalogs.iter().map(|c| c.as_ref())
    }

    /// Authorities in registration order
    pub fn authorities(&self) -> impl Iterator<Item = &Authority> {
        self.catalogs.iter().map(|c| c.authority())
    }

    /// Number of registered authorities (core included)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// Always false: a set holds at least the core catalog
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tap(s: &str) -> Authority {
        s.parse().unwrap()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "class Formula; end\n").unwrap();
    }

    #[test]
    fn fs_catalog_core_reads_formula_dir() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("Formula/libpng.rb"));
        touch(&dir.path().join("Formula/zint.rb"));
        touch(&dir.path().join("Formula/README.md"));
        touch(&dir.path().join("stray.rb"));

        let catalog = FsCatalog::new(Authority::Core, dir.path());
        let names: Vec<_> = catalog.formula_names().into_iter().collect();
        assert_eq!(names, vec!["libpng", "zint"]);
    }

    #[test]
    fn fs_catalog_tap_reads_root_and_formula_dir() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("libpng.rb"));
        touch(&dir.path().join("Formula/zlib.rb"));

        let catalog = FsCatalog::new(tap("a/b"), dir.path());
        let names = catalog.formula_names();
        assert!(names.contains("libpng"));
        assert!(names.contains("zlib"));
    }

    #[test]
    fn fs_catalog_missing_dir_is_empty() {
        let catalog = FsCatalog::new(Authority::Core, "/nonexistent/keg-catalog");
        assert!(catalog.formula_names().is_empty());
        assert!(catalog.rename_declarations().unwrap().is_empty());
    }

    #[test]
    fn fs_catalog_reads_renames() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(RENAMES_FILE), r#"{"libpng": "newlibpng"}"#).unwrap();

        let decls = FsCatalog::new(Authority::Core, dir.path())
            .rename_declarations()
            .unwrap();
        assert_eq!(decls.len(), 1);
    }

    #[test]
    fn fs_catalog_rejects_malformed_renames() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(RENAMES_FILE), r#"["libpng"]"#).unwrap();

        let result = FsCatalog::new(Authority::Core, dir.path()).rename_declarations();
        assert!(matches!(result, Err(CatalogError::Syntax { .. })));
    }

    #[test]
    fn catalog_set_requires_core() {
        let result = CatalogSet::new(StaticCatalog::new(tap("a/b")));
        assert!(matches!(result, Err(CatalogError::MissingCore(_))));
    }

    #[test]
    fn catalog_set_rejects_duplicate_authority() {
        let mut set = CatalogSet::new(StaticCatalog::new(Authority::Core)).unwrap();
        set.add(StaticCatalog::new(tap("a/b"))).unwrap();

        let dup = set.add(StaticCatalog::new(tap("a/b")));
        assert!(matches!(dup, Err(CatalogError::DuplicateAuthority(_))));
        let second_core = set.add(StaticCatalog::new(Authority::Core));
        assert!(matches!(second_core, Err(CatalogError::DuplicateAuthority(_))));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn catalog_set_discovers_taps() {
        let dir = TempDir::new().unwrap();
        let core = dir.path().join("core");
        let taps = dir.path().join("Taps");
        touch(&core.join("Formula/libpng.rb"));
        touch(&taps.join("zed/homebrew-extra/foo.rb"));
        touch(&taps.join("vladshablinsky/homebrew-taptest/libpng.rb"));
        fs::create_dir_all(taps.join("vladshablinsky/not-a-tap")).unwrap();

        let set = CatalogSet::discover(&core, &taps).unwrap();
        let authorities: Vec<String> = set.authorities().map(ToString::to_string).collect();
        assert_eq!(
            authorities,
            vec!["core", "vladshablinsky/taptest", "zed/extra"]
        );
    }

    #[test]
    fn catalog_set_discover_skips_core_named_tap() {
        let dir = TempDir::new().unwrap();
        let core = dir.path().join("core");
        let taps = dir.path().join("Taps");
        touch(&core.join("Formula/libpng.rb"));
        touch(&taps.join("homebrew/homebrew-core/Formula/libpng.rb"));
        touch(&taps.join("homebrew/homebrew-homebrew/libpng.rb"));
        touch(&taps.join("homebrew/homebrew-cask/foo.rb"));

        let set = CatalogSet::discover(&core, &taps).unwrap();
        let authorities: Vec<String> = set.authorities().map(ToString::to_string).collect();
        assert_eq!(authorities, vec!["core", "homebrew/cask"]);
    }

    #[test]
    fn catalog_set_discover_without_taps_root() {
        let dir = TempDir::new().unwrap();
        let set = CatalogSet::discover(dir.path(), &dir.path().join("missing")).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.get(&Authority::Core).is_some());
    }
}
