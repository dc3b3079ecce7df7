//! Engine configuration
//!
//! Every path the engine touches comes from [`EngineConfig`]. Paths left
//! unset are derived from `prefix`.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default installation prefix
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Paths of one package manager installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Installation prefix
    pub prefix: PathBuf,
    /// Cellar root; `<prefix>/Cellar` when unset
    pub cellar: Option<PathBuf>,
    /// Core catalog checkout; `<prefix>/Library/Core` when unset
    pub core_catalog: Option<PathBuf>,
    /// Directory of tap checkouts; `<prefix>/Library/Taps` when unset
    pub taps_root: Option<PathBuf>,
    /// Directory for formula lock files; `<prefix>/var/keg/locks` when unset
    pub lock_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Configuration with every path under `prefix`
    #[inline]
    #[must_use]
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            cellar: None,
            core_catalog: None,
            taps_root: None,
            lock_dir: None,
        }
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] on syntax errors or unknown keys.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// With cellar root
    #[inline]
    #[must_use]
    pub fn with_cellar(mut self, cellar: impl Into<PathBuf>) -> Self {
        self.cellar = Some(cellar.into());
        self
    }

    /// With core catalog checkout
    #[inline]
    #[must_use]
    pub fn with_core_catalog(mut self, core_catalog: impl Into<PathBuf>) -> Self {
        self.core_catalog = Some(core_catalog.into());
        self
    }

    /// With tap checkouts directory
    #[inline]
    #[must_use]
    pub fn with_taps_root(mut self, taps_root: impl Into<PathBuf>) -> Self {
        self.taps_root = Some(taps_root.into());
        self
    }

    /// With lock directory
    #[inline]
    #[must_use]
    pub fn with_lock_dir(mut self, lock_dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = Some(lock_dir.into());
        self
    }

    /// Effective cellar root
    #[must_use]
    pub fn cellar_path(&self) -> PathBuf {
        self.cellar.clone().unwrap_or_else(|| self.prefix.join("Cellar"))
    }

    /// Effective core catalog checkout
    #[must_use]
    pub fn core_catalog_path(&self) -> PathBuf {
        self.core_catalog
            .clone()
            .unwrap_or_else(|| self.prefix.join("Library").join("Core"))
    }

    /// Effective tap checkouts directory
    #[must_use]
    pub fn taps_root_path(&self) -> PathBuf {
        self.taps_root
            .clone()
            .unwrap_or_else(|| self.prefix.join("Library").join("Taps"))
    }

    /// Effective lock directory
    #[must_use]
    pub fn lock_dir_path(&self) -> PathBuf {
        self.lock_dir
            .clone()
            .unwrap_or_else(|| self.prefix.join("var").join("keg").join("locks"))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
