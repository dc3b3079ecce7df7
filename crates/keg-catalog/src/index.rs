//! Formula membership index
//!
//! Provides [`CatalogIndex`], answering whether an authority currently
//! defines a formula under a literal name. A name renamed away by an
//! authority is no longer defined by it.

use crate::authority::Authority;
use crate::catalog::CatalogSet;
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot of which authority defines which formula names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    by_authority: BTreeMap<Authority, BTreeSet<String>>,
}

impl CatalogIndex {
    /// Create empty index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the current contents of every catalog
    #[must_use]
    pub fn build(catalogs: &CatalogSet) -> Self {
        let mut index = Self::new();
        for catalog in catalogs.iter() {
            let names = catalog.formula_names();
            tracing::debug!(authority = %catalog.authority(), formulae = names.len(), "indexed catalog");
            index.by_authority.insert(catalog.authority().clone(), names);
        }
        index
    }

    /// Record that `authority` defines `name`
    pub fn insert(&mut self, authority: Authority, name: impl Into<String>) {
        self.by_authority
            .entry(authority)
            .or_default()
            .insert(name.into());
    }

    /// Check if `authority` currently defines a formula literally named `name`
    ///
    /// Unknown authorities define nothing.
    #[inline]
    #[must_use]
    pub fn defines(&self, authority: &Authority, name: &str) -> bool {
        self.by_authority
            .get(authority)
            .is_some_and(|names| names.contains(name))
    }

    /// All authorities defining `name`, core first
    #[must_use]
    pub fn authorities_defining(&self, name: &str) -> Vec<Authority> {
        self.by_authority
            .iter()
            .filter(|(_, names)| names.contains(name))
            .map(|(authority, _)| authority.clone())
            .collect()
    }

    /// Number of formula names indexed for `authority`
    #[must_use]
    pub fn formula_count(&self, authority: &Authority) -> usize {
        self.by_authority.get(authority).map_or(0, BTreeSet::len)
    }

    /// Indexed authorities
    pub fn authorities(&self) -> impl Iterator<Item = &Authority> {
        self.by_authority.keys()
    }
}
