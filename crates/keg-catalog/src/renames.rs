//! Rename declarations and the merged rename map
//!
//! [`RenameDeclarations`] is the raw `(old, new)` sequence one authority
//! publishes. [`RenameMapLoader`] validates every authority's declarations
//! and merges them into [`RenameMaps`], keyed by [`Authority`].

use crate::authority::{validate_formula_name, Authority};
use crate::catalog::CatalogSet;
use crate::error::{CatalogError, CatalogResult};
use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One authority's rename declarations, in file order
///
/// Deserializes from a JSON object (`{"old": "new"}`) without collapsing
/// repeated keys, so the loader can reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameDeclarations(Vec<(String, String)>);

impl RenameDeclarations {
    /// Create from explicit pairs
    #[inline]
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// Append a declaration
    pub fn push(&mut self, old_name: impl Into<String>, new_name: impl Into<String>) {
        self.0.push((old_name.into(), new_name.into()));
    }

    /// Declared pairs
    #[inline]
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Number of declarations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for RenameDeclarations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = RenameDeclarations;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping old formula names to new ones")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((old, new)) = map.next_entry::<String, String>()? {
                    pairs.push((old, new));
                }
                Ok(RenameDeclarations(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

/// A single validated rename: `authority` renamed `old_name` to `new_name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameEntry {
    /// Declaring authority
    pub authority: Authority,
    /// Name the formula was installed under
    pub old_name: String,
    /// Name the authority now uses
    pub new_name: String,
}

impl RenameEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(authority: Authority, old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            authority,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

impl fmt::Display for RenameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.authority, self.old_name, self.new_name)
    }
}

/// Validated rename maps for every known authority
///
/// Authorities without declarations are present with an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMaps {
    maps: BTreeMap<Authority, IndexMap<String, String>>,
}

impl RenameMaps {
    /// New name `authority` declares for `old_name`
    #[must_use]
    pub fn get(&self, authority: &Authority, old_name: &str) -> Option<&str> {
        self.maps
            .get(authority)
            .and_then(|map| map.get(old_name))
            .map(String::as_str)
    }

    /// Rename entry `authority` declares for `old_name`
    #[must_use]
    pub fn entry(&self, authority: &Authority, old_name: &str) -> Option<RenameEntry> {
        self.get(authority, old_name)
            .map(|new_name| RenameEntry::new(authority.clone(), old_name, new_name))
    }

    /// The full map of one authority
    #[inline]
    #[must_use]
    pub fn for_authority(&self, authority: &Authority) -> Option<&IndexMap<String, String>> {
        self.maps.get(authority)
    }

    /// Authorities that declare a rename for `old_name`
    pub fn authorities_renaming<'a>(
        &'a self,
        old_name: &'a str,
    ) -> impl Iterator<Item = &'a Authority> + 'a {
        self.maps
            .iter()
            .filter(move |(_, map)| map.contains_key(old_name))
            .map(|(authority, _)| authority)
    }

    /// Iterate authorities and their maps, core first
    pub fn iter(&self) -> impl Iterator<Item = (&Authority, &IndexMap<String, String>)> {
        self.maps.iter()
    }

    /// Total number of rename entries across authorities
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.values().map(IndexMap::len).sum()
    }

    /// Check if no authority declares any rename
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and insert one authority's declarations
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateRename`] or [`CatalogError::InvalidRename`].
    pub fn insert(
        &mut self,
        authority: Authority,
        declarations: &RenameDeclarations,
    ) -> CatalogResult<()> {
        let map = validate(&authority, declarations)?;
        self.maps.insert(authority, map);
        Ok(())
    }
}

impl Serialize for RenameMaps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.maps.len()))?;
        for (authority, map) in &self.maps {
            out.serialize_entry(&authority.to_string(), map)?;
        }
        out.end()
    }
}

fn validate(
    authority: &Authority,
    declarations: &RenameDeclarations,
) -> CatalogResult<IndexMap<String, String>> {
    let mut map = IndexMap::with_capacity(declarations.len());
    for (old, new) in declarations.pairs() {
        if validate_formula_name(old).is_err() || validate_formula_name(new).is_err() {
            return Err(CatalogError::invalid_rename(authority, old, new, "not a valid formula name"));
        }
        if old == new {
            return Err(CatalogError::invalid_rename(authority, old, new, "renames to itself"));
        }
        if map.insert(old.clone(), new.clone()).is_some() {
            return Err(CatalogError::DuplicateRename {
                authority: authority.clone(),
                old_name: old.clone(),
            });
        }
    }

    // Following a chain can take at most map.len() steps unless it loops
    for (old, new) in &map {
        let mut current = new;
        for _ in 0..map.len() {
            match map.get(current) {
                Some(next) if next == old => {
                    return Err(CatalogError::invalid_rename(authority, old, new, "rename cycle"));
                }
                Some(next) => current = next,
                None => break,
            }
        }
    }

    Ok(map)
}

/// Loads rename declarations from every catalog and merges them
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameMapLoader;

impl RenameMapLoader {
    /// Create loader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load and validate the declarations of every catalog in `catalogs`
    ///
    /// # Errors
    /// The first declaration or IO error aborts the load; no partial map is
    /// returned.
    pub fn load(&self, catalogs: &CatalogSet) -> CatalogResult<RenameMaps> {
        let mut maps = RenameMaps::default();
        for catalog in catalogs.iter() {
            let declarations = catalog.rename_declarations()?;
            maps.insert(catalog.authority().clone(), &declarations)?;
            tracing::debug!(
                authority = %catalog.authority(),
                renames = declarations.len(),
                "loaded rename declarations"
            );
        }
        Ok(maps)
    }
}
