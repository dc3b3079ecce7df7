//! Naming authorities and qualified formula names
//!
//! Provides [`Authority`] (the core catalog or a tap), [`TapId`] and
//! [`QualifiedName`] for parsing user requests such as `owner/repo/name`.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Spellings that all refer to the built-in catalog
const CORE_ALIASES: &[&str] = &["core", "homebrew/core", "homebrew/homebrew"];

/// Identifier of an added third-party catalog (`owner/repo`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TapId {
    owner: String,
    repo: String,
}

impl TapId {
    /// Create a tap identifier from its two components
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidTap`] if either component is empty,
    /// contains characters outside `[A-Za-z0-9._-]`, or the pair spells the
    /// core catalog (`homebrew/core`, `homebrew/homebrew`).
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, CatalogError> {
        let owner = owner.into();
        let repo = repo.into();
        let full = format!("{owner}/{repo}");
        if !is_tap_segment(&owner)
            || !is_tap_segment(&repo)
            || CORE_ALIASES.contains(&full.as_str())
        {
            return Err(CatalogError::InvalidTap(full));
        }
        Ok(Self { owner, repo })
    }

    /// Tap owner (GitHub user or organisation)
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Tap repository short name (without the `homebrew-` prefix)
    #[inline]
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Directory name of the tap checkout under its owner directory
    #[inline]
    #[must_use]
    pub fn checkout_dir_name(&self) -> String {
        format!("homebrew-{}", self.repo)
    }
}

impl Display for TapId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for TapId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !repo.contains('/') => Self::new(owner, repo),
            _ => Err(CatalogError::InvalidTap(s.to_string())),
        }
    }
}

fn is_tap_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// A source of formula definitions and rename declarations
///
/// Exactly one [`Authority::Core`] exists per installation; taps are added
/// by the user. Ordering puts core first, then taps by identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Authority {
    /// The built-in catalog
    Core,
    /// An added third-party catalog
    Tap(TapId),
}

impl Authority {
    /// Check if this is the core catalog
    #[inline]
    #[must_use]
    pub fn is_core(&self) -> bool {
        matches!(self, Self::Core)
    }

    /// Tap identifier, if this is a tap
    #[inline]
    #[must_use]
    pub fn tap(&self) -> Option<&TapId> {
        match self {
            Self::Core => None,
            Self::Tap(id) => Some(id),
        }
    }
}

impl Display for Authority {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Tap(id) => id.fmt(f),
        }
    }
}

impl FromStr for Authority {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if CORE_ALIASES.contains(&s) {
            return Ok(Self::Core);
        }
        s.parse().map(Self::Tap)
    }
}

impl TryFrom<String> for Authority {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Authority> for String {
    fn from(authority: Authority) -> Self {
        authority.to_string()
    }
}

impl From<TapId> for Authority {
    fn from(id: TapId) -> Self {
        Self::Tap(id)
    }
}

/// Check that `name` is usable as a formula name
///
/// # Errors
/// Returns [`CatalogError::InvalidName`] for empty names, names containing a
/// path separator, or names starting with a dot.
pub fn validate_formula_name(name: &str) -> Result<(), CatalogError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '@'));
    if valid {
        Ok(())
    } else {
        Err(CatalogError::InvalidName(name.to_string()))
    }
}

/// A formula name as typed by the user, optionally authority-qualified
///
/// # Examples
/// - `libpng` → unqualified
/// - `core/libpng`, `homebrew/core/libpng` → qualified by [`Authority::Core`]
/// - `owner/repo/libpng` → qualified by the `owner/repo` tap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    qualifier: Option<Authority>,
    name: String,
}

impl QualifiedName {
    /// Unqualified name
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidName`] if `name` is not a valid formula name.
    pub fn bare(name: impl Into<String>) -> Result<Self, CatalogError> {
        let name = name.into();
        validate_formula_name(&name)?;
        Ok(Self {
            qualifier: None,
            name,
        })
    }

    /// Name qualified by an explicit authority
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidName`] if `name` is not a valid formula name.
    pub fn qualified(authority: Authority, name: impl Into<String>) -> Result<Self, CatalogError> {
        let name = name.into();
        validate_formula_name(&name)?;
        Ok(Self {
            qualifier: Some(authority),
            name,
        })
    }

    /// The bare formula name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The authority prefix, if any
    #[inline]
    #[must_use]
    pub fn qualifier(&self) -> Option<&Authority> {
        self.qualifier.as_ref()
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(authority) => write!(f, "{authority}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for QualifiedName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('/') {
            None => Self::bare(s),
            Some((prefix, name)) => {
                let authority = if prefix.contains('/') {
                    prefix.parse()?
                } else if CORE_ALIASES.contains(&prefix) {
                    Authority::Core
                } else {
                    return Err(CatalogError::InvalidName(s.to_string()));
                };
                Self::qualified(authority, name)
            }
        }
    }
}
