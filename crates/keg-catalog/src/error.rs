//! Error types for catalog loading
//!
//! Everything here is a load-time failure: once a [`CatalogError`] is
//! returned no name resolution may be attempted for the run.

use crate::authority::Authority;
use std::path::PathBuf;

/// Errors raised while parsing names or loading catalog state
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// An authority declares the same old name twice
    #[error("{authority} declares a rename for '{old_name}' more than once")]
    DuplicateRename {
        /// Declaring authority
        authority: Authority,
        /// Old name that appears twice
        old_name: String,
    },

    /// A rename entry is self-referential, cyclic or malformed
    #[error("{authority} declares an invalid rename '{old_name}' -> '{new_name}': {reason}")]
    InvalidRename {
        /// Declaring authority
        authority: Authority,
        /// Old name of the entry
        old_name: String,
        /// New name of the entry
        new_name: String,
        /// Why the entry was rejected
        reason: String,
    },

    /// Formula name is empty or contains forbidden characters
    #[error("invalid formula name: '{0}'")]
    InvalidName(String),

    /// Tap identifier is not of the form `owner/repo`
    #[error("invalid tap identifier: '{0}' (expected owner/repo)")]
    InvalidTap(String),

    /// Two catalogs claim the same authority
    #[error("authority {0} registered more than once")]
    DuplicateAuthority(Authority),

    /// Catalog set was built without a core catalog first
    #[error("catalog set requires the core catalog, got {0}")]
    MissingCore(Authority),

    /// Rename declarations file is not a JSON object of strings
    #[error("syntax error in {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error while reading catalog files
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid rename error
    pub fn invalid_rename(
        authority: &Authority,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRename {
            authority: authority.clone(),
            old_name: old_name.into(),
            new_name: new_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from the rename declarations themselves
    /// rather than from the filesystem
    #[inline]
    #[must_use]
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRename { .. } | Self::InvalidRename { .. } | Self::Syntax { .. }
        )
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
