//! Error types for the migration engine
//!
//! Wraps catalog and store failures and adds the resolution outcomes a manual
//! request reports as errors.

use keg_catalog::{Authority, CatalogError};
use keg_resolve::NotFoundReason;
use keg_store::StoreError;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Catalog state could not be loaded; nothing was resolved
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Install store could not be read
    #[error("install store error: {0}")]
    Store(#[from] StoreError),

    /// No applicable rename for the requested name
    #[error("no migration for {name}: {reason}")]
    NotFound {
        /// Requested name
        name: String,
        /// Why nothing matched
        reason: NotFoundReason,
    },

    /// Several authorities answer to the bare name
    #[error(
        "{name} is ambiguous between {}; retry with a qualified name such as {}/{name}",
        join(.authorities),
        .authorities.first().map_or_else(|| "core".to_string(), ToString::to_string)
    )]
    Ambiguous {
        /// Requested name
        name: String,
        /// Answering authorities
        authorities: Vec<Authority>,
    },

    /// Migration started but did not complete; the cellar was rolled back
    #[error("migration of {name} failed: {source}")]
    MigrationFailed {
        /// Package being migrated
        name: String,
        /// Underlying store failure
        #[source]
        source: StoreError,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Create migration failure for `name`
    pub fn migration_failed(name: impl Into<String>, source: StoreError) -> Self {
        Self::MigrationFailed {
            name: name.into(),
            source,
        }
    }

    /// Check if retrying with an authority-qualified name may succeed
    #[inline]
    #[must_use]
    pub fn needs_qualified_name(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }

    /// Check if the error came from loading or validating catalogs
    #[inline]
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Catalog(_) | Self::Config(_))
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::Ambiguous { .. } | Self::MigrationFailed { .. } | Self::Store(_) => 1,
            Self::Catalog(_) | Self::Config(_) => 2,
        }
    }
}

fn join(authorities: &[Authority]) -> String {
    authorities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
