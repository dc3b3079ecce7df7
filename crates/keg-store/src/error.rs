//! Error types for the install store
//!
//! Every variant here is a storage-level failure. Callers report them as a
//! failed migration or uninstall; none of them is ever downgraded to a no-op.

use std::path::PathBuf;

/// Errors raised by cellar, receipt and lock operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing is installed under the name
    #[error("{0} is not installed")]
    NotInstalled(String),

    /// Cellar entry has an unexpected shape for the requested operation
    #[error("cellar entry {path} conflicts with migration: {reason}")]
    Conflict { path: PathBuf, reason: String },

    /// A migration finished its steps but the cellar does not look migrated
    #[error("postcondition failed for {name}: {reason}")]
    Postcondition { name: String, reason: String },

    /// Receipt file is not valid JSON or lacks required fields
    #[error("malformed install receipt {path}: {source}")]
    Receipt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Could not take the advisory lock for a formula
    #[error("cannot lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error during a cellar operation
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create conflict error for path
    pub fn conflict(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Conflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create postcondition error
    pub fn postcondition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Postcondition {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_installed_display() {
        let err = StoreError::NotInstalled("libpng".to_string());
        assert_eq!(err.to_string(), "libpng is not installed");
    }

    #[test]
    fn conflict_display_names_path() {
        let err = StoreError::conflict("/cellar/newlibpng", "is a symlink");
        assert!(err.to_string().contains("/cellar/newlibpng"));
        assert!(err.to_string().contains("is a symlink"));
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let err = StoreError::io_error(
            "/cellar",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.source().is_some());
    }
}
