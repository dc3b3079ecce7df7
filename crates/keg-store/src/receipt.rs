//! Install receipts
//!
//! Each installed keg version carries an `INSTALL_RECEIPT.json` recording the
//! name it was installed under and the authority it came from. Fields this
//! crate does not know about are kept verbatim so a rewrite never drops them.

use crate::error::{StoreError, StoreResult};
use keg_catalog::Authority;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the receipt inside a keg version directory
pub const RECEIPT_FILE: &str = "INSTALL_RECEIPT.json";

/// Where an installed formula came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSource {
    /// Authority the formula was installed from
    pub tap: Authority,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Persisted record of how a keg was installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReceipt {
    /// Name the keg is installed under
    pub name: String,

    /// Installed version
    pub version: String,

    /// Source of the formula
    pub source: ReceiptSource,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl InstallReceipt {
    /// Create receipt for a fresh install
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, source: Authority) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: ReceiptSource {
                tap: source,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Name the keg is installed under
    #[inline]
    #[must_use]
    pub fn installed_name(&self) -> &str {
        &self.name
    }

    /// Authority the keg was installed from
    #[inline]
    #[must_use]
    pub fn source_authority(&self) -> &Authority {
        &self.source.tap
    }

    /// Same receipt recorded under another name; source and extra fields kept
    #[must_use]
    pub fn renamed(&self, new_name: impl Into<String>) -> Self {
        Self {
            name: new_name.into(),
            ..self.clone()
        }
    }

    /// Attach an extra top-level field
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Extra top-level field by key
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Read the receipt at `path`
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Receipt`] if it is not a valid receipt.
    pub fn read(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::io_error(path, e))?;
        serde_json::from_str(&content).map_err(|source| StoreError::Receipt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize for writing
    ///
    /// # Errors
    /// Returns [`StoreError::Receipt`] if serialization fails.
    pub fn to_bytes(&self, path: &Path) -> StoreResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|source| StoreError::Receipt {
            path: path.to_path_buf(),
            source,
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn receipt_parses_known_layout() {
        let json = r#"{
            "name": "libpng",
            "version": "1.6.21",
            "source": {"tap": "vladshablinsky/taptest", "spec": "stable"},
            "poured_from_bottle": false
        }"#;
        let receipt: InstallReceipt = serde_json::from_str(json).unwrap();

        assert_eq!(receipt.installed_name(), "libpng");
        assert_eq!(receipt.source_authority().to_string(), "vladshablinsky/taptest");
        assert_eq!(receipt.extra("poured_from_bottle"), Some(&Value::Bool(false)));
    }

    #[test]
    fn renamed_preserves_source_and_unknown_fields() {
        let json = r#"{"name":"libpng","version":"1.6.21","source":{"tap":"core","spec":"head"},"time":12}"#;
        let receipt: InstallReceipt = serde_json::from_str(json).unwrap();

        let renamed = receipt.renamed("newlibpng");
        let value = serde_json::to_value(&renamed).unwrap();

        assert_eq!(value["name"], "newlibpng");
        assert_eq!(value["source"]["tap"], "core");
        assert_eq!(value["source"]["spec"], "head");
        assert_eq!(value["time"], 12);
    }

    #[test]
    fn receipt_rejects_unknown_authority() {
        let json = r#"{"name":"libpng","version":"1","source":{"tap":"not-a-tap"}}"#;
        assert!(serde_json::from_str::<InstallReceipt>(json).is_err());
    }

    #[test]
    fn read_reports_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(RECEIPT_FILE);
        std::fs::write(&path, "{").unwrap();

        assert!(matches!(InstallReceipt::read(&path), Err(StoreError::Receipt { .. })));
    }
}
