//! Keg Catalog
//!
//! Naming authorities, rename declarations and formula membership.
//!
//! # Overview
//!
//! - **Authority**: the core catalog or a tap (`owner/repo`)
//! - **RenameMapLoader**: validates and merges per-authority `old -> new` maps
//! - **CatalogIndex**: which authority currently defines which formula name
//!
//! Both the rename maps and the index are recomputed from catalog state on
//! every run; nothing here is cached or written.
//!
//! # Example
//!
//! ```rust
//! use keg_catalog::{Authority, CatalogIndex, CatalogSet, RenameMapLoader, StaticCatalog};
//!
//! let catalogs = CatalogSet::new(
//!     StaticCatalog::new(Authority::Core)
//!         .with_formulae(["newlibpng"])
//!         .with_rename("libpng", "newlibpng"),
//! )
//! .unwrap();
//!
//! let maps = RenameMapLoader::new().load(&catalogs).unwrap();
//! let index = CatalogIndex::build(&catalogs);
//!
//! assert_eq!(maps.get(&Authority::Core, "libpng"), Some("newlibpng"));
//! assert!(!index.defines(&Authority::Core, "libpng"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod authority;
pub mod catalog;
pub mod error;
pub mod index;
pub mod renames;

// Re-exports
pub use authority::{validate_formula_name, Authority, QualifiedName, TapId};
pub use catalog::{Catalog, CatalogSet, FsCatalog, StaticCatalog, FORMULA_DIR, RENAMES_FILE};
pub use error::{CatalogError, CatalogResult};
pub use index::CatalogIndex;
pub use renames::{RenameDeclarations, RenameEntry, RenameMapLoader, RenameMaps};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
