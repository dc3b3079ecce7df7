//! Keg Resolve
//!
//! Decides whether, and against which authority, a requested formula name
//! should be migrated.
//!
//! # Concepts
//!
//! - **Trigger**: manual (`migrate <name>`) or automatic (post-sync sweep)
//! - **Decision**: resolved rename, no-op, ambiguous or not found
//! - **NameResolver**: applies the resolution rules to one catalog snapshot
//!
//! Manual requests are loud: anything but a resolved rename is an error the
//! user sees. Automatic sweeps are silent for packages no rename applies to.
//!
//! # Example
//!
//! ```rust
//! use keg_catalog::{Authority, CatalogIndex, CatalogSet, RenameMapLoader, StaticCatalog};
//! use keg_resolve::{Decision, NameResolver, Trigger};
//! use keg_store::InstallReceipt;
//!
//! let catalogs = CatalogSet::new(
//!     StaticCatalog::new(Authority::Core)
//!         .with_formulae(["newlibpng"])
//!         .with_rename("libpng", "newlibpng"),
//! )
//! .unwrap();
//! let maps = RenameMapLoader::new().load(&catalogs).unwrap();
//! let index = CatalogIndex::build(&catalogs);
//!
//! let receipt = InstallReceipt::new("libpng", "1.6.21", Authority::Core);
//! let decision = NameResolver::new(&maps, &index).resolve(
//!     &"libpng".parse().unwrap(),
//!     Some(&receipt),
//!     Trigger::Automatic,
//! );
//! assert!(matches!(decision, Decision::Resolved(_)));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod decision;
pub mod resolver;

// Re-exports
pub use decision::{Decision, NotFoundReason, Trigger};
pub use resolver::NameResolver;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
