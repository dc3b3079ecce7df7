//! Keg Store
//!
//! The cellar of installed kegs, their install receipts, per-formula locks
//! and the rename migration that moves a keg to its new name.
//!
//! # Concepts
//!
//! - **InstallStore**: reads cellar entries and receipts, writes through [`FsOps`]
//! - **MigrationExecutor**: journaled `old -> new` move with a relative alias
//!   left at the old name
//! - **FormulaLock**: advisory lock held per name for the length of a mutation
//!
//! # Example
//!
//! ```rust,no_run
//! use keg_catalog::{Authority, RenameEntry};
//! use keg_store::{InstallStore, MigrationExecutor};
//!
//! let store = InstallStore::new("/opt/keg/Cellar", "/opt/keg/var/locks");
//! let rename = RenameEntry::new(Authority::Core, "libpng", "newlibpng");
//! let outcome = MigrationExecutor::new(&store).migrate(&rename)?;
//! println!("{outcome:?}");
//! # Ok::<(), keg_store::StoreError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cellar;
pub mod error;
pub mod executor;
pub mod fs;
pub mod lock;
pub mod receipt;
pub mod uninstall;

// Re-exports
pub use cellar::{CellarEntry, InstallStore};
pub use error::{StoreError, StoreResult};
pub use executor::{MigrationExecutor, MigrationOutcome};
pub use fs::{FsOps, OsFs};
pub use lock::{FormulaLock, LockSet};
pub use receipt::{InstallReceipt, ReceiptSource, RECEIPT_FILE};
pub use uninstall::UninstallReport;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
