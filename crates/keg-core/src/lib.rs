//! Keg Core
//!
//! Ties catalogs, resolution and the install store together behind two
//! triggers: a manual `migrate <name>` request and the automatic sweep that
//! runs after catalogs are synced.
//!
//! # Concepts
//!
//! - **EngineConfig**: prefix-derived paths of one installation
//! - **TriggerCoordinator**: loads a catalog snapshot per call and applies
//!   the trigger's resolution policy
//! - **SweepReport**: migrated, skipped and failed packages of a sweep
//!
//! # Example
//!
//! ```rust,no_run
//! use keg_core::{EngineConfig, TriggerCoordinator};
//!
//! let coordinator = TriggerCoordinator::new(EngineConfig::new("/opt/keg"));
//! let report = coordinator.migrate(&"core/libpng".parse()?, false)?;
//! println!("{:?}", report.outcome);
//!
//! let sweep = coordinator.sweep()?;
//! assert!(sweep.is_success());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod report;

// Re-exports
pub use config::{EngineConfig, DEFAULT_PREFIX};
pub use coordinator::TriggerCoordinator;
pub use error::{EngineError, EngineResult};
pub use report::{FailedPackage, MigrateReport, SkippedPackage, SweepReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
