//! Repository abstraction layer for audience conditions
//!
//! This crate provides the external collaborators of the condition builder:
//!
//! - **Catalog sources**: attribute and event definitions per project
//!   (memory, file system, HTTP API)
//! - **Condition stores**: persistence of segment and trigger payloads
//!   (memory, file system, HTTP API)
//! - **CatalogLoader**: scoped, fail-soft catalog snapshots
//!
//! # Quick Start
//!
//! ```no_run
//! use audience_core::CatalogScope;
//! use audience_repository::{CatalogLoader, RepositoryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RepositoryConfig::file_system("catalog").with_project("shop");
//!     let loader = CatalogLoader::from_config(&config)?;
//!
//!     let snapshot = loader.load(&CatalogScope::Global).await;
//!     println!("{} attributes", snapshot.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod file_system;
pub mod loader;
pub mod memory;
pub mod traits;

#[cfg(feature = "api")]
pub mod api;

pub use config::{ConfigError, RepositoryConfig, RepositorySource, DEFAULT_PROJECT};
pub use error::{RepositoryError, RepositoryResult};
pub use file_system::{FileSystemCatalogSource, FileSystemConditionStore};
pub use loader::{open_condition_store, CatalogLoader};
pub use memory::{MemoryCatalogSource, MemoryConditionStore};
pub use traits::{CatalogSource, ConditionStore};

#[cfg(feature = "api")]
pub use api::{ApiCatalogSource, ApiConditionStore};
