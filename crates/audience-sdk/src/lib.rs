//! Audience SDK - editing audience conditions
//!
//! This crate provides the stateful side of condition editing:
//!
//! - [`ConditionBuilder`]: path-addressed edits that keep a condition tree
//!   in its rest state and its filters consistent with the catalog
//! - [`TriggerBuilder`]: event-scoped trigger editing
//! - [`SegmentSession`] / [`TriggerSession`]: catalog loading with stale
//!   response cancellation, submission and persistence
//!
//! # Example
//!
//! ```no_run
//! use audience_core::{ComparisonOperator, FilterPath, FilterValue};
//! use audience_repository::{CatalogLoader, RepositoryConfig};
//! use audience_sdk::{SdkConfig, SegmentSession};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = CatalogLoader::from_config(&RepositoryConfig::file_system("catalog"))?;
//! let mut session = SegmentSession::open(&SdkConfig::default(), &loader).await;
//!
//! let path = FilterPath::new(0, 0);
//! let builder = session.builder_mut()?;
//! builder.set_field(path, "email")?;
//! builder.set_operator(path, ComparisonOperator::In)?;
//! builder.set_value(path, Some(FilterValue::texts(["a@x.com", "b@x.com"])))?;
//!
//! let payload = session.submit()?;
//! println!("{}", serde_json::to_string(&payload)?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod session;
pub mod trigger;

pub use builder::ConditionBuilder;
pub use config::SdkConfig;
pub use error::{Result, SdkError};
pub use session::{
    load_triggers, save_triggers, submit_triggers, CatalogRequest, SegmentSession,
    TriggerSession,
};
pub use trigger::TriggerBuilder;
