//! Audience HTTP Server Library
//!
//! Exposes catalog lookup, segment validation and segment/trigger evaluation
//! over REST. Split from `main.rs` so the router can be exercised in tests.

pub mod api;
pub mod config;
pub mod error;

pub use api::{create_router, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
