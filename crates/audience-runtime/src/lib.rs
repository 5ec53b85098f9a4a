//! Audience Runtime - evaluation engine for condition trees
//!
//! This crate evaluates segment condition trees against customer records and
//! trigger condition trees against single events, using the left-to-right
//! AND/OR fold defined by the condition model.

pub mod context;
pub mod engine;
pub mod error;

// Re-export main types
pub use context::{CustomerRecord, EventRecord, Subject};
pub use engine::Evaluator;
pub use error::{Result, RuntimeError};
