//! Evaluation engine
//!
//! Provides the evaluator for segment and trigger condition trees.

mod evaluator;
mod operators;

// Re-export for convenience
pub use evaluator::Evaluator;
