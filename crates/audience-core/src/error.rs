//! Error types for Audience Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Duplicate attribute address: {0}")]
    DuplicateAddress(String),

    #[error("Group index out of range: {0}")]
    GroupOutOfRange(usize),

    #[error("Filter index out of range: group {group}, filter {filter}")]
    FilterOutOfRange { group: usize, filter: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
