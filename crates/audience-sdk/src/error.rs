//! SDK error types

use audience_core::{AttributeType, ComparisonOperator, CoreError, FilterIssue, ValueShape};
use audience_repository::RepositoryError;
use thiserror::Error;

/// SDK error type
///
/// Every builder operation that fails leaves the tree exactly as it was.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Group or filter index out of range
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Field address not present in the catalog
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Catalog could not be loaded; field pickers are disabled
    #[error("Attribute catalog unavailable")]
    CatalogUnavailable,

    /// A catalog load is in flight; editing is disabled until it lands
    #[error("Attribute catalog is loading")]
    CatalogPending,

    /// Operator not allowed for the field's type
    #[error("Operator {operator} is not allowed for {attribute_type} fields")]
    InvalidOperatorForType {
        operator: ComparisonOperator,
        attribute_type: AttributeType,
    },

    /// Value shape does not match the active value widget
    #[error("Expected {expected:?} value, got {actual:?}")]
    ValueShapeMismatch {
        expected: ValueShape,
        actual: ValueShape,
    },

    /// Trigger conditions edited before an event was chosen
    #[error("No trigger event selected")]
    EventNotSelected,

    /// Submission blocked by per-filter validation issues
    #[error("{} filter(s) failed validation", .0.len())]
    Validation(Vec<FilterIssue>),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
