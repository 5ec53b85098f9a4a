//! Audience Core - condition model for segments and campaign triggers
//!
//! This crate provides the fundamental types shared by every other audience crate:
//! - Attribute types, descriptors and catalog snapshots
//! - Comparison/logical operators and the type-to-operator compatibility table
//! - Filter values (wire form) and their typed interpretation
//! - The Filter / Group / ConditionTree / TriggerConfig model and its JSON contract
//! - Submit-time validation with per-filter issues
//! - Error types

pub mod catalog;
pub mod condition;
pub mod error;
pub mod operator;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use catalog::{AttributeDefinitions, CatalogScope, CatalogSnapshot};
pub use condition::{
    ConditionTree, Filter, FilterPath, Group, SegmentPayload, TriggerConfig, TriggerPayload,
};
pub use error::CoreError;
pub use operator::{allowed_operators, ComparisonOperator, LogicalOperator, ValueShape, ValueWidget};
pub use types::{AttributeDescriptor, AttributeOrigin, AttributeType, FilterValue, Scalar, TypedValue};
pub use validation::{FilterIssue, FilterIssueKind, Validator};
