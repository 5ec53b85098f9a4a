//! Type system for audience conditions
//!
//! This module contains:
//! - Attribute types and descriptors (what a field address refers to)
//! - Filter values (wire form) and their typed interpretation

pub mod attribute;
pub mod value;

pub use attribute::{AttributeDescriptor, AttributeOrigin, AttributeType};
pub use value::{parse_date, parse_datetime, FilterValue, Scalar, TypedValue};
