//! Operators for audience conditions
//!
//! Comparison operators are constrained per attribute type by a static
//! compatibility table. The same table drives which value widget an editor shows
//! and which value shape a filter must carry.

use crate::types::AttributeType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    In,
    NotIn,
    Exists,
    NotExists,
    /// Substring / wildcard match on strings
    Like,
}

impl ComparisonOperator {
    /// Every comparison operator, in declaration order
    pub const ALL: [ComparisonOperator; 11] = [
        ComparisonOperator::Equals,
        ComparisonOperator::NotEquals,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanEquals,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanEquals,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
        ComparisonOperator::Exists,
        ComparisonOperator::NotExists,
        ComparisonOperator::Like,
    ];

    /// Returns true for EXISTS / NOT_EXISTS, which carry no value
    pub fn is_presence(&self) -> bool {
        matches!(self, ComparisonOperator::Exists | ComparisonOperator::NotExists)
    }

    /// Returns true for IN / NOT_IN, which always take a list of values
    pub fn is_membership(&self) -> bool {
        matches!(self, ComparisonOperator::In | ComparisonOperator::NotIn)
    }

    /// Returns true for ordering operators (>, >=, <, <=)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterThanEquals
                | ComparisonOperator::LessThan
                | ComparisonOperator::LessThanEquals
        )
    }

    /// Wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "EQUALS",
            ComparisonOperator::NotEquals => "NOT_EQUALS",
            ComparisonOperator::GreaterThan => "GREATER_THAN",
            ComparisonOperator::GreaterThanEquals => "GREATER_THAN_EQUALS",
            ComparisonOperator::LessThan => "LESS_THAN",
            ComparisonOperator::LessThanEquals => "LESS_THAN_EQUALS",
            ComparisonOperator::In => "IN",
            ComparisonOperator::NotIn => "NOT_IN",
            ComparisonOperator::Exists => "EXISTS",
            ComparisonOperator::NotExists => "NOT_EXISTS",
            ComparisonOperator::Like => "LIKE",
        }
    }
}

impl Default for ComparisonOperator {
    fn default() -> Self {
        ComparisonOperator::Equals
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connective between a node and its next sibling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// Combine an accumulated result with the next term
    pub fn apply(&self, left: bool, right: bool) -> bool {
        match self {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
        }
    }
}

impl Default for LogicalOperator {
    fn default() -> Self {
        LogicalOperator::And
    }
}

use ComparisonOperator::*;

const BASE: &[ComparisonOperator] = &[Equals, NotEquals, Exists, NotExists];
const STRING_SCALAR: &[ComparisonOperator] =
    &[Equals, NotEquals, Exists, NotExists, In, NotIn, Like];
const STRING_LIST: &[ComparisonOperator] = &[Equals, NotEquals, Exists, NotExists, Like];
const NUMBER_SCALAR: &[ComparisonOperator] = &[
    Equals,
    NotEquals,
    Exists,
    NotExists,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    In,
    NotIn,
];
const TEMPORAL: &[ComparisonOperator] = &[
    Equals,
    NotEquals,
    Exists,
    NotExists,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
];

/// Operators allowed for an attribute type
///
/// `None` (no field chosen yet) offers every operator.
pub fn allowed_operators(attribute_type: Option<AttributeType>) -> &'static [ComparisonOperator] {
    match attribute_type {
        None => &ComparisonOperator::ALL,
        Some(AttributeType::StringScalar) => STRING_SCALAR,
        Some(AttributeType::StringList) => STRING_LIST,
        Some(AttributeType::NumberScalar) => NUMBER_SCALAR,
        Some(AttributeType::NumberList) => BASE,
        Some(AttributeType::Date) | Some(AttributeType::DateTime) => TEMPORAL,
        Some(AttributeType::Boolean) => BASE,
    }
}

/// Returns true when `operator` may be used on a field of `attribute_type`
pub fn is_allowed(attribute_type: Option<AttributeType>, operator: ComparisonOperator) -> bool {
    allowed_operators(attribute_type).contains(&operator)
}

/// Shape a filter value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueShape {
    /// No value (EXISTS / NOT_EXISTS)
    None,
    /// Single value
    Scalar,
    /// Non-empty list of values
    List,
}

impl ValueShape {
    /// Shape required by `(type, operator)`
    pub fn required(attribute_type: Option<AttributeType>, operator: ComparisonOperator) -> Self {
        ValueWidget::select(attribute_type, operator).shape()
    }
}

/// Value input an editor renders for a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueWidget {
    /// No value input
    None,
    /// Multi-value tag input
    TagInput,
    DatePicker,
    DateTimePicker,
    /// Two-option true/false select
    BooleanSelect,
    NumberInput,
    TextInput,
}

impl ValueWidget {
    /// Select the widget for `(type, operator)`.
    ///
    /// Membership operators always use a tag input and presence operators
    /// render nothing; otherwise the type decides. Recomputed on every call.
    pub fn select(attribute_type: Option<AttributeType>, operator: ComparisonOperator) -> Self {
        if operator.is_presence() {
            return ValueWidget::None;
        }
        if operator.is_membership() {
            return ValueWidget::TagInput;
        }
        match attribute_type {
            Some(AttributeType::StringList) | Some(AttributeType::NumberList) => {
                ValueWidget::TagInput
            }
            Some(AttributeType::Date) => ValueWidget::DatePicker,
            Some(AttributeType::DateTime) => ValueWidget::DateTimePicker,
            Some(AttributeType::Boolean) => ValueWidget::BooleanSelect,
            Some(AttributeType::NumberScalar) => ValueWidget::NumberInput,
            Some(AttributeType::StringScalar) | None => ValueWidget::TextInput,
        }
    }

    /// Value shape this widget produces
    pub fn shape(&self) -> ValueShape {
        match self {
            ValueWidget::None => ValueShape::None,
            ValueWidget::TagInput => ValueShape::List,
            _ => ValueShape::Scalar,
        }
    }
}
