//! Comparison operator execution
//!
//! Record values arrive as loose JSON; they are read as the field's declared
//! type before comparing. A value that is missing or cannot be read as that
//! type never satisfies a comparison.

use super::pattern::like_matches;
use crate::error::{Result, RuntimeError};
use audience_core::types::{parse_date, parse_datetime};
use audience_core::{AttributeType, ComparisonOperator, FilterValue, Scalar, TypedValue};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// Execute a comparison of one record value against an interpreted filter value
pub(crate) fn execute_compare(
    actual: &Value,
    op: ComparisonOperator,
    expected: &TypedValue,
    attribute_type: AttributeType,
) -> Result<bool> {
    let actual = match read_actual(actual, attribute_type) {
        Some(value) => value,
        None => {
            tracing::debug!(
                "Missing or unreadable {} value {:?} for {}, returning false",
                attribute_type,
                actual,
                op
            );
            return Ok(false);
        }
    };

    match op {
        ComparisonOperator::Equals => equals(&actual, expected),
        ComparisonOperator::NotEquals => equals(&actual, expected).map(|eq| !eq),
        ComparisonOperator::In => member(&actual, expected),
        ComparisonOperator::NotIn => member(&actual, expected).map(|found| !found),
        ComparisonOperator::Like => like(&actual, expected),
        ComparisonOperator::GreaterThan => order(&actual, expected).map(|o| o == Ordering::Greater),
        ComparisonOperator::GreaterThanEquals => {
            order(&actual, expected).map(|o| o != Ordering::Less)
        }
        ComparisonOperator::LessThan => order(&actual, expected).map(|o| o == Ordering::Less),
        ComparisonOperator::LessThanEquals => {
            order(&actual, expected).map(|o| o != Ordering::Greater)
        }
        ComparisonOperator::Exists | ComparisonOperator::NotExists => Err(
            RuntimeError::InvalidOperation(format!("{} takes no value to compare", op)),
        ),
    }
}

/// Guess a type for a field the catalog does not describe, from the filter value
pub(crate) fn infer_type(value: Option<&FilterValue>) -> AttributeType {
    let first = match value {
        Some(FilterValue::Scalar(scalar)) => Some(scalar),
        Some(FilterValue::List(items)) => items.first(),
        None => None,
    };
    match first {
        Some(Scalar::Number(_)) => AttributeType::NumberScalar,
        Some(Scalar::Bool(_)) => AttributeType::Boolean,
        _ => AttributeType::StringScalar,
    }
}

/// Read a JSON record value as `attribute_type`
fn read_actual(value: &Value, attribute_type: AttributeType) -> Option<TypedValue> {
    match attribute_type {
        AttributeType::StringScalar => read_text(value).map(TypedValue::Text),
        AttributeType::StringList => match value {
            Value::Array(items) => items
                .iter()
                .map(read_text)
                .collect::<Option<Vec<_>>>()
                .map(TypedValue::TextList),
            other => read_text(other).map(|text| TypedValue::TextList(vec![text])),
        },
        AttributeType::NumberScalar => read_number(value).map(TypedValue::Number),
        AttributeType::NumberList => match value {
            Value::Array(items) => items
                .iter()
                .map(read_number)
                .collect::<Option<Vec<_>>>()
                .map(TypedValue::NumberList),
            other => read_number(other).map(|n| TypedValue::NumberList(vec![n])),
        },
        AttributeType::Date => match value {
            Value::String(s) => parse_date(s).ok().map(TypedValue::Date),
            Value::Number(_) => read_timestamp(value).map(|t| TypedValue::Date(t.date_naive())),
            _ => None,
        },
        AttributeType::DateTime => match value {
            Value::String(s) => parse_datetime(s).ok().map(TypedValue::DateTime),
            Value::Number(_) => read_timestamp(value).map(TypedValue::DateTime),
            _ => None,
        },
        AttributeType::Boolean => match value {
            Value::Bool(b) => Some(TypedValue::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(TypedValue::Boolean(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => {
                Some(TypedValue::Boolean(false))
            }
            _ => None,
        },
    }
}

fn read_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric timestamps are epoch milliseconds
fn read_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value.as_i64().and_then(DateTime::from_timestamp_millis)
}

fn mismatch(actual: &TypedValue, expected: &TypedValue, what: &str) -> RuntimeError {
    RuntimeError::InvalidOperation(format!(
        "Cannot {} {:?} and {:?}",
        what, actual, expected
    ))
}

/// Scalar equality; a list field equals a list value when it contains every element
fn equals(actual: &TypedValue, expected: &TypedValue) -> Result<bool> {
    match (actual, expected) {
        (TypedValue::Text(l), TypedValue::Text(r)) => Ok(l == r),
        (TypedValue::Number(l), TypedValue::Number(r)) => Ok(l == r),
        (TypedValue::Date(l), TypedValue::Date(r)) => Ok(l == r),
        (TypedValue::DateTime(l), TypedValue::DateTime(r)) => Ok(l == r),
        (TypedValue::Boolean(l), TypedValue::Boolean(r)) => Ok(l == r),
        (TypedValue::TextList(l), TypedValue::TextList(r)) => Ok(r.iter().all(|v| l.contains(v))),
        (TypedValue::NumberList(l), TypedValue::NumberList(r)) => {
            Ok(r.iter().all(|v| l.contains(v)))
        }
        _ => Err(mismatch(actual, expected, "compare")),
    }
}

/// Scalar membership in a list, or any overlap between two lists
fn member(actual: &TypedValue, expected: &TypedValue) -> Result<bool> {
    match (actual, expected) {
        (TypedValue::Text(l), TypedValue::TextList(r)) => Ok(r.contains(l)),
        (TypedValue::Number(l), TypedValue::NumberList(r)) => Ok(r.contains(l)),
        (TypedValue::TextList(l), TypedValue::TextList(r)) => Ok(l.iter().any(|v| r.contains(v))),
        (TypedValue::NumberList(l), TypedValue::NumberList(r)) => {
            Ok(l.iter().any(|v| r.contains(v)))
        }
        _ => Err(mismatch(actual, expected, "test membership of")),
    }
}

fn like(actual: &TypedValue, expected: &TypedValue) -> Result<bool> {
    let texts: &[String] = match actual {
        TypedValue::Text(text) => std::slice::from_ref(text),
        TypedValue::TextList(texts) => texts,
        _ => return Err(mismatch(actual, expected, "match")),
    };
    let patterns: &[String] = match expected {
        TypedValue::Text(pattern) => std::slice::from_ref(pattern),
        TypedValue::TextList(patterns) => patterns,
        _ => return Err(mismatch(actual, expected, "match")),
    };

    Ok(texts
        .iter()
        .any(|text| patterns.iter().any(|pattern| like_matches(text, pattern))))
}

fn order(actual: &TypedValue, expected: &TypedValue) -> Result<Ordering> {
    let ordering = match (actual, expected) {
        (TypedValue::Number(l), TypedValue::Number(r)) => l.partial_cmp(r),
        (TypedValue::Date(l), TypedValue::Date(r)) => Some(l.cmp(r)),
        (TypedValue::DateTime(l), TypedValue::DateTime(r)) => Some(l.cmp(r)),
        (TypedValue::Date(l), TypedValue::DateTime(r)) => Some(l.cmp(&r.date_naive())),
        _ => None,
    };
    ordering.ok_or_else(|| mismatch(actual, expected, "order"))
}
