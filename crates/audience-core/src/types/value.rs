//! Filter values
//!
//! `FilterValue` is the value exactly as it travels on the wire: a scalar or a
//! list of scalars, with whatever encoding the producer used (including legacy
//! encodings such as JSON booleans or numeric strings). It is kept verbatim so
//! that a persisted tree round-trips unchanged.
//!
//! `TypedValue` is the interpretation of a `FilterValue` against the declared
//! `AttributeType` of the referenced field. Validation and evaluation work on
//! typed values only.

use crate::error::{CoreError, Result};
use crate::operator::ValueShape;
use crate::types::AttributeType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single wire scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Legacy boolean encoding
    Bool(bool),
    /// Number, kept in its original integer/float representation
    Number(serde_json::Number),
    /// String (also the canonical encoding of dates and booleans)
    String(String),
}

impl Scalar {
    /// Create a numeric scalar; `None` for NaN or infinite input
    pub fn number(value: f64) -> Option<Self> {
        serde_json::Number::from_f64(value).map(Scalar::Number)
    }

    /// Numeric reading of this scalar, accepting numeric strings
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// Returns true for an empty string scalar
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::String(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

/// A filter value as carried on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Tag-input value (IN/NOT_IN and list-typed fields)
    List(Vec<Scalar>),
    /// Single value
    Scalar(Scalar),
}

impl FilterValue {
    /// Create a string value
    pub fn text(value: impl Into<String>) -> Self {
        FilterValue::Scalar(Scalar::String(value.into()))
    }

    /// Create an integer value
    pub fn int(value: i64) -> Self {
        FilterValue::Scalar(Scalar::from(value))
    }

    /// Create a float value; `None` for NaN or infinite input
    pub fn float(value: f64) -> Option<Self> {
        Scalar::number(value).map(FilterValue::Scalar)
    }

    /// Create a boolean value in its canonical `"true"`/`"false"` string encoding
    pub fn boolean(value: bool) -> Self {
        FilterValue::text(if value { "true" } else { "false" })
    }

    /// Create a list of strings
    pub fn texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::List(values.into_iter().map(|v| Scalar::String(v.into())).collect())
    }

    /// Create a list of integers
    pub fn ints<I: IntoIterator<Item = i64>>(values: I) -> Self {
        FilterValue::List(values.into_iter().map(Scalar::from).collect())
    }

    /// Shape of this value (never `ValueShape::None`)
    pub fn shape(&self) -> ValueShape {
        match self {
            FilterValue::List(_) => ValueShape::List,
            FilterValue::Scalar(_) => ValueShape::Scalar,
        }
    }

    /// Returns true for an empty list or a blank string
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::List(items) => items.is_empty(),
            FilterValue::Scalar(scalar) => scalar.is_blank(),
        }
    }
}

/// A filter value interpreted against its field's declared type
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    TextList(Vec<String>),
    Number(f64),
    NumberList(Vec<f64>),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Boolean(bool),
}

impl TypedValue {
    /// Interpret a wire value for a field of type `attribute_type`, given the shape
    /// the active operator requires.
    pub fn interpret(
        value: &FilterValue,
        attribute_type: AttributeType,
        shape: ValueShape,
    ) -> Result<Self> {
        match (shape, value) {
            (ValueShape::None, _) => Err(CoreError::InvalidValue(
                "operator takes no value".to_string(),
            )),
            (ValueShape::List, FilterValue::List(items)) => interpret_list(items, attribute_type),
            (ValueShape::Scalar, FilterValue::Scalar(scalar)) => {
                interpret_scalar(scalar, attribute_type)
            }
            (expected, actual) => Err(CoreError::TypeError(format!(
                "expected {:?} value, got {:?}",
                expected,
                actual.shape()
            ))),
        }
    }
}

fn interpret_list(items: &[Scalar], attribute_type: AttributeType) -> Result<TypedValue> {
    if attribute_type.is_textual() {
        return Ok(TypedValue::TextList(
            items.iter().map(|item| item.to_string()).collect(),
        ));
    }

    if attribute_type.is_numeric() {
        let numbers = items
            .iter()
            .map(|item| {
                item.as_f64().ok_or_else(|| {
                    CoreError::InvalidValue(format!("'{}' is not a number", item))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        return Ok(TypedValue::NumberList(numbers));
    }

    Err(CoreError::TypeError(format!(
        "{} fields do not take list values",
        attribute_type
    )))
}

fn interpret_scalar(scalar: &Scalar, attribute_type: AttributeType) -> Result<TypedValue> {
    match attribute_type {
        AttributeType::StringScalar => Ok(TypedValue::Text(scalar.to_string())),
        AttributeType::NumberScalar => scalar
            .as_f64()
            .map(TypedValue::Number)
            .ok_or_else(|| CoreError::InvalidValue(format!("'{}' is not a number", scalar))),
        AttributeType::Date => match scalar {
            Scalar::String(s) => parse_date(s).map(TypedValue::Date),
            other => Err(CoreError::InvalidValue(format!("'{}' is not a date", other))),
        },
        AttributeType::DateTime => match scalar {
            Scalar::String(s) => parse_datetime(s).map(TypedValue::DateTime),
            other => Err(CoreError::InvalidValue(format!(
                "'{}' is not a date-time",
                other
            ))),
        },
        AttributeType::Boolean => match scalar {
            Scalar::Bool(b) => Ok(TypedValue::Boolean(*b)),
            Scalar::String(s) if s.eq_ignore_ascii_case("true") => Ok(TypedValue::Boolean(true)),
            Scalar::String(s) if s.eq_ignore_ascii_case("false") => Ok(TypedValue::Boolean(false)),
            other => Err(CoreError::InvalidValue(format!(
                "'{}' is not a boolean",
                other
            ))),
        },
        AttributeType::StringList | AttributeType::NumberList => Err(CoreError::TypeError(
            format!("{} fields take list values", attribute_type),
        )),
    }
}

/// Parse an ISO-8601 calendar date, accepting a full timestamp and keeping its date part
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_datetime(input)
        .map(|dt| dt.date_naive())
        .map_err(|_| CoreError::InvalidValue(format!("'{}' is not an ISO-8601 date", input)))
}

/// Parse an ISO-8601 / RFC 3339 timestamp.
///
/// Timestamps without an offset are read as UTC, and a bare date is read as
/// midnight UTC (legacy encoding).
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(CoreError::InvalidValue(format!(
        "'{}' is not an ISO-8601 date-time",
        input
    )))
}
