//! Field Lookup Utilities
//!
//! Helpers for splitting catalog addresses and retrieving values from nested
//! JSON objects using dot-notation paths.

use serde_json::{Map, Value};

/// A catalog address split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAddress<'a> {
    /// `<profileField>`, optionally nested
    Profile(Vec<&'a str>),
    /// `attributes.<name>`
    Custom(Vec<&'a str>),
    /// `events.<event>.time`
    EventTime(&'a str),
    /// `events.<event>.attributes.<name>`
    EventAttribute(&'a str, Vec<&'a str>),
}

impl<'a> FieldAddress<'a> {
    /// Split an address string
    pub fn parse(address: &'a str) -> Self {
        let parts: Vec<&str> = address.split('.').collect();
        match parts.as_slice() {
            ["attributes", rest @ ..] if !rest.is_empty() => FieldAddress::Custom(rest.to_vec()),
            ["events", event, "time"] => FieldAddress::EventTime(*event),
            ["events", event, "attributes", rest @ ..] if !rest.is_empty() => {
                FieldAddress::EventAttribute(*event, rest.to_vec())
            }
            other => FieldAddress::Profile(other.to_vec()),
        }
    }

    /// Event the address belongs to, if any
    pub fn event_name(&self) -> Option<&'a str> {
        match self {
            FieldAddress::EventTime(event) | FieldAddress::EventAttribute(event, _) => {
                Some(*event)
            }
            _ => None,
        }
    }
}

/// Get nested value from a JSON object following a path
///
/// Returns `Value::Null` if any part of the path is not found.
pub(crate) fn get_nested_value(data: &Map<String, Value>, path: &[&str]) -> Value {
    let Some((key, remaining)) = path.split_first() else {
        return Value::Null;
    };

    let value = match data.get(*key) {
        Some(v) => v,
        None => {
            tracing::debug!("Field not found: {}, returning Null", key);
            return Value::Null;
        }
    };

    if remaining.is_empty() {
        return value.clone();
    }

    match value {
        Value::Object(map) => get_nested_value(map, remaining),
        _ => {
            tracing::debug!("Cannot access nested field on non-object, returning Null");
            Value::Null
        }
    }
}
