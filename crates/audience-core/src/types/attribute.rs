//! Attribute descriptors
//!
//! A descriptor binds a field address (dotted path) to its declared type and to
//! the place the attribute comes from: a fixed profile field, a custom attribute
//! or an attribute of one event.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of an addressable attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// Single string
    #[serde(alias = "String")]
    StringScalar,
    /// List of strings
    #[serde(alias = "StringArray")]
    StringList,
    /// Single number
    #[serde(alias = "Number")]
    NumberScalar,
    /// List of numbers
    #[serde(alias = "NumberArray")]
    NumberList,
    /// Calendar date (no time component)
    Date,
    /// Instant with time zone
    DateTime,
    /// Boolean flag
    Boolean,
}

impl AttributeType {
    /// Every attribute type, in declaration order
    pub const ALL: [AttributeType; 7] = [
        AttributeType::StringScalar,
        AttributeType::StringList,
        AttributeType::NumberScalar,
        AttributeType::NumberList,
        AttributeType::Date,
        AttributeType::DateTime,
        AttributeType::Boolean,
    ];

    /// Returns true for list-valued types
    pub fn is_list(&self) -> bool {
        matches!(self, AttributeType::StringList | AttributeType::NumberList)
    }

    /// Returns true for numeric types (scalar or list)
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeType::NumberScalar | AttributeType::NumberList)
    }

    /// Returns true for string types (scalar or list)
    pub fn is_textual(&self) -> bool {
        matches!(self, AttributeType::StringScalar | AttributeType::StringList)
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeType::StringScalar => "string",
            AttributeType::StringList => "string[]",
            AttributeType::NumberScalar => "number",
            AttributeType::NumberList => "number[]",
            AttributeType::Date => "date",
            AttributeType::DateTime => "datetime",
            AttributeType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Where an attribute comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AttributeOrigin {
    /// Fixed customer profile field
    Profile,
    /// Project-defined custom attribute
    Custom,
    /// Attribute of a tracked event
    Event {
        #[serde(rename = "eventName")]
        event_name: String,
    },
}

impl AttributeOrigin {
    /// Display label used when grouping descriptors in a field picker
    pub fn label(&self) -> String {
        match self {
            AttributeOrigin::Profile => "Profile".to_string(),
            AttributeOrigin::Custom => "Custom".to_string(),
            AttributeOrigin::Event { event_name } => format!("Event: {}", event_name),
        }
    }
}

/// One addressable field in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Dotted path, unique within one catalog snapshot
    pub address: String,

    /// Declared type
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,

    /// Origin of the attribute
    pub origin: AttributeOrigin,
}

impl AttributeDescriptor {
    /// Create a fixed profile field descriptor (bare key address)
    pub fn profile(key: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            address: key.into(),
            attribute_type,
            origin: AttributeOrigin::Profile,
        }
    }

    /// Create a custom attribute descriptor (`attributes.<name>`)
    pub fn custom(name: &str, attribute_type: AttributeType) -> Self {
        Self {
            address: format!("attributes.{}", name),
            attribute_type,
            origin: AttributeOrigin::Custom,
        }
    }

    /// Create an event attribute descriptor (`events.<event>.attributes.<name>`)
    pub fn event_attribute(event_name: &str, name: &str, attribute_type: AttributeType) -> Self {
        Self {
            address: format!("events.{}.attributes.{}", event_name, name),
            attribute_type,
            origin: AttributeOrigin::Event {
                event_name: event_name.to_string(),
            },
        }
    }

    /// Create the implicit timestamp descriptor of an event (`events.<event>.time`)
    pub fn event_time(event_name: &str) -> Self {
        Self {
            address: format!("events.{}.time", event_name),
            attribute_type: AttributeType::DateTime,
            origin: AttributeOrigin::Event {
                event_name: event_name.to_string(),
            },
        }
    }
}
