//! Customer and event records

use super::field_lookup::{get_nested_value, FieldAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What is known about one customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Built-in profile fields (`email`, `firstName`, ...)
    #[serde(default)]
    pub profile: Map<String, Value>,

    /// Custom attributes, addressed as `attributes.<name>`
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Event history
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl CustomerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, key: impl Into<String>, value: Value) -> Self {
        self.profile.insert(key.into(), value);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_event(mut self, event: EventRecord) -> Self {
        self.events.push(event);
        self
    }

    /// Events with the given name, oldest first as recorded
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EventRecord> {
        self.events.iter().filter(move |event| event.name == name)
    }
}

/// One occurrence of a named event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            time,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Resolve an event address; addresses of other events or of customer
    /// data resolve to `Null`
    pub(crate) fn resolve(&self, address: &FieldAddress<'_>) -> Value {
        match address {
            FieldAddress::EventTime(event) if *event == self.name => {
                Value::String(self.time.to_rfc3339())
            }
            FieldAddress::EventAttribute(event, path) if *event == self.name => {
                get_nested_value(&self.attributes, path)
            }
            _ => Value::Null,
        }
    }
}
