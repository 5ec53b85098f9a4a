//! Evaluation context
//!
//! Records describe what is known about a customer (profile fields, custom
//! attributes and past events) or about a single incoming event. A [`Subject`]
//! resolves catalog addresses against one of them.

mod field_lookup;
mod record;

pub use field_lookup::FieldAddress;
pub use record::{CustomerRecord, EventRecord};

use serde_json::Value;

/// What a condition tree is evaluated against
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// A customer with profile, attributes and event history (segments)
    Customer(&'a CustomerRecord),
    /// One incoming event (campaign triggers)
    Event(&'a EventRecord),
}

impl<'a> Subject<'a> {
    /// Resolve an address to the candidate values it refers to.
    ///
    /// Event-addressed fields on a customer yield one candidate per matching
    /// event; a filter holds when any candidate satisfies it. The result is
    /// never empty: a missing field resolves to a single `Null`.
    pub fn resolve(&self, address: &str) -> Vec<Value> {
        let address = FieldAddress::parse(address);
        let values = match (self, &address) {
            (Subject::Customer(record), FieldAddress::Profile(path)) => {
                vec![field_lookup::get_nested_value(&record.profile, path)]
            }
            (Subject::Customer(record), FieldAddress::Custom(path)) => {
                vec![field_lookup::get_nested_value(&record.attributes, path)]
            }
            (Subject::Customer(record), _) => record
                .events_named(address.event_name().unwrap_or_default())
                .map(|event| event.resolve(&address))
                .collect(),
            (Subject::Event(event), _) => vec![event.resolve(&address)],
        };

        if values.is_empty() {
            vec![Value::Null]
        } else {
            values
        }
    }
}
