//! Attribute catalog
//!
//! A catalog snapshot is the ordered set of field addresses an expression may
//! reference within one scope:
//! - `global` scope (segments): fixed profile fields, custom attributes and the
//!   attributes of every event definition, including each event's timestamp
//! - event scope (triggers): only the attributes of that event plus its timestamp
//!
//! Snapshots are built from the attribute definitions returned by the catalog
//! source. An unreachable source yields an *unavailable* snapshot: empty, with
//! field pickers disabled.

use crate::error::{CoreError, Result};
use crate::types::{AttributeDescriptor, AttributeOrigin, AttributeType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Fixed customer profile fields, always present in the global scope
pub const PROFILE_FIELDS: &[(&str, AttributeType)] = &[
    ("customerId", AttributeType::StringScalar),
    ("email", AttributeType::StringScalar),
    ("firstName", AttributeType::StringScalar),
    ("lastName", AttributeType::StringScalar),
    ("phone", AttributeType::StringScalar),
    ("createdAt", AttributeType::DateTime),
];

/// Scope a catalog snapshot is loaded for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogScope {
    /// Profile + custom attributes + all events (segments)
    Global,
    /// Attributes of a single event (trigger filters)
    Event(String),
}

impl CatalogScope {
    /// Create an event scope
    pub fn event(name: impl Into<String>) -> Self {
        CatalogScope::Event(name.into())
    }
}

impl fmt::Display for CatalogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogScope::Global => f.write_str("global"),
            CatalogScope::Event(name) => write!(f, "event:{}", name),
        }
    }
}

impl FromStr for CatalogScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "global" => Ok(CatalogScope::Global),
            _ => match s.strip_prefix("event:") {
                Some(name) if !name.is_empty() => Ok(CatalogScope::Event(name.to_string())),
                _ => Err(CoreError::InvalidValue(format!(
                    "invalid catalog scope '{}'",
                    s
                ))),
            },
        }
    }
}

/// Definition of one attribute as returned by the catalog source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
}

/// Definition of one event and its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
}

/// Custom attribute and event definitions of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinitions {
    #[serde(default)]
    pub custom_attributes: Vec<AttributeDefinition>,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

impl AttributeDefinitions {
    /// Names of all defined events
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Descriptors sharing one origin, in catalog order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptorGroup<'a> {
    pub label: String,
    pub origin: &'a AttributeOrigin,
    pub descriptors: Vec<&'a AttributeDescriptor>,
}

/// Ordered, address-unique set of descriptors visible in one scope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSnapshot {
    #[serde(serialize_with = "serialize_scope")]
    scope: CatalogScope,
    descriptors: Vec<AttributeDescriptor>,
    available: bool,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

fn serialize_scope<S: serde::Serializer>(
    scope: &CatalogScope,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(scope)
}

impl CatalogSnapshot {
    /// Create a snapshot, rejecting duplicate addresses
    pub fn new(scope: CatalogScope, descriptors: Vec<AttributeDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.address.clone(), position).is_some() {
                return Err(CoreError::DuplicateAddress(descriptor.address.clone()));
            }
        }

        Ok(Self {
            scope,
            descriptors,
            available: true,
            index,
        })
    }

    /// Empty snapshot for a scope whose source could not be reached
    pub fn unavailable(scope: CatalogScope) -> Self {
        Self {
            scope,
            descriptors: Vec::new(),
            available: false,
            index: HashMap::new(),
        }
    }

    /// Build the snapshot of `scope` from project attribute definitions.
    ///
    /// When two definitions map to the same address the first one wins.
    pub fn from_definitions(scope: CatalogScope, definitions: &AttributeDefinitions) -> Self {
        let mut candidates = Vec::new();

        match &scope {
            CatalogScope::Global => {
                candidates.extend(
                    PROFILE_FIELDS
                        .iter()
                        .map(|(key, ty)| AttributeDescriptor::profile(*key, *ty)),
                );
                candidates.extend(
                    definitions
                        .custom_attributes
                        .iter()
                        .map(|attr| AttributeDescriptor::custom(&attr.name, attr.attribute_type)),
                );
                for event in &definitions.events {
                    push_event_descriptors(&mut candidates, &event.name, &event.attributes);
                }
            }
            CatalogScope::Event(name) => {
                let attributes = definitions
                    .events
                    .iter()
                    .find(|event| &event.name == name)
                    .map(|event| event.attributes.as_slice())
                    .unwrap_or_default();
                push_event_descriptors(&mut candidates, name, attributes);
            }
        }

        let mut index = HashMap::with_capacity(candidates.len());
        let mut descriptors = Vec::with_capacity(candidates.len());
        for descriptor in candidates {
            if index.contains_key(&descriptor.address) {
                continue;
            }
            index.insert(descriptor.address.clone(), descriptors.len());
            descriptors.push(descriptor);
        }

        Self {
            scope,
            descriptors,
            available: true,
            index,
        }
    }

    /// Scope this snapshot was loaded for
    pub fn scope(&self) -> &CatalogScope {
        &self.scope
    }

    /// Descriptors in catalog order
    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// Whether the attribute source was reachable; field pickers are disabled otherwise
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Look up a descriptor by address
    pub fn get(&self, address: &str) -> Option<&AttributeDescriptor> {
        self.index.get(address).map(|&i| &self.descriptors[i])
    }

    /// Declared type of the field at `address`
    pub fn type_of(&self, address: &str) -> Option<AttributeType> {
        self.get(address).map(|d| d.attribute_type)
    }

    /// Returns true if `address` exists in this snapshot
    pub fn contains(&self, address: &str) -> bool {
        self.index.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors grouped by origin for display, in order of first appearance
    pub fn grouped(&self) -> Vec<DescriptorGroup<'_>> {
        let mut groups: Vec<DescriptorGroup<'_>> = Vec::new();
        for descriptor in &self.descriptors {
            match groups.iter_mut().find(|g| *g.origin == descriptor.origin) {
                Some(group) => group.descriptors.push(descriptor),
                None => groups.push(DescriptorGroup {
                    label: descriptor.origin.label(),
                    origin: &descriptor.origin,
                    descriptors: vec![descriptor],
                }),
            }
        }
        groups
    }
}

fn push_event_descriptors(
    out: &mut Vec<AttributeDescriptor>,
    event_name: &str,
    attributes: &[AttributeDefinition],
) {
    out.extend(attributes.iter().map(|attr| {
        AttributeDescriptor::event_attribute(event_name, &attr.name, attr.attribute_type)
    }));
    out.push(AttributeDescriptor::event_time(event_name));
}
