//! Condition Model
//!
//! A condition tree is a two-level AND/OR expression:
//!
//! ```text
//! ConditionTree = [Group, Group, ...]          (never empty)
//! Group         = { filters: [Filter, ...],    (never empty)
//!                   nextLogic }
//! Filter        = { field, operator, value, nextLogic }
//! ```
//!
//! `nextLogic` always declares how a node combines with the **next** sibling;
//! it is meaningless on the last node of a list. Evaluation is a strict
//! left-to-right fold with no precedence between AND and OR.
//!
//! ## Wire format
//!
//! ```json
//! [
//!   {
//!     "filters": [
//!       {"field": "email", "operator": "IN", "value": ["a@x.com"], "nextLogic": "AND"}
//!     ],
//!     "nextLogic": "AND"
//!   }
//! ]
//! ```
//!
//! Segments persist as `{ "groups": [...] }`, triggers as
//! `{ "eventName": "...", "filterGroups": [...] }`.

mod types;
mod wire;

pub use types::{ConditionTree, Filter, FilterPath, Group, TriggerConfig};
pub use wire::{SegmentPayload, TriggerPayload};
