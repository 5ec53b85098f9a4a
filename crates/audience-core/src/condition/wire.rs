//! Wire payloads exchanged with the persistence collaborator

use super::types::{ConditionTree, Filter, Group, TriggerConfig};
use crate::operator::LogicalOperator;
use serde::{Deserialize, Serialize};

/// Deserialization form of a group; an empty `filters` list is repaired on load
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroupRepr {
    #[serde(default)]
    filters: Vec<Filter>,
    #[serde(default)]
    next_logic: LogicalOperator,
}

impl From<GroupRepr> for Group {
    fn from(repr: GroupRepr) -> Self {
        Group::with_filters(repr.filters).with_next_logic(repr.next_logic)
    }
}

/// Persisted form of a segment: `{ "groups": [...] }`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentPayload {
    #[serde(default)]
    pub groups: ConditionTree,
}

impl From<ConditionTree> for SegmentPayload {
    fn from(groups: ConditionTree) -> Self {
        Self { groups }
    }
}

/// Persisted form of a trigger: `{ "eventName": "...", "filterGroups": [...] }`
pub type TriggerPayload = TriggerConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::FilterPath;
    use crate::operator::ComparisonOperator;
    use crate::types::FilterValue;

    #[test]
    fn test_tree_is_bare_array() {
        let tree = ConditionTree::new()
            .update_filter(FilterPath::new(0, 0), |f| {
                f.field = "email".to_string();
                f.operator = ComparisonOperator::In;
                f.value = Some(FilterValue::texts(["a@x.com", "b@x.com"]));
            })
            .unwrap();

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "filters": [{
                    "field": "email",
                    "operator": "IN",
                    "value": ["a@x.com", "b@x.com"],
                    "nextLogic": "AND"
                }],
                "nextLogic": "AND"
            }])
        );
    }

    #[test]
    fn test_exists_omits_value() {
        let tree = ConditionTree::new()
            .update_filter(FilterPath::new(0, 0), |f| {
                f.field = "phone".to_string();
                f.operator = ComparisonOperator::Exists;
            })
            .unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        assert!(!json.contains("value"));
    }

    #[test]
    fn test_null_value_loads_as_none() {
        let tree: ConditionTree = serde_json::from_str(
            r#"[{"filters":[{"field":"phone","operator":"NOT_EXISTS","value":null,"nextLogic":"OR"}],"nextLogic":"AND"}]"#,
        )
        .unwrap();
        let filter = &tree.groups()[0].filters()[0];
        assert_eq!(filter.value, None);
        assert_eq!(filter.next_logic, LogicalOperator::Or);
    }

    #[test]
    fn test_empty_wire_repaired() {
        let tree: ConditionTree = serde_json::from_str("[]").unwrap();
        assert!(tree.is_pristine());

        let tree: ConditionTree =
            serde_json::from_str(r#"[{"filters":[],"nextLogic":"OR"}]"#).unwrap();
        assert_eq!(tree.groups()[0].len(), 1);
        assert_eq!(tree.groups()[0].next_logic, LogicalOperator::Or);
    }

    #[test]
    fn test_segment_payload() {
        let payload = SegmentPayload::from(ConditionTree::new());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("groups").unwrap().is_array());
    }

    #[test]
    fn test_trigger_payload_shape() {
        let trigger = TriggerPayload::new("purchase");
        let json = serde_json::to_value(&trigger).unwrap();
        assert_eq!(json["eventName"], "purchase");
        assert!(json["filterGroups"].is_array());

        let back: TriggerPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, trigger);
    }
}
