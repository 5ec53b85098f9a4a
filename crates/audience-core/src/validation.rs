//! Submit-time validation of condition trees
//!
//! Validation never fails with a single opaque error: every offending filter is
//! reported with its path so an editor can highlight the exact row.

use crate::catalog::CatalogSnapshot;
use crate::condition::{ConditionTree, Filter, FilterPath};
use crate::operator::{is_allowed, ComparisonOperator, ValueShape};
use crate::types::{AttributeType, TypedValue};
use serde::Serialize;
use thiserror::Error;

/// What is wrong with one filter
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterIssueKind {
    /// No field chosen
    #[error("no field selected")]
    EmptyField,

    /// Field address not present in the catalog
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Operator not allowed for the field's declared type
    #[error("operator {operator} is not allowed for {attribute_type} fields")]
    InvalidOperatorForType {
        operator: ComparisonOperator,
        #[serde(rename = "attributeType")]
        attribute_type: AttributeType,
    },

    /// Operator requires a value and none (or an empty one) was given
    #[error("a value is required")]
    MissingValue,

    /// Value is a scalar where a list is required, or the other way round
    #[error("expected {expected:?} value, got {actual:?}")]
    ValueShapeMismatch {
        expected: ValueShape,
        actual: ValueShape,
    },

    /// Value has the right shape but cannot be read as the field's type
    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}

/// Validation issue attached to one filter
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("group {}, filter {}: {kind}", .path.group, .path.filter)]
pub struct FilterIssue {
    pub path: FilterPath,
    #[serde(flatten)]
    pub kind: FilterIssueKind,
}

/// Validator for condition trees against a catalog snapshot
pub struct Validator {
    /// Whether addresses missing from an available catalog are accepted
    allow_unknown_fields: bool,
}

impl Validator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            allow_unknown_fields: false,
        }
    }

    /// Allow field addresses the catalog does not know
    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }

    /// Validate a tree; returns every issue found, in textual order
    pub fn validate(
        &self,
        tree: &ConditionTree,
        catalog: &CatalogSnapshot,
    ) -> Result<(), Vec<FilterIssue>> {
        let issues: Vec<FilterIssue> = tree
            .filters()
            .filter_map(|(path, filter)| {
                self.validate_filter(filter, catalog)
                    .err()
                    .map(|kind| FilterIssue { path, kind })
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Validate a single filter, reporting its first problem
    pub fn validate_filter(
        &self,
        filter: &Filter,
        catalog: &CatalogSnapshot,
    ) -> Result<(), FilterIssueKind> {
        if !filter.has_field() {
            return Err(FilterIssueKind::EmptyField);
        }

        let attribute_type = catalog.type_of(&filter.field);
        if attribute_type.is_none() && catalog.is_available() && !self.allow_unknown_fields {
            return Err(FilterIssueKind::UnknownField {
                field: filter.field.clone(),
            });
        }

        if let Some(ty) = attribute_type {
            if !is_allowed(Some(ty), filter.operator) {
                return Err(FilterIssueKind::InvalidOperatorForType {
                    operator: filter.operator,
                    attribute_type: ty,
                });
            }
        }

        let expected = ValueShape::required(attribute_type, filter.operator);
        match (&filter.value, expected) {
            (None, ValueShape::None) => Ok(()),
            (Some(value), ValueShape::None) => Err(FilterIssueKind::ValueShapeMismatch {
                expected,
                actual: value.shape(),
            }),
            (None, _) => Err(FilterIssueKind::MissingValue),
            (Some(value), _) if value.is_empty() => Err(FilterIssueKind::MissingValue),
            (Some(value), _) if value.shape() != expected => {
                Err(FilterIssueKind::ValueShapeMismatch {
                    expected,
                    actual: value.shape(),
                })
            }
            (Some(value), _) => match attribute_type {
                Some(ty) => TypedValue::interpret(value, ty, expected)
                    .map(|_| ())
                    .map_err(|e| FilterIssueKind::InvalidValue {
                        message: e.to_string(),
                    }),
                None => Ok(()),
            },
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogScope;
    use crate::types::{AttributeDescriptor, FilterValue};

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(
            CatalogScope::Global,
            vec![
                AttributeDescriptor::profile("email", AttributeType::StringScalar),
                AttributeDescriptor::custom("age", AttributeType::NumberScalar),
                AttributeDescriptor::custom("vip", AttributeType::Boolean),
                AttributeDescriptor::custom("tags", AttributeType::StringList),
                AttributeDescriptor::event_time("purchase"),
            ],
        )
        .unwrap()
    }

    fn tree_of(filters: Vec<Filter>) -> ConditionTree {
        ConditionTree::from_groups(vec![crate::condition::Group::with_filters(filters)])
    }

    #[test]
    fn test_valid_tree() {
        let tree = tree_of(vec![
            Filter::new(
                "email",
                ComparisonOperator::In,
                Some(FilterValue::texts(["a@x.com"])),
            ),
            Filter::new("attributes.age", ComparisonOperator::GreaterThan, Some(FilterValue::int(18))),
            Filter::new("attributes.vip", ComparisonOperator::Equals, Some(FilterValue::boolean(true))),
            Filter::new("attributes.tags", ComparisonOperator::Exists, None),
            Filter::new(
                "events.purchase.time",
                ComparisonOperator::LessThanEquals,
                Some(FilterValue::text("2025-01-01T00:00:00Z")),
            ),
        ]);

        assert!(Validator::new().validate(&tree, &catalog()).is_ok());
    }

    #[test]
    fn test_issues_reported_per_filter() {
        let tree = tree_of(vec![
            Filter::blank(),
            Filter::new("email", ComparisonOperator::Equals, Some(FilterValue::text("a@x.com"))),
            Filter::new("attributes.age", ComparisonOperator::Like, Some(FilterValue::text("1"))),
            Filter::new("email", ComparisonOperator::Equals, None),
        ]);

        let issues = Validator::new().validate(&tree, &catalog()).unwrap_err();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].path, FilterPath::new(0, 0));
        assert_eq!(issues[0].kind, FilterIssueKind::EmptyField);
        assert_eq!(issues[1].path, FilterPath::new(0, 2));
        assert_eq!(
            issues[1].kind,
            FilterIssueKind::InvalidOperatorForType {
                operator: ComparisonOperator::Like,
                attribute_type: AttributeType::NumberScalar,
            }
        );
        assert_eq!(issues[2].path, FilterPath::new(0, 3));
        assert_eq!(issues[2].kind, FilterIssueKind::MissingValue);
    }

    #[test]
    fn test_shape_mismatch() {
        let tree = tree_of(vec![Filter::new(
            "email",
            ComparisonOperator::In,
            Some(FilterValue::text("a@x.com")),
        )]);
        let issues = Validator::new().validate(&tree, &catalog()).unwrap_err();
        assert_eq!(
            issues[0].kind,
            FilterIssueKind::ValueShapeMismatch {
                expected: ValueShape::List,
                actual: ValueShape::Scalar,
            }
        );
    }

    #[test]
    fn test_empty_list_is_missing() {
        let tree = tree_of(vec![Filter::new(
            "email",
            ComparisonOperator::NotIn,
            Some(FilterValue::List(vec![])),
        )]);
        let issues = Validator::new().validate(&tree, &catalog()).unwrap_err();
        assert_eq!(issues[0].kind, FilterIssueKind::MissingValue);
    }

    #[test]
    fn test_unparseable_value() {
        let tree = tree_of(vec![Filter::new(
            "events.purchase.time",
            ComparisonOperator::GreaterThan,
            Some(FilterValue::text("last tuesday")),
        )]);
        let issues = Validator::new().validate(&tree, &catalog()).unwrap_err();
        assert!(matches!(issues[0].kind, FilterIssueKind::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_field() {
        let tree = tree_of(vec![Filter::new(
            "attributes.missing",
            ComparisonOperator::Exists,
            None,
        )]);

        let issues = Validator::new().validate(&tree, &catalog()).unwrap_err();
        assert!(matches!(issues[0].kind, FilterIssueKind::UnknownField { .. }));

        let lenient = Validator::new().allow_unknown_fields(true);
        assert!(lenient.validate(&tree, &catalog()).is_ok());

        // unavailable catalog cannot judge addresses
        let offline = CatalogSnapshot::unavailable(CatalogScope::Global);
        assert!(Validator::new().validate(&tree, &offline).is_ok());
    }

    #[test]
    fn test_issue_serializes_with_path() {
        let issue = FilterIssue {
            path: FilterPath::new(1, 2),
            kind: FilterIssueKind::MissingValue,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"]["group"], 1);
        assert_eq!(json["kind"], "missingValue");
        assert_eq!(issue.to_string(), "group 1, filter 2: a value is required");
    }
}
