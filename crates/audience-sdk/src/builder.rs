//! Condition builder
//!
//! [`ConditionBuilder`] owns one [`ConditionTree`] and the catalog snapshot
//! its field addresses are checked against. Every operation addresses a node
//! by path, computes the updated tree from the current one and swaps it in
//! only on success, so a rejected edit leaves the tree untouched and the tree
//! is always in its rest state (at least one group, at least one filter per
//! group).

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use audience_core::operator::is_allowed;
use audience_core::{
    allowed_operators, AttributeType, CatalogScope, CatalogSnapshot, ComparisonOperator,
    ConditionTree, CoreError, Filter, FilterIssue, FilterPath, FilterValue, LogicalOperator,
    ValueShape, ValueWidget, Validator,
};
use std::sync::Arc;

/// Stateful editor for one condition tree
#[derive(Debug, Clone)]
pub struct ConditionBuilder {
    catalog: Arc<CatalogSnapshot>,
    tree: ConditionTree,
    disable_singleton_removal: bool,
    allow_unknown_fields: bool,
}

impl ConditionBuilder {
    /// Create a builder holding the initial tree
    pub fn new(catalog: Arc<CatalogSnapshot>) -> Self {
        Self {
            catalog,
            tree: ConditionTree::new(),
            disable_singleton_removal: false,
            allow_unknown_fields: false,
        }
    }

    /// Create a builder editing a previously persisted tree
    pub fn with_tree(catalog: Arc<CatalogSnapshot>, tree: ConditionTree) -> Self {
        Self {
            tree,
            ..Self::new(catalog)
        }
    }

    /// Apply SDK settings
    pub fn with_config(mut self, config: &SdkConfig) -> Self {
        self.disable_singleton_removal = config.disable_singleton_removal;
        self.allow_unknown_fields = config.allow_unknown_fields;
        self
    }

    /// Catalog the builder checks addresses against
    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// Swap the catalog, keeping the tree.
    ///
    /// Filters whose operator the new catalog no longer allows for their
    /// field fall back to EQUALS, and a value whose shape no longer fits is
    /// cleared.
    pub fn set_catalog(&mut self, catalog: Arc<CatalogSnapshot>) {
        self.catalog = catalog;
        self.tree = self.refit_filters();
    }

    fn refit_filters(&self) -> ConditionTree {
        self.tree.map_filters(|path, filter| {
            let Some(ty) = self.catalog.type_of(&filter.field) else {
                return;
            };
            if !is_allowed(Some(ty), filter.operator) {
                tracing::debug!(
                    "Operator {} not allowed for {} field '{}' at group {}, filter {}; reset to EQUALS",
                    filter.operator,
                    ty,
                    filter.field,
                    path.group,
                    path.filter
                );
                filter.operator = ComparisonOperator::Equals;
            }
            let expected = ValueShape::required(Some(ty), filter.operator);
            if filter.value.as_ref().is_some_and(|v| v.shape() != expected) {
                filter.value = None;
            }
        })
    }

    /// Replace the tree, e.g. with one loaded from the store
    pub fn load(&mut self, tree: ConditionTree) {
        self.tree = tree;
    }

    /// Discard all edits
    pub fn reset(&mut self) {
        self.tree = ConditionTree::new();
    }

    /// Borrow the current tree
    pub fn tree(&self) -> &ConditionTree {
        &self.tree
    }

    /// Current tree for submission
    pub fn snapshot(&self) -> ConditionTree {
        self.tree.clone()
    }

    /// Field pickers are enabled only with an available catalog
    pub fn can_pick_fields(&self) -> bool {
        self.catalog.is_available()
    }

    fn filter(&self, path: FilterPath) -> Result<&Filter> {
        self.tree.filter(path).ok_or(SdkError::Core(CoreError::FilterOutOfRange {
            group: path.group,
            filter: path.filter,
        }))
    }

    /// Declared type of the field at `path`, if one is chosen and known
    pub fn field_type(&self, path: FilterPath) -> Result<Option<AttributeType>> {
        let filter = self.filter(path)?;
        Ok(self.catalog.type_of(&filter.field))
    }

    /// Operators offered for the filter at `path`
    pub fn allowed_operators(&self, path: FilterPath) -> Result<&'static [ComparisonOperator]> {
        Ok(allowed_operators(self.field_type(path)?))
    }

    /// Value widget for the filter at `path`, derived fresh from its type and operator
    pub fn widget(&self, path: FilterPath) -> Result<ValueWidget> {
        let operator = self.filter(path)?.operator;
        Ok(ValueWidget::select(self.field_type(path)?, operator))
    }

    /// Choose the field of a filter.
    ///
    /// The operator resets to EQUALS and the value is cleared, whatever they
    /// were before.
    pub fn set_field(&mut self, path: FilterPath, address: impl Into<String>) -> Result<()> {
        let address = address.into();
        if !self.catalog.is_available() {
            return Err(SdkError::CatalogUnavailable);
        }
        if !self.catalog.contains(&address) {
            return Err(SdkError::UnknownField(address));
        }

        self.tree = self.tree.update_filter(path, |filter| {
            filter.field = address;
            filter.operator = ComparisonOperator::Equals;
            filter.value = None;
        })?;
        Ok(())
    }

    /// Choose the operator of a filter.
    ///
    /// The value is cleared when the value shape changes (scalar, list or none).
    pub fn set_operator(&mut self, path: FilterPath, operator: ComparisonOperator) -> Result<()> {
        let attribute_type = self.field_type(path)?;
        if let Some(ty) = attribute_type {
            if !is_allowed(Some(ty), operator) {
                return Err(SdkError::InvalidOperatorForType {
                    operator,
                    attribute_type: ty,
                });
            }
        }

        let current = self.filter(path)?.operator;
        let shape_changed = ValueShape::required(attribute_type, current)
            != ValueShape::required(attribute_type, operator);

        self.tree = self.tree.update_filter(path, |filter| {
            filter.operator = operator;
            if shape_changed {
                filter.value = None;
            }
        })?;
        Ok(())
    }

    /// Store a raw value; only its scalar/list shape is checked against the widget
    pub fn set_value(&mut self, path: FilterPath, value: Option<FilterValue>) -> Result<()> {
        let expected = self.widget(path)?.shape();
        if let Some(ref value) = value {
            if value.shape() != expected {
                return Err(SdkError::ValueShapeMismatch {
                    expected,
                    actual: value.shape(),
                });
            }
        }

        self.tree = self.tree.update_filter(path, |filter| filter.value = value)?;
        Ok(())
    }

    /// Set how the filter at `path` combines with the next filter.
    ///
    /// Ignored on the last filter of a group.
    pub fn set_filter_logic(&mut self, path: FilterPath, logic: LogicalOperator) -> Result<()> {
        self.tree = self.tree.set_filter_logic(path, logic)?;
        Ok(())
    }

    /// Set how group `index` combines with the next group.
    ///
    /// Ignored on the last group.
    pub fn set_group_logic(&mut self, index: usize, logic: LogicalOperator) -> Result<()> {
        self.tree = self.tree.set_group_logic(index, logic)?;
        Ok(())
    }

    /// Append a blank filter to group `group`, returning its path
    pub fn add_filter(&mut self, group: usize) -> Result<FilterPath> {
        self.tree = self.tree.add_filter(group)?;
        let filter = self.tree.groups()[group].len() - 1;
        Ok(FilterPath::new(group, filter))
    }

    /// Remove a filter; a no-op on the only filter of a group
    pub fn remove_filter(&mut self, path: FilterPath) -> Result<()> {
        self.tree = self.tree.remove_filter(path)?;
        Ok(())
    }

    /// Append a group holding one blank filter, returning its index
    pub fn add_group(&mut self) -> usize {
        self.tree = self.tree.add_group();
        self.tree.len() - 1
    }

    /// Remove a group; a no-op on the only group
    pub fn remove_group(&mut self, index: usize) -> Result<()> {
        self.tree = self.tree.remove_group(index)?;
        Ok(())
    }

    /// Whether the remove control of the filter at `path` should be enabled
    pub fn can_remove_filter(&self, path: FilterPath) -> bool {
        match self.tree.group(path.group) {
            Some(group) if path.filter < group.len() => {
                !self.disable_singleton_removal || group.len() > 1
            }
            _ => false,
        }
    }

    /// Whether the remove control of group `index` should be enabled
    pub fn can_remove_group(&self, index: usize) -> bool {
        index < self.tree.len() && (!self.disable_singleton_removal || self.tree.len() > 1)
    }

    /// Validate the current tree against the catalog
    pub fn validate(&self) -> std::result::Result<(), Vec<FilterIssue>> {
        Validator::new()
            .allow_unknown_fields(self.allow_unknown_fields)
            .validate(&self.tree, &self.catalog)
    }

    /// Validate and return the tree for submission
    pub fn submit(&self) -> Result<ConditionTree> {
        self.validate().map_err(SdkError::Validation)?;
        Ok(self.snapshot())
    }

    /// Scope of the catalog in use
    pub fn scope(&self) -> &CatalogScope {
        self.catalog.scope()
    }
}
