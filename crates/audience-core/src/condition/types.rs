//! Filter / Group / ConditionTree types
//!
//! Trees are updated by path (group index, filter index); every update returns a
//! new tree and leaves the receiver untouched.

use crate::error::{CoreError, Result};
use crate::operator::{ComparisonOperator, LogicalOperator};
use crate::types::FilterValue;
use serde::{Deserialize, Serialize};

/// Address of one filter inside a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterPath {
    pub group: usize,
    pub filter: usize,
}

impl FilterPath {
    pub fn new(group: usize, filter: usize) -> Self {
        Self { group, filter }
    }
}

/// One condition (leaf node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Field address; empty only while the filter is being edited
    #[serde(default)]
    pub field: String,

    #[serde(default)]
    pub operator: ComparisonOperator,

    /// Omitted for EXISTS / NOT_EXISTS and while no value is entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,

    /// Connective to the next filter of the group
    #[serde(default)]
    pub next_logic: LogicalOperator,
}

impl Filter {
    /// A blank filter: no field, EQUALS, no value, AND
    pub fn blank() -> Self {
        Self {
            field: String::new(),
            operator: ComparisonOperator::Equals,
            value: None,
            next_logic: LogicalOperator::And,
        }
    }

    /// Create a filter with an explicit field, operator and value
    pub fn new(
        field: impl Into<String>,
        operator: ComparisonOperator,
        value: Option<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            next_logic: LogicalOperator::And,
        }
    }

    /// Set the connective to the next sibling
    pub fn with_next_logic(mut self, logic: LogicalOperator) -> Self {
        self.next_logic = logic;
        self
    }

    /// Returns true once a field has been chosen
    pub fn has_field(&self) -> bool {
        !self.field.trim().is_empty()
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::blank()
    }
}

/// Ordered list of filters combined left to right (branch node)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "super::wire::GroupRepr")]
pub struct Group {
    filters: Vec<Filter>,

    /// Connective to the next group of the tree
    pub next_logic: LogicalOperator,
}

impl Group {
    /// A group holding one blank filter
    pub fn new() -> Self {
        Self {
            filters: vec![Filter::blank()],
            next_logic: LogicalOperator::And,
        }
    }

    /// Create a group from filters; an empty list is repopulated with one blank filter
    pub fn with_filters(filters: Vec<Filter>) -> Self {
        let mut group = Self {
            filters,
            next_logic: LogicalOperator::And,
        };
        group.restore_invariants();
        group
    }

    /// Set the connective to the next group
    pub fn with_next_logic(mut self, logic: LogicalOperator) -> Self {
        self.next_logic = logic;
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always false for a group in its rest state
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub(crate) fn restore_invariants(&mut self) {
        if self.filters.is_empty() {
            self.filters.push(Filter::blank());
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level container: ordered, non-empty list of groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Group>", into = "Vec<Group>")]
pub struct ConditionTree {
    groups: Vec<Group>,
}

impl ConditionTree {
    /// The initial tree: one group holding one blank filter
    pub fn new() -> Self {
        Self {
            groups: vec![Group::new()],
        }
    }

    /// Create a tree from groups, restoring the rest state if needed
    pub fn from_groups(groups: Vec<Group>) -> Self {
        let mut tree = Self { groups };
        tree.restore_invariants();
        tree
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn filter(&self, path: FilterPath) -> Option<&Filter> {
        self.groups
            .get(path.group)
            .and_then(|g| g.filters.get(path.filter))
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always false for a tree in its rest state
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All filters with their paths, in textual order
    pub fn filters(&self) -> impl Iterator<Item = (FilterPath, &Filter)> + '_ {
        self.groups.iter().enumerate().flat_map(|(g, group)| {
            group
                .filters
                .iter()
                .enumerate()
                .map(move |(f, filter)| (FilterPath::new(g, f), filter))
        })
    }

    /// Returns true if the tree is still in its initial state
    pub fn is_pristine(&self) -> bool {
        *self == Self::new()
    }

    /// Return a tree with the filter at `path` updated by `update`
    pub fn update_filter<F>(&self, path: FilterPath, update: F) -> Result<Self>
    where
        F: FnOnce(&mut Filter),
    {
        self.check_filter(path)?;
        let mut next = self.clone();
        update(&mut next.groups[path.group].filters[path.filter]);
        Ok(next)
    }

    /// Return a tree with `update` applied to every filter, in textual order
    pub fn map_filters<F>(&self, mut update: F) -> Self
    where
        F: FnMut(FilterPath, &mut Filter),
    {
        let mut next = self.clone();
        for (group_index, group) in next.groups.iter_mut().enumerate() {
            for (filter_index, filter) in group.filters.iter_mut().enumerate() {
                update(FilterPath::new(group_index, filter_index), filter);
            }
        }
        next
    }

    /// Return a tree with a blank filter appended to group `group`
    pub fn add_filter(&self, group: usize) -> Result<Self> {
        self.check_group(group)?;
        let mut next = self.clone();
        next.groups[group].filters.push(Filter::blank());
        Ok(next)
    }

    /// Return a tree without the filter at `path`.
    ///
    /// Removing the only filter of a group is a no-op.
    pub fn remove_filter(&self, path: FilterPath) -> Result<Self> {
        self.check_filter(path)?;
        let mut next = self.clone();
        let filters = &mut next.groups[path.group].filters;
        if filters.len() > 1 {
            filters.remove(path.filter);
        }
        next.restore_invariants();
        Ok(next)
    }

    /// Return a tree with a new one-blank-filter group appended
    pub fn add_group(&self) -> Self {
        let mut next = self.clone();
        next.groups.push(Group::new());
        next
    }

    /// Return a tree without group `index`.
    ///
    /// Removing the only group is a no-op. Every remaining group is re-checked
    /// and repopulated with a blank filter if it ended up empty.
    pub fn remove_group(&self, index: usize) -> Result<Self> {
        self.check_group(index)?;
        let mut next = self.clone();
        if next.groups.len() > 1 {
            next.groups.remove(index);
        }
        next.restore_invariants();
        Ok(next)
    }

    /// Return a tree with the connective after filter `path` set.
    ///
    /// Ignored for the last filter of a group.
    pub fn set_filter_logic(&self, path: FilterPath, logic: LogicalOperator) -> Result<Self> {
        self.check_filter(path)?;
        let mut next = self.clone();
        let filters = &mut next.groups[path.group].filters;
        if path.filter + 1 < filters.len() {
            filters[path.filter].next_logic = logic;
        }
        Ok(next)
    }

    /// Return a tree with the connective after group `index` set.
    ///
    /// Ignored for the last group.
    pub fn set_group_logic(&self, index: usize, logic: LogicalOperator) -> Result<Self> {
        self.check_group(index)?;
        let mut next = self.clone();
        if index + 1 < next.groups.len() {
            next.groups[index].next_logic = logic;
        }
        Ok(next)
    }

    /// Re-establish the rest state: at least one group, at least one filter per group
    pub fn restore_invariants(&mut self) {
        if self.groups.is_empty() {
            self.groups.push(Group::new());
        }
        for group in &mut self.groups {
            group.restore_invariants();
        }
    }

    fn check_group(&self, group: usize) -> Result<()> {
        if group < self.groups.len() {
            Ok(())
        } else {
            Err(CoreError::GroupOutOfRange(group))
        }
    }

    fn check_filter(&self, path: FilterPath) -> Result<()> {
        self.check_group(path.group)?;
        if path.filter < self.groups[path.group].filters.len() {
            Ok(())
        } else {
            Err(CoreError::FilterOutOfRange {
                group: path.group,
                filter: path.filter,
            })
        }
    }
}

impl Default for ConditionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Group>> for ConditionTree {
    fn from(groups: Vec<Group>) -> Self {
        Self::from_groups(groups)
    }
}

impl From<ConditionTree> for Vec<Group> {
    fn from(tree: ConditionTree) -> Self {
        tree.groups
    }
}

/// Trigger of an action-based campaign: one event plus the tree evaluated against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    pub event_name: String,

    #[serde(rename = "filterGroups", default)]
    pub condition_tree: ConditionTree,
}

impl TriggerConfig {
    /// Create a trigger on `event_name` with the initial tree
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            condition_tree: ConditionTree::new(),
        }
    }

    /// Switch the governing event.
    ///
    /// Field addresses are event-scoped, so switching to a different event
    /// resets the tree to its initial state.
    pub fn set_event_name(&mut self, event_name: impl Into<String>) {
        let event_name = event_name.into();
        if event_name != self.event_name {
            self.event_name = event_name;
            self.condition_tree = ConditionTree::new();
        }
    }
}
