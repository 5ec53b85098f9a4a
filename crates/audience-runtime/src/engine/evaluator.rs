//! Condition tree evaluator
//!
//! Groups and filters combine with a strict left-to-right fold: the running
//! result is combined with the next term using the *previous* node's
//! `nextLogic`. There is no precedence between AND and OR, so
//! `[A (OR), B (AND), C]` means `(A OR B) AND C`.

use super::operators::{execute_compare, infer_type};
use crate::context::{CustomerRecord, EventRecord, Subject};
use crate::error::{Result, RuntimeError};
use audience_core::{
    CatalogSnapshot, ComparisonOperator, ConditionTree, Filter, LogicalOperator, TriggerConfig,
    TypedValue, ValueShape,
};

/// Evaluates condition trees using a catalog snapshot for field types
pub struct Evaluator<'a> {
    catalog: &'a CatalogSnapshot,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator; fields missing from `catalog` have their type
    /// inferred from the filter value
    pub fn new(catalog: &'a CatalogSnapshot) -> Self {
        Self { catalog }
    }

    /// Evaluate a segment tree against a customer
    pub fn evaluate(&self, tree: &ConditionTree, record: &CustomerRecord) -> Result<bool> {
        self.evaluate_tree(tree, Subject::Customer(record))
    }

    /// Evaluate a tree against a single event
    pub fn evaluate_event(&self, tree: &ConditionTree, event: &EventRecord) -> Result<bool> {
        self.evaluate_tree(tree, Subject::Event(event))
    }

    /// Returns true when `event` fires `trigger`: the event name matches and
    /// the trigger's tree holds for the event
    pub fn trigger_fires(&self, trigger: &TriggerConfig, event: &EventRecord) -> Result<bool> {
        if trigger.event_name.is_empty() || trigger.event_name != event.name {
            return Ok(false);
        }
        self.evaluate_event(&trigger.condition_tree, event)
    }

    /// A campaign's triggers are alternatives: any one firing is enough
    pub fn any_trigger_fires(&self, triggers: &[TriggerConfig], event: &EventRecord) -> Result<bool> {
        for trigger in triggers {
            if self.trigger_fires(trigger, event)? {
                tracing::debug!("Trigger on '{}' fired", trigger.event_name);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Evaluate a tree against any subject.
    ///
    /// A blank filter is an error, including the single blank row of a
    /// tree that was never edited.
    pub fn evaluate_tree(&self, tree: &ConditionTree, subject: Subject<'_>) -> Result<bool> {
        fold(tree.groups(), |group| group.next_logic, |group| {
            fold(group.filters(), |filter| filter.next_logic, |filter| {
                self.evaluate_filter(filter, subject)
            })
        })
    }

    /// Evaluate one filter against a subject
    pub fn evaluate_filter(&self, filter: &Filter, subject: Subject<'_>) -> Result<bool> {
        if !filter.has_field() {
            return Err(RuntimeError::InvalidFilter("filter has no field".to_string()));
        }

        let op = filter.operator;
        let candidates = subject.resolve(&filter.field);

        if op.is_presence() {
            let exists = candidates.iter().any(|value| !value.is_null());
            return Ok(match op {
                ComparisonOperator::Exists => exists,
                _ => !exists,
            });
        }

        let value = filter.value.as_ref().ok_or_else(|| {
            RuntimeError::InvalidFilter(format!("{} on '{}' requires a value", op, filter.field))
        })?;

        // An empty membership list matches nothing for IN and everything for NOT_IN
        if op.is_membership() && value.is_empty() {
            return Ok(op == ComparisonOperator::NotIn);
        }

        let attribute_type = self
            .catalog
            .type_of(&filter.field)
            .unwrap_or_else(|| infer_type(Some(value)));
        let shape = ValueShape::required(Some(attribute_type), op);
        let expected = TypedValue::interpret(value, attribute_type, shape)?;

        for actual in &candidates {
            if execute_compare(actual, op, &expected, attribute_type)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Left fold over a non-empty list of terms joined by each term's `nextLogic`
fn fold<T>(
    items: &[T],
    next_logic: impl Fn(&T) -> LogicalOperator,
    mut eval: impl FnMut(&T) -> Result<bool>,
) -> Result<bool> {
    let Some((first, rest)) = items.split_first() else {
        return Ok(false);
    };

    let mut result = eval(first)?;
    let mut logic = next_logic(first);
    for item in rest {
        result = logic.apply(result, eval(item)?);
        logic = next_logic(item);
    }
    Ok(result)
}
