//! Trigger builder
//!
//! A trigger's conditions are scoped to one event. Until an event is chosen
//! the condition editor is unavailable; choosing a different event discards
//! the tree, since its addresses belong to the previous event.

use crate::builder::ConditionBuilder;
use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use audience_core::{CatalogScope, CatalogSnapshot, TriggerConfig, TriggerPayload};
use std::sync::Arc;

/// Editor for one campaign trigger
#[derive(Debug, Clone)]
pub struct TriggerBuilder {
    event_name: Option<String>,
    builder: ConditionBuilder,
    config: SdkConfig,
}

impl TriggerBuilder {
    /// Create a trigger editor with no event chosen
    pub fn new(config: &SdkConfig) -> Self {
        let catalog = Arc::new(CatalogSnapshot::unavailable(CatalogScope::Global));
        Self {
            event_name: None,
            builder: ConditionBuilder::new(catalog).with_config(config),
            config: config.clone(),
        }
    }

    /// Resume editing a persisted trigger
    pub fn from_payload(
        config: &SdkConfig,
        payload: TriggerPayload,
        catalog: Arc<CatalogSnapshot>,
    ) -> Self {
        let event_name = Some(payload.event_name).filter(|name| !name.is_empty());
        Self {
            event_name,
            builder: ConditionBuilder::with_tree(catalog, payload.condition_tree)
                .with_config(config),
            config: config.clone(),
        }
    }

    /// Chosen event, if any
    pub fn event_name(&self) -> Option<&str> {
        self.event_name.as_deref()
    }

    /// Conditions can only be edited once an event is chosen
    pub fn is_editable(&self) -> bool {
        self.event_name.is_some()
    }

    /// Choose the governing event.
    ///
    /// Choosing a different event resets the tree to its initial state and
    /// installs `catalog`; re-selecting the current event only swaps the catalog.
    pub fn select_event(&mut self, event_name: impl Into<String>, catalog: Arc<CatalogSnapshot>) {
        let event_name = event_name.into();
        if self.event_name.as_deref() == Some(event_name.as_str()) {
            self.builder.set_catalog(catalog);
            return;
        }

        tracing::debug!("Trigger event switched to '{}', resetting conditions", event_name);
        self.builder = ConditionBuilder::new(catalog).with_config(&self.config);
        self.event_name = Some(event_name);
    }

    /// Swap the catalog of the current event, keeping the tree
    pub fn set_catalog(&mut self, catalog: Arc<CatalogSnapshot>) {
        self.builder.set_catalog(catalog);
    }

    /// Condition builder for reading state (widgets, operators, tree)
    pub fn builder(&self) -> &ConditionBuilder {
        &self.builder
    }

    /// Condition builder for editing; requires a chosen event
    pub fn builder_mut(&mut self) -> Result<&mut ConditionBuilder> {
        if self.event_name.is_none() {
            return Err(SdkError::EventNotSelected);
        }
        Ok(&mut self.builder)
    }

    /// Current trigger, if an event is chosen
    pub fn snapshot(&self) -> Option<TriggerConfig> {
        self.event_name.as_ref().map(|event_name| TriggerConfig {
            event_name: event_name.clone(),
            condition_tree: self.builder.snapshot(),
        })
    }

    /// Validate and return the trigger for submission
    pub fn submit(&self) -> Result<TriggerPayload> {
        let event_name = self.event_name.clone().ok_or(SdkError::EventNotSelected)?;
        Ok(TriggerConfig {
            event_name,
            condition_tree: self.builder.submit()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audience_core::{AttributeDefinitions, FilterPath};

    fn catalog_for(event: &str) -> Arc<CatalogSnapshot> {
        let definitions: AttributeDefinitions = serde_json::from_str(
            r#"{"events": [
                {"name": "purchase", "attributes": [{"name": "amount", "type": "NumberScalar"}]},
                {"name": "signup", "attributes": [{"name": "source", "type": "StringScalar"}]}
            ]}"#,
        )
        .unwrap();
        Arc::new(CatalogSnapshot::from_definitions(
            CatalogScope::event(event),
            &definitions,
        ))
    }

    #[test]
    fn test_editing_requires_event() {
        let mut trigger = TriggerBuilder::new(&SdkConfig::default());
        assert!(!trigger.is_editable());
        assert!(matches!(
            trigger.builder_mut(),
            Err(SdkError::EventNotSelected)
        ));
        assert!(trigger.snapshot().is_none());
        assert!(matches!(trigger.submit(), Err(SdkError::EventNotSelected)));
    }

    #[test]
    fn test_switching_event_resets_tree() {
        let mut trigger = TriggerBuilder::new(&SdkConfig::default());
        trigger.select_event("purchase", catalog_for("purchase"));

        let builder = trigger.builder_mut().unwrap();
        builder
            .set_field(FilterPath::new(0, 0), "events.purchase.attributes.amount")
            .unwrap();
        builder.add_group();

        // same event keeps the conditions
        trigger.select_event("purchase", catalog_for("purchase"));
        assert_eq!(trigger.builder().tree().len(), 2);

        trigger.select_event("signup", catalog_for("signup"));
        assert!(trigger.builder().tree().is_pristine());
        assert_eq!(trigger.event_name(), Some("signup"));
        assert!(trigger
            .builder()
            .catalog()
            .contains("events.signup.attributes.source"));
    }

    #[test]
    fn test_untouched_trigger_rejected() {
        let mut trigger = TriggerBuilder::new(&SdkConfig::default());
        trigger.select_event("signup", catalog_for("signup"));

        match trigger.submit() {
            Err(SdkError::Validation(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].path, FilterPath::new(0, 0));
                assert_eq!(issues[0].kind, audience_core::FilterIssueKind::EmptyField);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
