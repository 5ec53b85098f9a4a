//! API endpoint handlers

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use audience_core::{CatalogScope, CatalogSnapshot, ConditionTree, SegmentPayload};
use audience_runtime::Evaluator;
use audience_sdk::{ConditionBuilder, TriggerBuilder};
use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Attribute catalog for one scope.
///
/// An unreachable catalog source still answers 200 with `"available": false`.
pub(super) async fn get_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogSnapshot>, ServerError> {
    let scope = match query.scope.as_deref() {
        None | Some("") => CatalogScope::Global,
        Some(raw) => raw.parse::<CatalogScope>()?,
    };

    let snapshot = state.catalog.load(&scope).await;
    debug!(
        "Catalog {} served with {} descriptor(s), available={}",
        scope,
        snapshot.len(),
        snapshot.is_available()
    );
    Ok(Json(snapshot))
}

/// Validate a segment tree against the global catalog
pub(super) async fn validate_segment(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<SegmentPayload>,
) -> Json<ValidateResponse> {
    let builder = segment_builder(&state, payload.groups).await;

    let issues = builder.validate().err().unwrap_or_default();
    info!("Validated segment: {} issue(s)", issues.len());

    Json(ValidateResponse {
        valid: issues.is_empty(),
        issues,
    })
}

/// Evaluate a segment tree against a batch of customer records
pub(super) async fn evaluate_segment(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<EvaluateSegmentRequest>,
) -> Result<Json<EvaluateSegmentResponse>, ServerError> {
    let builder = segment_builder(&state, payload.groups).await;
    builder.submit()?;

    let evaluator = Evaluator::new(builder.catalog());
    let matches = payload
        .customers
        .iter()
        .map(|customer| evaluator.evaluate(builder.tree(), customer))
        .collect::<Result<Vec<bool>, _>>()?;
    let matched = matches.iter().filter(|m| **m).count();

    info!(
        "Evaluated segment over {} customer(s): {} matched",
        matches.len(),
        matched
    );
    Ok(Json(EvaluateSegmentResponse { matches, matched }))
}

/// Evaluate a campaign's triggers against one incoming event
pub(super) async fn evaluate_triggers(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<EvaluateTriggersRequest>,
) -> Result<Json<EvaluateTriggersResponse>, ServerError> {
    let event = payload.event;
    let catalog = Arc::new(state.catalog.load(&CatalogScope::event(&event.name)).await);
    let evaluator = Evaluator::new(&catalog);

    let mut fired_triggers = Vec::new();
    for (index, trigger) in payload.triggers.into_iter().enumerate() {
        if trigger.event_name != event.name {
            continue;
        }

        let trigger =
            TriggerBuilder::from_payload(&state.sdk, trigger, Arc::clone(&catalog)).submit()?;
        if evaluator.trigger_fires(&trigger, &event)? {
            fired_triggers.push(index);
        }
    }

    info!(
        "Event '{}' fired {} trigger(s)",
        event.name,
        fired_triggers.len()
    );
    Ok(Json(EvaluateTriggersResponse {
        fired: !fired_triggers.is_empty(),
        fired_triggers,
    }))
}

async fn segment_builder(state: &AppState, tree: ConditionTree) -> ConditionBuilder {
    let catalog = state.catalog.load(&CatalogScope::Global).await;
    ConditionBuilder::with_tree(Arc::new(catalog), tree).with_config(&state.sdk)
}
