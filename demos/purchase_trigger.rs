//! Purchase Trigger Example
//!
//! A campaign with two triggers:
//! - a `purchase` of more than 100 before 2025
//! - any `signup`
//!
//! Shows that switching the trigger event discards conditions written for the
//! previous event, then evaluates incoming events against the saved list.

use anyhow::Result;
use audience_core::{AttributeDefinitions, CatalogScope, ComparisonOperator, FilterPath, FilterValue};
use audience_repository::{ConditionStore, MemoryCatalogSource, MemoryConditionStore};
use audience_runtime::{EventRecord, Evaluator};
use audience_sdk::{save_triggers, SdkConfig, TriggerSession};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    println!("=== Purchase Trigger Example ===\n");

    let definitions: AttributeDefinitions = serde_json::from_value(json!({
        "events": [
            {"name": "purchase", "attributes": [{"name": "amount", "type": "NumberScalar"}]},
            {"name": "signup", "attributes": [{"name": "source", "type": "StringScalar"}]}
        ]
    }))?;
    let source = MemoryCatalogSource::new().with_project("shop", definitions);
    let store = MemoryConditionStore::new();
    let config = SdkConfig::new().with_project("shop");
    let loader = config.catalog_loader(Arc::new(source))?;

    // Start on the wrong event, write a condition, then switch
    let mut purchase = TriggerSession::new(&config);
    purchase.choose_event("signup", &loader).await;
    let path = FilterPath::new(0, 0);
    purchase.builder_mut()?.set_field(path, "events.signup.attributes.source")?;
    println!(
        "Before switch: {}",
        serde_json::to_string(&purchase.trigger().snapshot())?
    );

    purchase.choose_event("purchase", &loader).await;
    println!(
        "After switch:  {}\n",
        serde_json::to_string(&purchase.trigger().snapshot())?
    );

    let builder = purchase.builder_mut()?;
    builder.set_field(path, "events.purchase.attributes.amount")?;
    builder.set_operator(path, ComparisonOperator::GreaterThan)?;
    builder.set_value(path, Some(FilterValue::int(100)))?;
    let time = builder.add_filter(0)?;
    builder.set_field(time, "events.purchase.time")?;
    builder.set_operator(time, ComparisonOperator::LessThanEquals)?;
    builder.set_value(time, Some(FilterValue::text("2025-01-01T00:00:00Z")))?;

    let mut signup = TriggerSession::new(&config);
    signup.choose_event("signup", &loader).await;
    let builder = signup.builder_mut()?;
    builder.set_field(path, "events.signup.time")?;
    builder.set_operator(path, ComparisonOperator::Exists)?;

    let saved = save_triggers(&[purchase, signup], &store, "welcome").await?;
    println!("Saved triggers:\n{}\n", serde_json::to_string_pretty(&saved)?);

    let triggers = store.load_triggers("welcome").await?;
    let events = [
        EventRecord::new("purchase", at(2024, 6, 1, 10)?)
            .with_attribute("amount", json!(120)),
        EventRecord::new("purchase", at(2024, 6, 1, 10)?)
            .with_attribute("amount", json!(40)),
        EventRecord::new("purchase", at(2025, 3, 1, 10)?)
            .with_attribute("amount", json!(500)),
        EventRecord::new("signup", at(2024, 6, 2, 9)?),
    ];

    for event in &events {
        let catalog = loader
            .load(&CatalogScope::event(&event.name))
            .await;
        let fired = Evaluator::new(&catalog).any_trigger_fires(&triggers, event)?;
        println!(
            "  {:<8} at {} {:?} -> {}",
            event.name,
            event.time.to_rfc3339(),
            event.attributes.get("amount"),
            if fired { "campaign fires" } else { "no trigger fired" }
        );
    }

    Ok(())
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid timestamp"))
}
