//! Segment Builder Example
//!
//! Edits a segment the way a condition editor would:
//! - opens a session over an in-memory catalog
//! - fills the first row, adds a second group joined with OR
//! - submits and saves the `{ "groups": [...] }` payload
//! - evaluates the saved tree against a few customer records

use anyhow::Result;
use audience_core::{
    AttributeDefinitions, ComparisonOperator, FilterPath, FilterValue, LogicalOperator,
};
use audience_repository::{ConditionStore, MemoryCatalogSource, MemoryConditionStore};
use audience_runtime::{CustomerRecord, Evaluator};
use audience_sdk::{SdkConfig, SegmentSession};
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

    println!("=== Segment Builder Example ===\n");

    let definitions: AttributeDefinitions = serde_json::from_value(json!({
        "customAttributes": [
            {"name": "age", "type": "NumberScalar"},
            {"name": "plan", "type": "StringScalar"}
        ],
        "events": [
            {"name": "purchase", "attributes": [{"name": "amount", "type": "NumberScalar"}]}
        ]
    }))?;
    let source = MemoryCatalogSource::new().with_project("shop", definitions);
    let store = MemoryConditionStore::new();

    let config = SdkConfig::new().with_project("shop");
    let loader = config.catalog_loader(Arc::new(source))?;
    let mut session = SegmentSession::open(&config, &loader).await;
    println!(
        "Catalog loaded: {} field(s)",
        session.builder().catalog().len()
    );

    // (email IN [...] AND age > 18) OR plan = "pro"
    let builder = session.builder_mut()?;
    let first = FilterPath::new(0, 0);
    builder.set_field(first, "email")?;
    builder.set_operator(first, ComparisonOperator::In)?;
    builder.set_value(first, Some(FilterValue::texts(["a@x.com", "b@x.com"])))?;

    let second = builder.add_filter(0)?;
    builder.set_field(second, "attributes.age")?;
    builder.set_operator(second, ComparisonOperator::GreaterThan)?;
    builder.set_value(second, Some(FilterValue::int(18)))?;

    builder.set_group_logic(0, LogicalOperator::Or)?;
    let group = builder.add_group();
    let third = FilterPath::new(group, 0);
    builder.set_field(third, "attributes.plan")?;
    builder.set_value(third, Some(FilterValue::text("pro")))?;

    let payload = session.save(&store, "adults-or-pro").await?;
    println!("Saved payload:\n{}\n", serde_json::to_string_pretty(&payload)?);

    let saved = store.load_segment("adults-or-pro").await?;
    let catalog = loader.load(session.builder().scope()).await;
    let evaluator = Evaluator::new(&catalog);

    let customers = [
        (
            "a@x.com, 30",
            CustomerRecord::new()
                .with_profile("email", json!("a@x.com"))
                .with_attribute("age", json!(30)),
        ),
        (
            "b@x.com, 12",
            CustomerRecord::new()
                .with_profile("email", json!("b@x.com"))
                .with_attribute("age", json!(12)),
        ),
        (
            "c@x.com, pro",
            CustomerRecord::new()
                .with_profile("email", json!("c@x.com"))
                .with_attribute("plan", json!("pro")),
        ),
    ];

    for (label, customer) in &customers {
        let matched = evaluator.evaluate(&saved.groups, customer)?;
        println!("  {:<14} -> {}", label, if matched { "in segment" } else { "not in segment" });
    }

    Ok(())
}
