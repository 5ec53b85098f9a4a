//! Audience HTTP Server

use anyhow::Result;
use audience_sdk::SdkConfig;
use audience_server::{create_router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load()?;
    init_tracing(&config)?;
    info!("Loaded configuration: {:?}", config);

    let loader = config.catalog_loader()?;
    info!(
        "Catalog source {:?} for project '{}'",
        config.repository.source,
        loader.project()
    );

    let sdk = SdkConfig::new()
        .with_project(loader.project())
        .with_unknown_fields_allowed(config.allow_unknown_fields);
    sdk.validate()?;
    let app = create_router(AppState::new(loader).with_sdk_config(sdk));

    let addr = config.bind_address();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Catalog: http://{}/v1/catalog?scope=global", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(config: &ServerConfig) -> Result<()> {
    let level = &config.log_level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "audience_server={level},audience_sdk={level},audience_runtime={level},audience_repository={level},tower_http=debug"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
