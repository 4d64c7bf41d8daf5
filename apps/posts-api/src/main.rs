use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);
    observability::init_metrics()?;

    info!(
        name = config.app.name,
        version = config.app.version,
        "Connecting to MongoDB at {}",
        config.mongodb.redacted_url()
    );

    let mongo_client = database::mongodb::connect_from_config_with_retry(
        &config.mongodb,
        Some(config.mongodb_retry.clone()),
    )
    .await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(database = config.mongodb.database(), "Connected to MongoDB");

    api::posts::init_indexes(&db).await?;

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let router = create_router::<openapi::ApiDoc>(api::routes(&state), &state.config.server)?;
    let app = router.merge(health_router(state.config.app));

    let mongo_client = state.mongo_client.clone();

    info!("Starting posts API (30s shutdown timeout)");

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            drop(mongo_client);
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Posts API shutdown complete");
    Ok(())
}
