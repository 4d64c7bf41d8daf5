//! Posts API routes

use axum::{Router, middleware};
use axum_helpers::json_envelope;
use domain_posts::{MongoPostRepository, PostBus, handlers};
use tracing::{info, info_span};

use crate::state::AppState;

/// Posts router with successful JSON responses wrapped in the envelope.
pub fn router(state: &AppState) -> Router {
    let repository = MongoPostRepository::new(&state.db);
    let bus = PostBus::new(repository, info_span!("posts"));

    handlers::router(bus).layer(middleware::from_fn(json_envelope))
}

/// Sync the posts collection indexes, including the partial 2dsphere index on `location`.
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoPostRepository::new(db)
        .create_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create post indexes: {}", e))?;
    info!("Post collection indexes created");
    Ok(())
}
