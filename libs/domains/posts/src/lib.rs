//! Posts Domain
//!
//! Blog posts and events sharing one MongoDB collection, told apart by a
//! `type` discriminator.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    Handlers      │  ← HTTP endpoints, request validation
//! └────────┬─────────┘
//!          │ commands / queries
//! ┌────────▼─────────┐
//! │     PostBus      │  ← one handler per use case, logging + metrics
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │   Repository     │  ← trait + MongoDB implementation, pagination
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ Document mapper  │  ← PostDocument ⇄ Post { Blog | Event }
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_posts::{MongoPostRepository, PostBus, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("posts");
//!
//! let repository = MongoPostRepository::new(&db);
//! repository.create_indexes().await?;
//!
//! let bus = PostBus::new(repository, tracing::info_span!("posts"));
//! let router = axum::Router::new().nest("/posts", handlers::router(bus));
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod commands;
pub mod document;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod queries;
pub mod repository;
pub mod service;
pub mod sort;

#[cfg(test)]
mod test_fixtures;

pub use bus::PostBus;
pub use commands::{CommandHandler, DeletePostResponse, RemovePostsResponse};
pub use error::{PostError, PostResult};
pub use handlers::ApiDoc;
pub use models::{
    Blog, BlogPatch, CreateBlog, CreateEvent, Event, EventPatch, ListParams, Location, Page,
    Pagination, Post, PostFilter, PostKind, PostPatch, PostProps,
};
pub use mongodb::MongoPostRepository;
pub use queries::{ListScope, QueryHandler};
pub use repository::PostRepository;
pub use service::UpdateEntityService;
pub use sort::{SortDirection, SortSpec};
