//! Write-side use cases. Each handler makes one repository call, logs the
//! outcome under its injected span and returns errors unchanged.

use async_trait::async_trait;
use observability::PostMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Span, error, info, instrument};
use utoipa::ToSchema;

use crate::error::{PostError, PostResult};
use crate::models::{BlogPatch, CreateBlog, CreateEvent, EventPatch, Post, PostKind, PostPatch};
use crate::repository::PostRepository;
use crate::service::UpdateEntityService;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Send + 'static,
{
    type Output;

    async fn execute(&self, command: C) -> PostResult<Self::Output>;
}

#[derive(Debug, Clone)]
pub struct CreateBlogCommand {
    pub input: CreateBlog,
}

#[derive(Debug, Clone)]
pub struct CreateEventCommand {
    pub input: CreateEvent,
}

#[derive(Debug, Clone)]
pub struct UpdateBlogCommand {
    pub id: String,
    pub patch: BlogPatch,
}

#[derive(Debug, Clone)]
pub struct UpdateEventCommand {
    pub id: String,
    pub patch: EventPatch,
}

#[derive(Debug, Clone)]
pub struct DeletePostCommand {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct RemovePostsByAuthorCommand {
    pub author_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletePostResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemovePostsResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

pub struct CreateBlogHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> CreateBlogHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> CommandHandler<CreateBlogCommand> for CreateBlogHandler<R> {
    type Output = Post;

    #[instrument(parent = &self.span, name = "create_blog", skip_all, fields(author_id = %command.input.author_id))]
    async fn execute(&self, command: CreateBlogCommand) -> PostResult<Post> {
        info!("Creating blog");
        let post = self
            .repository
            .create_blog(command.input)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create blog"))?;

        PostMetrics::record_created(PostKind::Blog.as_str());
        info!(post_id = %post.id(), "Blog created");
        Ok(post)
    }
}

pub struct CreateEventHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> CreateEventHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> CommandHandler<CreateEventCommand> for CreateEventHandler<R> {
    type Output = Post;

    #[instrument(parent = &self.span, name = "create_event", skip_all, fields(author_id = %command.input.author_id))]
    async fn execute(&self, command: CreateEventCommand) -> PostResult<Post> {
        info!("Creating event");
        let post = self
            .repository
            .create_event(command.input)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to create event"))?;

        PostMetrics::record_created(PostKind::Event.as_str());
        info!(post_id = %post.id(), "Event created");
        Ok(post)
    }
}

pub struct UpdateBlogHandler<R: PostRepository> {
    service: UpdateEntityService<R>,
    span: Span,
}

impl<R: PostRepository> UpdateBlogHandler<R> {
    pub fn new(service: UpdateEntityService<R>, span: Span) -> Self {
        Self { service, span }
    }
}

#[async_trait]
impl<R: PostRepository> CommandHandler<UpdateBlogCommand> for UpdateBlogHandler<R> {
    type Output = Post;

    #[instrument(parent = &self.span, name = "update_blog", skip_all, fields(post_id = %command.id))]
    async fn execute(&self, command: UpdateBlogCommand) -> PostResult<Post> {
        info!("Updating blog");
        let post = self
            .service
            .update_entity(&command.id, PostPatch::Blog(command.patch), "Post")
            .await
            .inspect_err(|e| error!(error = %e, "Failed to update blog"))?;

        PostMetrics::record_updated(PostKind::Blog.as_str());
        info!("Blog updated");
        Ok(post)
    }
}

pub struct UpdateEventHandler<R: PostRepository> {
    service: UpdateEntityService<R>,
    span: Span,
}

impl<R: PostRepository> UpdateEventHandler<R> {
    pub fn new(service: UpdateEntityService<R>, span: Span) -> Self {
        Self { service, span }
    }
}

#[async_trait]
impl<R: PostRepository> CommandHandler<UpdateEventCommand> for UpdateEventHandler<R> {
    type Output = Post;

    #[instrument(parent = &self.span, name = "update_event", skip_all, fields(post_id = %command.id))]
    async fn execute(&self, command: UpdateEventCommand) -> PostResult<Post> {
        info!("Updating event");
        let post = self
            .service
            .update_entity(&command.id, PostPatch::Event(command.patch), "Event")
            .await
            .inspect_err(|e| error!(error = %e, "Failed to update event"))?;

        PostMetrics::record_updated(PostKind::Event.as_str());
        info!("Event updated");
        Ok(post)
    }
}

pub struct DeletePostHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> DeletePostHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> CommandHandler<DeletePostCommand> for DeletePostHandler<R> {
    type Output = DeletePostResponse;

    #[instrument(parent = &self.span, name = "delete_post", skip_all, fields(post_id = %command.id))]
    async fn execute(&self, command: DeletePostCommand) -> PostResult<DeletePostResponse> {
        info!("Deleting post");
        let deleted = self
            .repository
            .delete(&command.id)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to delete post"))?;

        if !deleted {
            let err = PostError::not_found("Post", &command.id);
            error!(error = %err, "Failed to delete post");
            return Err(err);
        }

        PostMetrics::record_deleted("single", 1);
        info!("Post deleted");
        Ok(DeletePostResponse {
            success: true,
            message: format!("Post with ID {} deleted.", command.id),
        })
    }
}

pub struct RemovePostsByAuthorHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> RemovePostsByAuthorHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> CommandHandler<RemovePostsByAuthorCommand> for RemovePostsByAuthorHandler<R> {
    type Output = RemovePostsResponse;

    #[instrument(parent = &self.span, name = "remove_posts_by_author", skip_all, fields(author_id = %command.author_id))]
    async fn execute(&self, command: RemovePostsByAuthorCommand) -> PostResult<RemovePostsResponse> {
        info!("Removing posts for author");
        let deleted_count = self
            .repository
            .delete_many_by_author_id(&command.author_id)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to remove posts for author"))?;

        PostMetrics::record_deleted("author", deleted_count);
        info!(deleted_count, "Posts removed for author");
        Ok(RemovePostsResponse {
            success: true,
            message: format!("Deleted {deleted_count} posts for user."),
            deleted_count,
        })
    }
}
