//! Read-side use cases.

use async_trait::async_trait;
use observability::PostMetrics;
use std::sync::Arc;
use tracing::{Span, error, info, instrument};

use crate::error::{PostError, PostResult};
use crate::models::{ListParams, Page, Pagination, Post, PostFilter, PostKind};
use crate::repository::PostRepository;
use crate::sort::SortSpec;

#[async_trait]
pub trait QueryHandler<Q>: Send + Sync
where
    Q: Send + 'static,
{
    type Output;

    async fn execute(&self, query: Q) -> PostResult<Self::Output>;
}

#[derive(Debug, Clone)]
pub struct GetPostQuery {
    pub id: String,
}

/// Which posts of a kind a listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Drafts and published posts alike
    All,
    Published,
    /// Posts by one author, drafts included
    Creator(String),
}

impl ListScope {
    pub fn label(&self) -> &'static str {
        match self {
            ListScope::All => "all",
            ListScope::Published => "published",
            ListScope::Creator(_) => "creator",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListPostsQuery {
    pub kind: PostKind,
    pub scope: ListScope,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub tags: Vec<String>,
    /// Raw sort string, e.g. `-updatedAt` or `title:asc`
    pub sort: Option<String>,
}

/// Published posts of both kinds
#[derive(Debug, Clone, Default)]
pub struct ListPublishedPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

pub struct GetPostHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> GetPostHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> QueryHandler<GetPostQuery> for GetPostHandler<R> {
    type Output = Post;

    #[instrument(parent = &self.span, name = "get_post", skip_all, fields(post_id = %query.id))]
    async fn execute(&self, query: GetPostQuery) -> PostResult<Post> {
        let post = self
            .repository
            .find_by_id(&query.id)
            .await
            .and_then(|found| found.ok_or_else(|| PostError::not_found("Post", &query.id)))
            .inspect_err(|e| error!(error = %e, "Failed to get post"))?;

        info!(kind = %post.kind(), "Post retrieved");
        Ok(post)
    }
}

pub struct ListPostsHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> ListPostsHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> QueryHandler<ListPostsQuery> for ListPostsHandler<R> {
    type Output = Page<Post>;

    #[instrument(
        parent = &self.span,
        name = "list_posts",
        skip_all,
        fields(kind = %query.kind, scope = query.scope.label())
    )]
    async fn execute(&self, query: ListPostsQuery) -> PostResult<Page<Post>> {
        info!(page = ?query.page, limit = ?query.limit, "Listing posts");

        let sort = SortSpec::parse(query.sort.as_deref())
            .inspect_err(|e| error!(error = %e, "Rejected sort"))?;

        let params = ListParams {
            pagination: Pagination::new(query.page, query.limit),
            search: query.search,
            filter: PostFilter {
                tags: query.tags,
                ..Default::default()
            },
            sort,
        };

        let repository = &self.repository;
        let result = match (query.kind, &query.scope) {
            (PostKind::Blog, ListScope::All) => repository.find_blogs(params).await,
            (PostKind::Blog, ListScope::Published) => repository.find_published_blogs(params).await,
            (PostKind::Blog, ListScope::Creator(id)) => {
                repository.find_blogs_by_creator_id(id, params).await
            }
            (PostKind::Event, ListScope::All) => repository.find_events(params).await,
            (PostKind::Event, ListScope::Published) => {
                repository.find_published_events(params).await
            }
            (PostKind::Event, ListScope::Creator(id)) => {
                repository.find_events_by_creator_id(id, params).await
            }
        };
        let page = result.inspect_err(|e| error!(error = %e, "Failed to list posts"))?;

        PostMetrics::record_listed(query.kind.as_str(), query.scope.label(), page.items.len());
        info!(total = page.total, returned = page.items.len(), "Posts listed");
        Ok(page)
    }
}

pub struct ListPublishedPostsHandler<R: PostRepository> {
    repository: Arc<R>,
    span: Span,
}

impl<R: PostRepository> ListPublishedPostsHandler<R> {
    pub fn new(repository: Arc<R>, span: Span) -> Self {
        Self { repository, span }
    }
}

#[async_trait]
impl<R: PostRepository> QueryHandler<ListPublishedPostsQuery> for ListPublishedPostsHandler<R> {
    type Output = Page<Post>;

    #[instrument(parent = &self.span, name = "list_published_posts", skip_all)]
    async fn execute(&self, query: ListPublishedPostsQuery) -> PostResult<Page<Post>> {
        info!(page = ?query.page, limit = ?query.limit, "Listing published posts");

        let sort = SortSpec::parse(query.sort.as_deref())
            .inspect_err(|e| error!(error = %e, "Rejected sort"))?;

        let page = self
            .repository
            .find_all(Pagination::new(query.page, query.limit), sort)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to list published posts"))?;

        PostMetrics::record_listed("all", "published", page.items.len());
        info!(total = page.total, "Published posts listed");
        Ok(page)
    }
}
