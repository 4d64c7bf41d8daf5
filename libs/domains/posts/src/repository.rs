use async_trait::async_trait;

use crate::error::PostResult;
use crate::models::{CreateBlog, CreateEvent, ListParams, Page, Pagination, Post, PostPatch};
use crate::sort::SortSpec;

/// Data access for blogs and events.
///
/// Every listing returns a [`Page`]. Id arguments are store ids in their
/// string form; empty or malformed ids fail with `PostError::InvalidId`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_blog(&self, input: CreateBlog) -> PostResult<Post>;

    async fn create_event(&self, input: CreateEvent) -> PostResult<Post>;

    /// Blogs matching the filter, drafts included
    async fn find_blogs(&self, params: ListParams) -> PostResult<Page<Post>>;

    async fn find_events(&self, params: ListParams) -> PostResult<Page<Post>>;

    async fn find_blogs_by_creator_id(
        &self,
        creator_id: &str,
        params: ListParams,
    ) -> PostResult<Page<Post>>;

    async fn find_events_by_creator_id(
        &self,
        creator_id: &str,
        params: ListParams,
    ) -> PostResult<Page<Post>>;

    async fn find_published_blogs(&self, params: ListParams) -> PostResult<Page<Post>>;

    async fn find_published_events(&self, params: ListParams) -> PostResult<Page<Post>>;

    /// Published posts of both kinds
    async fn find_all(&self, pagination: Pagination, sort: SortSpec) -> PostResult<Page<Post>>;

    async fn find_by_id(&self, id: &str) -> PostResult<Option<Post>>;

    /// Merge the patch into the stored post of the patch's kind.
    ///
    /// Returns the updated post, or `None` when no post of that kind has `id`.
    /// An event patch carrying only one date fails with `EventWindow` when it
    /// would invert the stored `eventStart`/`eventEnd` pair.
    async fn update(&self, id: &str, patch: PostPatch) -> PostResult<Option<Post>>;

    /// Returns whether a post was removed
    async fn delete(&self, id: &str) -> PostResult<bool>;

    /// Returns the number of posts removed
    async fn delete_many_by_author_id(&self, author_id: &str) -> PostResult<u64>;
}
