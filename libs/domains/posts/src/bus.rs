use std::sync::Arc;
use tracing::Span;

use crate::commands::{
    CreateBlogHandler, CreateEventHandler, DeletePostHandler, RemovePostsByAuthorHandler,
    UpdateBlogHandler, UpdateEventHandler,
};
use crate::queries::{GetPostHandler, ListPostsHandler, ListPublishedPostsHandler};
use crate::repository::PostRepository;
use crate::service::UpdateEntityService;

/// Every post command and query handler, wired to one repository.
///
/// Handlers log under children of `span`.
///
/// ```ignore
/// let bus = PostBus::new(MongoPostRepository::new(&db), tracing::info_span!("posts"));
/// let post = bus.create_blog.execute(CreateBlogCommand { input }).await?;
/// ```
pub struct PostBus<R: PostRepository> {
    pub create_blog: CreateBlogHandler<R>,
    pub create_event: CreateEventHandler<R>,
    pub update_blog: UpdateBlogHandler<R>,
    pub update_event: UpdateEventHandler<R>,
    pub delete_post: DeletePostHandler<R>,
    pub remove_posts_by_author: RemovePostsByAuthorHandler<R>,
    pub get_post: GetPostHandler<R>,
    pub list_posts: ListPostsHandler<R>,
    pub list_published_posts: ListPublishedPostsHandler<R>,
}

impl<R: PostRepository> PostBus<R> {
    pub fn new(repository: R, span: Span) -> Self {
        let repository = Arc::new(repository);
        let updates = UpdateEntityService::new(Arc::clone(&repository));

        Self {
            create_blog: CreateBlogHandler::new(Arc::clone(&repository), span.clone()),
            create_event: CreateEventHandler::new(Arc::clone(&repository), span.clone()),
            update_blog: UpdateBlogHandler::new(updates.clone(), span.clone()),
            update_event: UpdateEventHandler::new(updates, span.clone()),
            delete_post: DeletePostHandler::new(Arc::clone(&repository), span.clone()),
            remove_posts_by_author: RemovePostsByAuthorHandler::new(
                Arc::clone(&repository),
                span.clone(),
            ),
            get_post: GetPostHandler::new(Arc::clone(&repository), span.clone()),
            list_posts: ListPostsHandler::new(Arc::clone(&repository), span.clone()),
            list_published_posts: ListPublishedPostsHandler::new(repository, span),
        }
    }
}
