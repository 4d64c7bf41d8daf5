use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch},
};
use axum_extra::extract::{Query, QueryRejection};
use axum_helpers::{
    AppError, ResponseMeta, ValidatedJson,
    errors::responses::{
        BadRequestInvalidIdResponse, BadRequestQueryResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
    },
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::bus::PostBus;
use crate::commands::{
    CommandHandler, CreateBlogCommand, CreateEventCommand, DeletePostCommand, DeletePostResponse,
    RemovePostsByAuthorCommand, RemovePostsResponse, UpdateBlogCommand, UpdateEventCommand,
};
use crate::models::{
    Blog, BlogPatch, CreateBlog, CreateEvent, Event, EventPatch, GeoKind, Location, Page, Post,
    PostKind, PostProps,
};
use crate::queries::{
    GetPostQuery, ListPostsQuery, ListPublishedPostsQuery, ListScope, QueryHandler,
};
use crate::repository::PostRepository;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_published_posts,
        create_blog,
        list_published_blogs,
        list_draft_blogs,
        list_all_blogs,
        update_blog,
        create_event,
        list_published_events,
        list_draft_events,
        list_all_events,
        update_event,
        get_post,
        delete_post,
        remove_posts_by_author,
    ),
    components(
        schemas(
            Post, Blog, Event, PostProps, PostKind, Location, GeoKind, CreateBlog, CreateEvent,
            BlogPatch, EventPatch, DeletePostResponse, RemovePostsResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestInvalidIdResponse,
            BadRequestQueryResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Posts", description = "Blog posts and events (MongoDB)")
    )
)]
pub struct ApiDoc;

type SharedBus<R> = State<Arc<PostBus<R>>>;

/// Routes for blogs and events, to be nested under `/posts`.
pub fn router<R: PostRepository + 'static>(bus: PostBus<R>) -> Router {
    Router::new()
        .route("/", get(list_published_posts))
        .route("/blogs", get(list_published_blogs).post(create_blog))
        .route("/blogs/draft", get(list_draft_blogs))
        .route("/blogs/all", get(list_all_blogs))
        .route("/blogs/{id}", patch(update_blog))
        .route("/events", get(list_published_events).post(create_event))
        .route("/events/draft", get(list_draft_events))
        .route("/events/all", get(list_all_events))
        .route("/events/{id}", patch(update_event))
        .route("/authors/{author_id}", delete(remove_posts_by_author))
        .route("/{id}", get(get_post).delete(delete_post))
        .with_state(Arc::new(bus))
}

/// Paging, search and filter parameters shared by the listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPostsParams {
    /// Page number, starting at 1
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100 (default 25)
    pub limit: Option<i64>,
    /// Case-insensitive match on title, subtitle and content
    pub search: Option<String>,
    /// Matches posts with any of these tags; repeat the key or separate with commas
    #[serde(default)]
    pub tags: Vec<String>,
    /// `-field`, `field:desc`, `field:asc` or `field` (default `-updatedAt`)
    pub sort: Option<String>,
}

/// Listing parameters for an author's own posts.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DraftPostsParams {
    /// Author whose posts to list (required)
    pub creator_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublishedPostsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

/// Flattens repeated and comma-separated `tags` values, dropping blanks.
fn split_tags(raw: Vec<String>) -> Vec<String> {
    raw.iter()
        .flat_map(|tags| tags.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(params)| params)
        .map_err(|e| AppError::InvalidQuery(e.to_string()))
}

impl ListPostsParams {
    fn into_query(self, kind: PostKind, scope: ListScope) -> ListPostsQuery {
        ListPostsQuery {
            kind,
            scope,
            page: self.page,
            limit: self.limit,
            tags: split_tags(self.tags),
            search: self.search,
            sort: self.sort,
        }
    }
}

impl DraftPostsParams {
    fn into_query(self, kind: PostKind) -> Result<ListPostsQuery, AppError> {
        let creator_id = self
            .creator_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("creatorId is required".to_string()))?;

        Ok(ListPostsParams {
            page: self.page,
            limit: self.limit,
            search: self.search,
            tags: self.tags,
            sort: self.sort,
        }
        .into_query(kind, ListScope::Creator(creator_id)))
    }
}

async fn list<R: PostRepository>(
    bus: &PostBus<R>,
    query: ListPostsQuery,
) -> Result<(Extension<ResponseMeta>, Json<Page<Post>>), AppError> {
    let page = bus.list_posts.execute(query).await?;
    Ok((Extension(ResponseMeta(page.meta())), Json(page)))
}

/// Published posts of both kinds
#[utoipa::path(
    get,
    path = "",
    tag = "Posts",
    params(PublishedPostsParams),
    responses(
        (status = 200, description = "Page of published posts", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_published_posts<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<PublishedPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    let page = bus
        .list_published_posts
        .execute(ListPublishedPostsQuery {
            page: params.page,
            limit: params.limit,
            sort: params.sort,
        })
        .await?;
    Ok((Extension(ResponseMeta(page.meta())), Json(page)))
}

/// Create a blog post (always starts unpublished)
#[utoipa::path(
    post,
    path = "/blogs",
    tag = "Posts",
    request_body = CreateBlog,
    responses(
        (status = 201, description = "Blog created", body = Post),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_blog<R: PostRepository>(
    State(bus): SharedBus<R>,
    ValidatedJson(input): ValidatedJson<CreateBlog>,
) -> Result<impl IntoResponse, AppError> {
    let post = bus.create_blog.execute(CreateBlogCommand { input }).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Published blogs
#[utoipa::path(
    get,
    path = "/blogs",
    tag = "Posts",
    params(ListPostsParams),
    responses(
        (status = 200, description = "Page of published blogs", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_published_blogs<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<ListPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    list(&bus, params.into_query(PostKind::Blog, ListScope::Published)).await
}

/// Blogs by one author, drafts included
#[utoipa::path(
    get,
    path = "/blogs/draft",
    tag = "Posts",
    params(DraftPostsParams),
    responses(
        (status = 200, description = "Page of the author's blogs", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_draft_blogs<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<DraftPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    list(&bus, params.into_query(PostKind::Blog)?).await
}

/// All blogs, drafts included
#[utoipa::path(
    get,
    path = "/blogs/all",
    tag = "Posts",
    params(ListPostsParams),
    responses(
        (status = 200, description = "Page of blogs", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_all_blogs<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<ListPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    list(&bus, params.into_query(PostKind::Blog, ListScope::All)).await
}

/// Partially update a blog
#[utoipa::path(
    patch,
    path = "/blogs/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post ID")),
    request_body = BlogPatch,
    responses(
        (status = 200, description = "Updated blog", body = Post),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_blog<R: PostRepository>(
    State(bus): SharedBus<R>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<BlogPatch>,
) -> Result<impl IntoResponse, AppError> {
    let post = bus.update_blog.execute(UpdateBlogCommand { id, patch }).await?;
    Ok(Json(post))
}

/// Create an event (always starts unpublished)
#[utoipa::path(
    post,
    path = "/events",
    tag = "Posts",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = Post),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_event<R: PostRepository>(
    State(bus): SharedBus<R>,
    ValidatedJson(input): ValidatedJson<CreateEvent>,
) -> Result<impl IntoResponse, AppError> {
    let post = bus.create_event.execute(CreateEventCommand { input }).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Published events
#[utoipa::path(
    get,
    path = "/events",
    tag = "Posts",
    params(ListPostsParams),
    responses(
        (status = 200, description = "Page of published events", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_published_events<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<ListPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    list(&bus, params.into_query(PostKind::Event, ListScope::Published)).await
}

/// Events by one author, drafts included
#[utoipa::path(
    get,
    path = "/events/draft",
    tag = "Posts",
    params(DraftPostsParams),
    responses(
        (status = 200, description = "Page of the author's events", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_draft_events<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<DraftPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    list(&bus, params.into_query(PostKind::Event)?).await
}

/// All events, drafts included
#[utoipa::path(
    get,
    path = "/events/all",
    tag = "Posts",
    params(ListPostsParams),
    responses(
        (status = 200, description = "Page of events", body = Page<Post>),
        (status = 400, response = BadRequestQueryResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_all_events<R: PostRepository>(
    State(bus): SharedBus<R>,
    params: Result<Query<ListPostsParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let params = query_params(params)?;
    list(&bus, params.into_query(PostKind::Event, ListScope::All)).await
}

/// Partially update an event
#[utoipa::path(
    patch,
    path = "/events/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Event ID")),
    request_body = EventPatch,
    responses(
        (status = 200, description = "Updated event", body = Post),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_event<R: PostRepository>(
    State(bus): SharedBus<R>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<EventPatch>,
) -> Result<impl IntoResponse, AppError> {
    let post = bus
        .update_event
        .execute(UpdateEventCommand { id, patch })
        .await?;
    Ok(Json(post))
}

/// Get a blog or event by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post found", body = Post),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_post<R: PostRepository>(
    State(bus): SharedBus<R>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = bus.get_post.execute(GetPostQuery { id }).await?;
    Ok(Json(post))
}

/// Delete a blog or event
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = DeletePostResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_post<R: PostRepository>(
    State(bus): SharedBus<R>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let response = bus.delete_post.execute(DeletePostCommand { id }).await?;
    Ok(Json(response))
}

/// Delete every post by an author
#[utoipa::path(
    delete,
    path = "/authors/{author_id}",
    tag = "Posts",
    params(("author_id" = String, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Posts deleted", body = RemovePostsResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_posts_by_author<R: PostRepository>(
    State(bus): SharedBus<R>,
    Path(author_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let response = bus
        .remove_posts_by_author
        .execute(RemovePostsByAuthorCommand { author_id })
        .await?;
    Ok(Json(response))
}
