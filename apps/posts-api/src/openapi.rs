//! OpenAPI documentation configuration

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Posts API",
        version = "0.1.0",
        description = "Blog posts and events backed by MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    nest(
        (path = "/posts", api = domain_posts::ApiDoc)
    ),
    tags(
        (name = "Posts", description = "Blog post and event management")
    )
)]
pub struct ApiDoc;
