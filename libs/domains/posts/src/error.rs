use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use mongodb::error::ErrorKind;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    InvalidId(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    /// A single-date event patch would put `eventStart` after the stored `eventEnd`, or vice versa
    #[error("{0}")]
    EventWindow(String),

    /// Stored discriminator is neither `blog` nor `event`
    #[error("Unknown post type '{0}'")]
    UnknownKind(String),

    #[error("Failed to map post document: {0}")]
    Mapping(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),
}

pub type PostResult<T> = Result<T, PostError>;

impl PostError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PostError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound { .. } => AppError::NotFound(err.to_string()),
            PostError::InvalidId(msg) => AppError::InvalidId(msg),
            PostError::Validation(errors) => AppError::ValidationError(errors),
            PostError::InvalidSort(msg) => AppError::InvalidQuery(msg),
            PostError::EventWindow(msg) => AppError::BadRequest(msg),
            PostError::UnknownKind(_) | PostError::Mapping(_) => AppError::Decode(err.to_string()),
            PostError::Database(msg) => AppError::Database(msg),
            PostError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl IntoResponse for PostError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<mongodb::error::Error> for PostError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                PostError::Unavailable(err.to_string())
            }
            _ => PostError::Database(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for PostError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        PostError::Mapping(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_message() {
        let err = PostError::not_found("Event", "65f0c0ffee0000000000abcd");
        assert_eq!(
            err.to_string(),
            "Event with ID 65f0c0ffee0000000000abcd not found"
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PostError::not_found("Post", "x"), StatusCode::NOT_FOUND),
            (PostError::InvalidId("Invalid ID: x".into()), StatusCode::BAD_REQUEST),
            (PostError::InvalidSort("bad".into()), StatusCode::BAD_REQUEST),
            (PostError::UnknownKind("video".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                PostError::EventWindow("eventStart must not be after eventEnd".into()),
                StatusCode::BAD_REQUEST,
            ),
            (PostError::Mapping("no _id".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (PostError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (PostError::Unavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
