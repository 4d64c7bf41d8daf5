use std::sync::Arc;

use crate::error::{PostError, PostResult};
use crate::models::{Post, PostPatch};
use crate::repository::PostRepository;

/// Shared "update or fail with not-found" step for the update commands.
pub struct UpdateEntityService<R: PostRepository> {
    repository: Arc<R>,
}

impl<R: PostRepository> UpdateEntityService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// `label` names the entity in the not-found message, e.g. `"Event"`.
    pub async fn update_entity(
        &self,
        id: &str,
        patch: PostPatch,
        label: &'static str,
    ) -> PostResult<Post> {
        self.repository
            .update(id, patch)
            .await?
            .ok_or_else(|| PostError::not_found(label, id))
    }
}

impl<R: PostRepository> Clone for UpdateEntityService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
