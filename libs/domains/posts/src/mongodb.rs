//! MongoDB implementation of PostRepository

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;

use crate::document::{PostDocument, event_window_guard, to_entity, to_set_document};
use crate::error::{PostError, PostResult};
use crate::models::{
    CreateBlog, CreateEvent, ListParams, Page, Pagination, Post, PostFilter, PostKind, PostPatch,
};
use crate::repository::PostRepository;
use crate::sort::{SortSpec, search_filter};

pub const COLLECTION: &str = "posts";

#[derive(Clone)]
pub struct MongoPostRepository {
    collection: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: &Database, name: &str) -> Self {
        Self {
            collection: db.collection(name),
        }
    }

    pub fn collection(&self) -> &Collection<PostDocument> {
        &self.collection
    }

    /// Create the indexes listings and geo queries rely on. Idempotent.
    pub async fn create_indexes(&self) -> PostResult<()> {
        let geo_points_only = doc! {
            "location.type": "Point",
            "location.coordinates": { "$exists": true, "$type": "array" },
        };

        let indexes = vec![
            IndexModel::builder().keys(doc! { "type": 1 }).build(),
            IndexModel::builder().keys(doc! { "isPublished": 1 }).build(),
            IndexModel::builder().keys(doc! { "authorId": 1 }).build(),
            IndexModel::builder().keys(doc! { "updatedAt": -1 }).build(),
            IndexModel::builder()
                .keys(doc! { "location": "2dsphere" })
                .options(
                    IndexOptions::builder()
                        .partial_filter_expression(geo_points_only)
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION, "Post indexes synchronised");
        Ok(())
    }

    /// Query for a listing: kind, filter fields and the optional search term.
    pub(crate) fn build_query(
        kind: Option<PostKind>,
        search: Option<&str>,
        filter: &PostFilter,
    ) -> Document {
        let mut query = doc! {};

        if let Some(kind) = kind {
            query.insert("type", kind.as_str());
        }

        if let Some(author_id) = &filter.author_id {
            query.insert("authorId", author_id.as_str());
        }

        if let Some(is_published) = filter.is_published {
            query.insert("isPublished", is_published);
        }

        if !filter.tags.is_empty() {
            query.insert("tags", doc! { "$in": filter.tags.clone() });
        }

        if let Some(search) = search.and_then(search_filter) {
            query.extend(search);
        }

        query
    }

    fn parse_id(id: &str) -> PostResult<ObjectId> {
        let id = id.trim();
        if id.is_empty() {
            return Err(PostError::InvalidId("ID must not be empty".to_string()));
        }
        ObjectId::parse_str(id).map_err(|_| PostError::InvalidId(format!("Invalid ID: {id}")))
    }

    /// `target` narrowed by an optional event window guard.
    pub(crate) fn update_filter(target: &Document, guard: Option<&Document>) -> Document {
        let mut filter = target.clone();
        if let Some(guard) = guard {
            filter.extend(guard.clone());
        }
        filter
    }

    /// Count and fetch concurrently, then map every document.
    async fn find_page(
        &self,
        query: Document,
        pagination: Pagination,
        sort: &SortSpec,
    ) -> PostResult<Page<Post>> {
        let options = FindOptions::builder()
            .sort(sort.to_document())
            .skip(pagination.skip())
            .limit(pagination.limit() as i64)
            .build();

        let count = async { self.collection.count_documents(query.clone()).await };
        let fetch = async {
            let cursor = self.collection.find(query.clone()).with_options(options).await?;
            cursor.try_collect::<Vec<PostDocument>>().await
        };

        let (total, documents) = tokio::try_join!(count, fetch)?;

        let items = documents
            .into_iter()
            .map(to_entity)
            .collect::<PostResult<Vec<_>>>()?;

        Ok(Page::new(items, total, pagination))
    }

    async fn list(&self, kind: PostKind, params: ListParams) -> PostResult<Page<Post>> {
        let query = Self::build_query(Some(kind), params.search.as_deref(), &params.filter);
        self.find_page(query, params.pagination, &params.sort).await
    }

    async fn insert(&self, mut document: PostDocument) -> PostResult<Post> {
        let result = self.collection.insert_one(&document).await?;
        document.id = result.inserted_id.as_object_id();
        to_entity(document)
    }
}

fn published(mut params: ListParams) -> ListParams {
    params.filter.is_published = Some(true);
    params
}

fn by_creator(creator_id: &str, mut params: ListParams) -> ListParams {
    params.filter.author_id = Some(creator_id.to_string());
    params
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    #[instrument(skip(self, input), fields(author_id = %input.author_id))]
    async fn create_blog(&self, input: CreateBlog) -> PostResult<Post> {
        let post = self.insert(PostDocument::blog(input, Utc::now())).await?;
        tracing::info!(post_id = %post.id(), "Blog created");
        Ok(post)
    }

    #[instrument(skip(self, input), fields(author_id = %input.author_id))]
    async fn create_event(&self, input: CreateEvent) -> PostResult<Post> {
        let post = self.insert(PostDocument::event(input, Utc::now())).await?;
        tracing::info!(post_id = %post.id(), "Event created");
        Ok(post)
    }

    #[instrument(skip(self))]
    async fn find_blogs(&self, params: ListParams) -> PostResult<Page<Post>> {
        self.list(PostKind::Blog, params).await
    }

    #[instrument(skip(self))]
    async fn find_events(&self, params: ListParams) -> PostResult<Page<Post>> {
        self.list(PostKind::Event, params).await
    }

    #[instrument(skip(self))]
    async fn find_blogs_by_creator_id(
        &self,
        creator_id: &str,
        params: ListParams,
    ) -> PostResult<Page<Post>> {
        self.list(PostKind::Blog, by_creator(creator_id, params)).await
    }

    #[instrument(skip(self))]
    async fn find_events_by_creator_id(
        &self,
        creator_id: &str,
        params: ListParams,
    ) -> PostResult<Page<Post>> {
        self.list(PostKind::Event, by_creator(creator_id, params)).await
    }

    #[instrument(skip(self))]
    async fn find_published_blogs(&self, params: ListParams) -> PostResult<Page<Post>> {
        self.list(PostKind::Blog, published(params)).await
    }

    #[instrument(skip(self))]
    async fn find_published_events(&self, params: ListParams) -> PostResult<Page<Post>> {
        self.list(PostKind::Event, published(params)).await
    }

    #[instrument(skip(self))]
    async fn find_all(&self, pagination: Pagination, sort: SortSpec) -> PostResult<Page<Post>> {
        // No kind filter: an unexpected discriminator fails the page
        let query = doc! { "isPublished": true };
        self.find_page(query, pagination, &sort).await
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> PostResult<Option<Post>> {
        let oid = Self::parse_id(id)?;
        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .map(to_entity)
            .transpose()
    }

    #[instrument(skip(self, patch), fields(kind = %patch.kind()))]
    async fn update(&self, id: &str, patch: PostPatch) -> PostResult<Option<Post>> {
        let oid = Self::parse_id(id)?;
        let target = doc! { "_id": oid, "type": patch.kind().as_str() };
        let guard = event_window_guard(&patch);
        let filter = Self::update_filter(&target, guard.as_ref());
        let set = to_set_document(&patch, Utc::now())?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(filter, doc! { "$set": set })
            .with_options(options)
            .await?;

        if updated.is_some() {
            tracing::info!(post_id = %id, "Post updated");
        } else if guard.is_some() && self.collection.count_documents(target).await? > 0 {
            // The event exists, so the window guard is what rejected the patch
            return Err(PostError::EventWindow(
                "eventStart must not be after eventEnd".to_string(),
            ));
        }
        updated.map(to_entity).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> PostResult<bool> {
        let oid = Self::parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_many_by_author_id(&self, author_id: &str) -> PostResult<u64> {
        let author_id = author_id.trim();
        if author_id.is_empty() {
            return Err(PostError::InvalidId("Author ID must not be empty".to_string()));
        }

        let result = self
            .collection
            .delete_many(doc! { "authorId": author_id })
            .await?;

        tracing::info!(author_id, deleted = result.deleted_count, "Posts removed for author");
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_filter_adds_window_guard() {
        let target = doc! { "_id": ObjectId::new(), "type": "event" };
        assert_eq!(MongoPostRepository::update_filter(&target, None), target);

        let guard = doc! { "$expr": { "$lte": ["$eventStart", "$eventEnd"] } };
        let filter = MongoPostRepository::update_filter(&target, Some(&guard));
        assert_eq!(filter.get_str("type").unwrap(), "event");
        assert!(filter.get_document("$expr").is_ok());
    }

    #[test]
    fn test_build_query_empty_filter() {
        let query = MongoPostRepository::build_query(None, None, &PostFilter::default());
        assert!(query.is_empty());
    }

    #[test]
    fn test_build_query_pins_kind() {
        let query =
            MongoPostRepository::build_query(Some(PostKind::Event), None, &PostFilter::default());
        assert_eq!(query, doc! { "type": "event" });
    }

    #[test]
    fn test_build_query_combines_filter_and_search() {
        let filter = PostFilter {
            author_id: Some("u1".into()),
            is_published: Some(true),
            tags: vec!["rust".into(), "async".into()],
        };
        let query = MongoPostRepository::build_query(Some(PostKind::Blog), Some("tokio"), &filter);

        assert_eq!(query.get_str("type").unwrap(), "blog");
        assert_eq!(query.get_str("authorId").unwrap(), "u1");
        assert!(query.get_bool("isPublished").unwrap());
        assert_eq!(
            query.get_document("tags").unwrap().get_array("$in").unwrap().len(),
            2
        );
        assert_eq!(query.get_array("$or").unwrap().len(), 3);
    }

    #[test]
    fn test_blank_search_adds_nothing() {
        let query = MongoPostRepository::build_query(
            Some(PostKind::Blog),
            Some("  "),
            &PostFilter::default(),
        );
        assert!(!query.contains_key("$or"));
    }

    #[test]
    fn test_scope_helpers_override_filter() {
        let params = ListParams {
            filter: PostFilter {
                is_published: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(published(params.clone()).filter.is_published, Some(true));
        assert_eq!(
            by_creator("u9", params).filter.author_id.as_deref(),
            Some("u9")
        );
    }

    #[test]
    fn test_parse_id() {
        assert!(matches!(
            MongoPostRepository::parse_id(""),
            Err(PostError::InvalidId(_))
        ));
        assert!(matches!(
            MongoPostRepository::parse_id("not-an-object-id"),
            Err(PostError::InvalidId(_))
        ));

        let oid = ObjectId::new();
        assert_eq!(MongoPostRepository::parse_id(&oid.to_hex()).unwrap(), oid);
    }
}
