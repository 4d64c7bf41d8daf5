//! Persisted shape of a post and its mapping to [`Post`].

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PostError, PostResult};
use crate::models::{
    Blog, BlogPatch, CreateBlog, CreateEvent, Event, EventPatch, Location, Post, PostKind,
    PostPatch, PostProps, one_or_many,
};

/// A document in the `posts` collection.
///
/// `type` is kept as a raw string so that unexpected discriminators reach
/// [`to_entity`] instead of failing inside the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    pub content: String,
    pub author_id: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub feature_img: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_start: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_end: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

pub(crate) fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn to_chrono(dt: bson::DateTime, field: &str) -> PostResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(dt.timestamp_millis())
        .ok_or_else(|| PostError::Mapping(format!("{field} is out of range")))
}

impl PostDocument {
    /// New blog document; always a draft.
    pub fn blog(input: CreateBlog, now: DateTime<Utc>) -> Self {
        let now = to_bson_datetime(now);
        Self {
            id: None,
            kind: PostKind::Blog.to_string(),
            title: input.title,
            sub_title: input.sub_title,
            content: input.content,
            author_id: input.author_id,
            feature_img: input.feature_img,
            tags: input.tags,
            is_published: false,
            event_start: None,
            event_end: None,
            location: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// New event document; always a draft.
    pub fn event(input: CreateEvent, now: DateTime<Utc>) -> Self {
        let now = to_bson_datetime(now);
        Self {
            id: None,
            kind: PostKind::Event.to_string(),
            title: input.title,
            sub_title: None,
            content: input.content,
            author_id: input.author_id,
            feature_img: input.feature_img,
            tags: input.tags,
            is_published: false,
            event_start: Some(to_bson_datetime(input.event_start)),
            event_end: Some(to_bson_datetime(input.event_end)),
            location: input.location.map(Location::normalized),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Map a stored document onto its entity variant.
pub fn to_entity(document: PostDocument) -> PostResult<Post> {
    let kind = PostKind::from_str(&document.kind)
        .map_err(|_| PostError::UnknownKind(document.kind.clone()))?;

    let id = document
        .id
        .ok_or_else(|| PostError::Mapping("document has no _id".to_string()))?;

    let props = PostProps {
        id: id.to_hex(),
        title: document.title,
        sub_title: document.sub_title,
        content: document.content,
        author_id: document.author_id,
        feature_img: document.feature_img,
        tags: document.tags,
        is_published: document.is_published,
        created_at: to_chrono(document.created_at, "createdAt")?,
        updated_at: to_chrono(document.updated_at, "updatedAt")?,
    };

    match kind {
        PostKind::Blog => Ok(Post::Blog(Blog { props })),
        PostKind::Event => {
            let (Some(start), Some(end)) = (document.event_start, document.event_end) else {
                return Err(PostError::Mapping(format!(
                    "event {} is missing eventStart or eventEnd",
                    props.id
                )));
            };

            Ok(Post::Event(Event {
                event_start: to_chrono(start, "eventStart")?,
                event_end: to_chrono(end, "eventEnd")?,
                location: document.location,
                props,
            }))
        }
    }
}

/// The `$set` document for a patch. `updatedAt` is always bumped.
pub fn to_set_document(patch: &PostPatch, now: DateTime<Utc>) -> PostResult<Document> {
    let mut set = match patch {
        PostPatch::Blog(patch) => blog_set(patch),
        PostPatch::Event(patch) => event_set(patch)?,
    };
    set.insert("updatedAt", to_bson_datetime(now));
    Ok(set)
}

fn common_set(
    set: &mut Document,
    title: &Option<String>,
    content: &Option<String>,
    tags: &Option<Vec<String>>,
    feature_img: &Option<Vec<String>>,
    is_published: Option<bool>,
) {
    if let Some(title) = title {
        set.insert("title", title.as_str());
    }
    if let Some(content) = content {
        set.insert("content", content.as_str());
    }
    if let Some(tags) = tags {
        set.insert("tags", tags.clone());
    }
    if let Some(feature_img) = feature_img {
        set.insert("featureImg", feature_img.clone());
    }
    if let Some(is_published) = is_published {
        set.insert("isPublished", is_published);
    }
}

fn blog_set(patch: &BlogPatch) -> Document {
    let mut set = doc! {};
    common_set(
        &mut set,
        &patch.title,
        &patch.content,
        &patch.tags,
        &patch.feature_img,
        patch.is_published,
    );
    if let Some(sub_title) = &patch.sub_title {
        set.insert("subTitle", sub_title.as_str());
    }
    set
}

fn event_set(patch: &EventPatch) -> PostResult<Document> {
    let mut set = doc! {};
    common_set(
        &mut set,
        &patch.title,
        &patch.content,
        &patch.tags,
        &patch.feature_img,
        patch.is_published,
    );
    if let Some(start) = patch.event_start {
        set.insert("eventStart", to_bson_datetime(start));
    }
    if let Some(end) = patch.event_end {
        set.insert("eventEnd", to_bson_datetime(end));
    }
    if let Some(location) = &patch.location {
        set.insert("location", bson::to_bson(&location.clone().normalized())?);
    }
    Ok(set)
}

/// Filter clause that keeps a single-date event patch inside the stored window.
///
/// `None` when the patch sets both dates (checked by validation) or neither.
pub(crate) fn event_window_guard(patch: &PostPatch) -> Option<Document> {
    let PostPatch::Event(patch) = patch else {
        return None;
    };
    match (patch.event_start, patch.event_end) {
        (Some(start), None) => Some(doc! {
            "$expr": { "$lte": [to_bson_datetime(start), "$eventEnd"] }
        }),
        (None, Some(end)) => Some(doc! {
            "$expr": { "$lte": ["$eventStart", to_bson_datetime(end)] }
        }),
        _ => None,
    }
}
