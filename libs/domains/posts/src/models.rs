use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::sort::SortSpec;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;
pub const MAX_LIMIT: u64 = 100;

/// Discriminator stored in the `type` field
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostKind {
    Blog,
    Event,
}

impl PostKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PostKind::Blog => "blog",
            PostKind::Event => "event",
        }
    }
}

/// GeoJSON geometry type. Only points are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum GeoKind {
    #[default]
    Point,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct Location {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<GeoKind>,
    /// `[longitude, latitude]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_coordinates"))]
    #[schema(example = json!([12.34, 56.78]))]
    pub coordinates: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Location {
    /// Geo-indexable locations always carry `type: "Point"`.
    pub fn normalized(mut self) -> Self {
        if self.coordinates.is_some() && self.kind.is_none() {
            self.kind = Some(GeoKind::Point);
        }
        self
    }
}

/// Properties shared by every post variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostProps {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_title: Option<String>,
    pub content: String,
    pub author_id: String,
    #[serde(default)]
    pub feature_img: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Blog {
    #[serde(flatten)]
    pub props: PostProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(flatten)]
    pub props: PostProps,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A blog post or an event, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Post {
    Blog(Blog),
    Event(Event),
}

impl Post {
    pub fn kind(&self) -> PostKind {
        match self {
            Post::Blog(_) => PostKind::Blog,
            Post::Event(_) => PostKind::Event,
        }
    }

    pub fn props(&self) -> &PostProps {
        match self {
            Post::Blog(blog) => &blog.props,
            Post::Event(event) => &event.props,
        }
    }

    pub fn id(&self) -> &str {
        &self.props().id
    }
}

/// Request body for `POST /posts/blogs`.
///
/// `isPublished` is not accepted here; new posts always start as drafts.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlog {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: String,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[validate(length(min = 1, message = "content should not be empty"))]
    pub content: String,
    #[validate(length(min = 1, message = "authorId should not be empty"))]
    pub author_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// One URL or a list of URLs
    #[serde(default, deserialize_with = "one_or_many")]
    #[validate(custom(function = "validate_image_urls"))]
    #[schema(value_type = Vec<String>)]
    pub feature_img: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_event_window"))]
pub struct CreateEvent {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "content should not be empty"))]
    pub content: String,
    #[validate(length(min = 1, message = "authorId should not be empty"))]
    pub author_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    #[serde(default)]
    #[validate(nested)]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "one_or_many")]
    #[validate(custom(function = "validate_image_urls"))]
    #[schema(value_type = Vec<String>)]
    pub feature_img: Vec<String>,
}

/// Mutable fields of a blog. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: Option<String>,
    pub sub_title: Option<String>,
    #[validate(length(min = 1, message = "content should not be empty"))]
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "optional_one_or_many")]
    #[validate(custom(function = "validate_image_urls"))]
    #[schema(value_type = Option<Vec<String>>)]
    pub feature_img: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

/// Mutable fields of an event. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_patch_event_window"))]
pub struct EventPatch {
    #[validate(length(min = 1, message = "title should not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content should not be empty"))]
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "optional_one_or_many")]
    #[validate(custom(function = "validate_image_urls"))]
    #[schema(value_type = Option<Vec<String>>)]
    pub feature_img: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    #[validate(nested)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone)]
pub enum PostPatch {
    Blog(BlogPatch),
    Event(EventPatch),
}

impl PostPatch {
    pub fn kind(&self) -> PostKind {
        match self {
            PostPatch::Blog(_) => PostKind::Blog,
            PostPatch::Event(_) => PostKind::Event,
        }
    }
}

/// Page number and size, clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    /// `page` is raised to at least 1 and `limit` is clamped into `[1, 100]`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.map_or(DEFAULT_PAGE, |p| p.max(1) as u64);
        let limit = limit.map_or(DEFAULT_LIMIT, |l| l.clamp(1, MAX_LIMIT as i64) as u64);
        Self { page, limit }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page(),
            limit: pagination.limit(),
            total_pages: total.div_ceil(pagination.limit()),
        }
    }

    /// Totals without the items, for the response envelope's `meta`.
    pub fn meta(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total,
            "page": self.page,
            "limit": self.limit,
            "totalPages": self.total_pages,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub author_id: Option<String>,
    pub is_published: Option<bool>,
    /// Matches posts carrying any of these tags
    pub tags: Vec<String>,
}

/// Everything a paginated listing needs besides the post kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParams {
    pub pagination: Pagination,
    pub search: Option<String>,
    pub filter: PostFilter,
    pub sort: SortSpec,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(single) => vec![single],
            OneOrMany::Many(list) => list,
        }
    }
}

pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?
        .map(Vec::from)
        .unwrap_or_default())
}

fn optional_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(Vec::from))
}

fn validate_image_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.iter().all(|url| url.validate_url()) {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("featureImg must contain valid URLs".into()))
    }
}

/// `[longitude, latitude]` within the bounds a `2dsphere` index accepts.
fn validate_coordinates(coordinates: &[f64]) -> Result<(), ValidationError> {
    let [longitude, latitude] = coordinates else {
        return Err(ValidationError::new("coordinates")
            .with_message("coordinates must be exactly [longitude, latitude]".into()));
    };
    if (-180.0..=180.0).contains(longitude) && (-90.0..=90.0).contains(latitude) {
        Ok(())
    } else {
        Err(ValidationError::new("coordinates_range").with_message(
            "longitude must be within [-180, 180] and latitude within [-90, 90]".into(),
        ))
    }
}

fn check_event_window(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<(), ValidationError> {
    if start <= end {
        Ok(())
    } else {
        Err(ValidationError::new("event_window")
            .with_message("eventStart must not be after eventEnd".into()))
    }
}

fn validate_create_event_window(event: &CreateEvent) -> Result<(), ValidationError> {
    check_event_window(&event.event_start, &event.event_end)
}

/// Only a patch with both dates is checked here; the repository guards single-date patches.
fn validate_patch_event_window(patch: &EventPatch) -> Result<(), ValidationError> {
    match (&patch.event_start, &patch.event_end) {
        (Some(start), Some(end)) => check_event_window(start, end),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_body() -> serde_json::Value {
        json!({
            "title": "RustConf",
            "content": "Talks",
            "authorId": "u1",
            "eventStart": "2026-09-01T09:00:00Z",
            "eventEnd": "2026-09-01T18:00:00Z",
        })
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let default = Pagination::default();
        assert_eq!((default.page(), default.limit(), default.skip()), (1, 25, 0));

        let clamped = Pagination::new(Some(0), Some(500));
        assert_eq!((clamped.page(), clamped.limit()), (1, 100));

        let negative = Pagination::new(Some(-3), Some(-1));
        assert_eq!((negative.page(), negative.limit()), (1, 1));

        assert_eq!(Pagination::new(Some(3), Some(10)).skip(), 20);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let pagination = Pagination::new(Some(1), Some(10));
        assert_eq!(Page::<()>::new(vec![], 0, pagination).total_pages, 0);
        assert_eq!(Page::<()>::new(vec![], 10, pagination).total_pages, 1);
        assert_eq!(Page::<()>::new(vec![], 11, pagination).total_pages, 2);

        let meta = Page::<()>::new(vec![], 11, pagination).meta();
        assert_eq!(meta["totalPages"], 2);
        assert_eq!(meta["limit"], 10);
    }

    #[test]
    fn test_create_blog_ignores_is_published() {
        let blog: CreateBlog = serde_json::from_value(json!({
            "title": "A",
            "content": "B",
            "authorId": "u1",
            "tags": ["x"],
            "isPublished": true,
        }))
        .unwrap();

        assert!(blog.validate().is_ok());
        assert_eq!(blog.tags, vec!["x"]);
        assert!(blog.feature_img.is_empty());
    }

    #[test]
    fn test_feature_img_accepts_single_url_or_list() {
        let single: CreateBlog = serde_json::from_value(json!({
            "title": "A", "content": "B", "authorId": "u1",
            "featureImg": "https://cdn.example.com/a.png",
        }))
        .unwrap();
        assert_eq!(single.feature_img, vec!["https://cdn.example.com/a.png"]);

        let patch: BlogPatch = serde_json::from_value(json!({
            "featureImg": ["https://cdn.example.com/a.png", "not a url"],
        }))
        .unwrap();
        let errors = patch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("feature_img"));
    }

    #[test]
    fn test_create_blog_rejects_empty_fields() {
        let blog: CreateBlog =
            serde_json::from_value(json!({"title": "", "content": "B", "authorId": ""})).unwrap();
        let errors = blog.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("author_id"));
        assert!(!fields.contains_key("content"));
    }

    #[test]
    fn test_event_window_checked_on_create() {
        let mut body = event_body();
        assert!(serde_json::from_value::<CreateEvent>(body.clone()).unwrap().validate().is_ok());

        body["eventEnd"] = json!("2026-08-31T09:00:00Z");
        let event: CreateEvent = serde_json::from_value(body).unwrap();
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_event_window_checked_on_patch_only_when_both_present() {
        let only_start = EventPatch {
            event_start: Some("2030-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert!(only_start.validate().is_ok());

        let inverted = EventPatch {
            event_start: Some("2030-01-02T00:00:00Z".parse().unwrap()),
            event_end: Some("2030-01-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_location_coordinates_must_be_two_finite_numbers() {
        let mut body = event_body();
        body["location"] = json!({"coordinates": [12.34], "city": "Oslo"});
        let event: CreateEvent = serde_json::from_value(body.clone()).unwrap();
        assert!(event.validate().is_err());

        body["location"] = json!({"type": "Point", "coordinates": [12.34, 56.78]});
        let event: CreateEvent = serde_json::from_value(body).unwrap();
        assert!(event.validate().is_ok());

        let location = Location {
            coordinates: Some(vec![f64::NAN, 1.0]),
            ..Default::default()
        };
        assert!(location.validate().is_err());
    }

    #[test]
    fn test_location_coordinates_must_be_on_the_globe() {
        let at = |longitude: f64, latitude: f64| Location {
            coordinates: Some(vec![longitude, latitude]),
            ..Default::default()
        };

        assert!(at(500.0, -500.0).validate().is_err());
        assert!(at(181.0, 0.0).validate().is_err());
        assert!(at(0.0, -90.5).validate().is_err());
        assert!(at(f64::INFINITY, 0.0).validate().is_err());
        assert!(at(180.0, 90.0).validate().is_ok());
        assert!(at(-180.0, -90.0).validate().is_ok());

        let mut body = event_body();
        body["location"] = json!({"coordinates": [200.0, 10.0]});
        let event: CreateEvent = serde_json::from_value(body).unwrap();
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_location_normalized_sets_point() {
        let location = Location {
            coordinates: Some(vec![1.0, 2.0]),
            ..Default::default()
        }
        .normalized();
        assert_eq!(location.kind, Some(GeoKind::Point));

        let address_only = Location {
            address: Some("1 Main St".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(address_only.kind, None);
    }

    #[test]
    fn test_post_serializes_with_type_tag() {
        let now = Utc::now();
        let post = Post::Blog(Blog {
            props: PostProps {
                id: "65f0c0ffee0000000000abcd".into(),
                title: "A".into(),
                sub_title: None,
                content: "B".into(),
                author_id: "u1".into(),
                feature_img: vec![],
                tags: vec!["x".into()],
                is_published: false,
                created_at: now,
                updated_at: now,
            },
        });

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["type"], "blog");
        assert_eq!(value["authorId"], "u1");
        assert_eq!(value["isPublished"], false);
        assert!(value.get("subTitle").is_none());

        let back: Post = serde_json::from_value(value).unwrap();
        assert_eq!(back.kind(), PostKind::Blog);
        assert_eq!(back.id(), "65f0c0ffee0000000000abcd");
    }

    #[test]
    fn test_post_kind_parses_lowercase() {
        assert_eq!("event".parse::<PostKind>().unwrap(), PostKind::Event);
        assert!("video".parse::<PostKind>().is_err());
        assert_eq!(PostKind::Blog.to_string(), PostKind::Blog.as_str());
    }
}
