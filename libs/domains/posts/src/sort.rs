//! Sort-string parsing and the free-text search predicate.
//!
//! Accepted sort forms:
//!
//! | Input          | Result            |
//! |----------------|-------------------|
//! | *(none)*       | `updatedAt` desc  |
//! | `-title`       | `title` desc      |
//! | `title:desc`   | `title` desc      |
//! | `title:asc`    | `title` asc       |
//! | `title`        | `title` asc       |

use mongodb::bson::{Document, doc};

use crate::error::{PostError, PostResult};

pub const DEFAULT_SORT_FIELD: &str = "updatedAt";

/// Fields matched by the search term
const SEARCH_FIELDS: [&str; 3] = ["title", "subTitle", "content"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    field: String,
    direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: DEFAULT_SORT_FIELD.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

impl SortSpec {
    pub fn new(field: &str, direction: SortDirection) -> PostResult<Self> {
        let valid = !field.is_empty()
            && field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            && !field.split('.').any(str::is_empty);

        if !valid {
            return Err(PostError::InvalidSort(format!(
                "'{field}' is not a sortable field"
            )));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    pub fn parse(raw: Option<&str>) -> PostResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        if let Some(field) = raw.strip_prefix('-') {
            return Self::new(field, SortDirection::Descending);
        }

        match raw.split_once(':') {
            Some((field, direction)) => {
                let direction = match direction.trim().to_ascii_lowercase().as_str() {
                    "desc" => SortDirection::Descending,
                    "asc" => SortDirection::Ascending,
                    other => {
                        return Err(PostError::InvalidSort(format!(
                            "unknown sort direction '{other}', expected 'asc' or 'desc'"
                        )));
                    }
                };
                Self::new(field.trim(), direction)
            }
            None => Self::new(raw, SortDirection::Ascending),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Sort document with `_id` appended as a tie-breaker.
    pub fn to_document(&self) -> Document {
        let field = if self.field == "id" { "_id" } else { self.field.as_str() };
        let direction = self.direction.as_i32();

        let mut sort = doc! { field: direction };
        if field != "_id" {
            sort.insert("_id", direction);
        }
        sort
    }
}

/// Case-insensitive literal match on title, subtitle and content.
///
/// Blank terms yield `None`. Regex metacharacters in the term are escaped.
pub fn search_filter(term: &str) -> Option<Document> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let pattern = regex::escape(term);
    let clauses: Vec<Document> = SEARCH_FIELDS
        .iter()
        .map(|field| doc! { *field: { "$regex": pattern.as_str(), "$options": "i" } })
        .collect();

    Some(doc! { "$or": clauses })
}
