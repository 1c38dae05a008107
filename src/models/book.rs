//! Book model, rating shape, and the new-book request type

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Per-book rating data
///
/// Canonical nested shape: `user_rating` is the current user's own rating,
/// `global_rating` the average across all users. Older backend revisions
/// emitted these as flat fields on the book; `BookWire` folds both shapes
/// into this one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default, alias = "user_rating")]
    pub user_rating: Option<u8>,
    #[serde(default, alias = "global_rating")]
    pub global_rating: Option<f64>,
}

/// Book in the global catalog
///
/// The same book identity can appear inside any number of libraries, always
/// under the same `id` it has in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub rating: Rating,
}

/// Raw book payload as the backend sends it
///
/// Rating data arrives either nested under `rating` or as flat
/// `user_rating`/`global_rating` fields depending on the endpoint revision.
/// This is the single place where that drift is normalized.
#[derive(Debug, Clone, Deserialize)]
pub struct BookWire {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default, alias = "userRating")]
    pub user_rating: Option<u8>,
    #[serde(default, alias = "globalRating")]
    pub global_rating: Option<f64>,
}

impl From<BookWire> for Book {
    fn from(wire: BookWire) -> Self {
        // Nested shape wins; flat fields are the legacy fallback
        let rating = wire.rating.unwrap_or(Rating {
            user_rating: wire.user_rating,
            global_rating: wire.global_rating,
        });
        Book {
            id: wire.id,
            title: wire.title,
            author: wire.author,
            genre: wire.genre,
            published_year: wire.published_year,
            rating,
        }
    }
}

/// New-book request: either a reference to an existing catalog book by id,
/// or a full payload for a book not yet in the catalog.
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[validate(schema(function = "validate_book_draft"))]
pub struct BookDraft {
    /// Existing catalog book to link, when set the payload fields are ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_published_year"))]
    pub published_year: Option<i32>,
}

impl BookDraft {
    /// Draft referencing a book already in the catalog
    pub fn existing(book_id: i64) -> Self {
        Self {
            book_id: Some(book_id),
            ..Self::default()
        }
    }

    /// Draft for a brand new book
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }
}

fn draft_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_book_draft(draft: &BookDraft) -> Result<(), ValidationError> {
    if draft.book_id.is_some() {
        return Ok(());
    }
    if draft.title.trim().is_empty() {
        return Err(draft_error("title_required", "Title is required"));
    }
    if draft.author.trim().is_empty() {
        return Err(draft_error("author_required", "Author is required"));
    }
    Ok(())
}

fn validate_published_year(year: i32) -> Result<(), ValidationError> {
    let current_year = Utc::now().year();
    if year < 0 || year > current_year {
        return Err(draft_error("published_year", "Year cannot be in the future"));
    }
    Ok(())
}
