//! Library model and library request types

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::ClientError;
use crate::models::book::{Book, BookWire};

/// Named, user-owned collection referencing a subset of the global catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub books: Vec<Book>,
}

impl Library {
    /// Whether this library references the given catalog book
    pub fn contains_book(&self, book_id: i64) -> bool {
        self.books.iter().any(|b| b.id == book_id)
    }
}

/// Raw library payload as the backend sends it
///
/// Backend revisions disagree on the key name (`id` vs `library_id`); the
/// conversion below is the only place the drift is resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryWire {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub library_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub books: Vec<BookWire>,
}

impl TryFrom<LibraryWire> for Library {
    type Error = ClientError;

    fn try_from(wire: LibraryWire) -> Result<Self, Self::Error> {
        let id = wire.id.or(wire.library_id).ok_or_else(|| {
            ClientError::Server(format!("library '{}' has no id field", wire.name))
        })?;
        Ok(Library {
            id,
            name: wire.name,
            books: wire.books.into_iter().map(Book::from).collect(),
        })
    }
}

/// Create library request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateLibraryRequest {
    #[validate(custom(function = "validate_library_name"))]
    pub name: String,
    pub private: bool,
}

/// Rename library request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateLibraryRequest {
    #[validate(custom(function = "validate_library_name"))]
    pub name: String,
}

fn validate_library_name(name: &str) -> Result<(), ValidationError> {
    let length = name.chars().count();
    if length < 3 {
        let mut err = ValidationError::new("library_name");
        err.message = Some("Library name must be at least 3 characters".into());
        return Err(err);
    }
    if length > 100 {
        let mut err = ValidationError::new("library_name");
        err.message = Some("Library name can be at most 100 characters".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_accepts_canonical_id() {
        let json = r#"{ "id": 7, "name": "Sci-Fi", "books": [] }"#;
        let library: Library = serde_json::from_str::<LibraryWire>(json)
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(library.id, 7);
    }

    #[test]
    fn wire_accepts_legacy_library_id() {
        let json = r#"{ "library_id": 12, "name": "History" }"#;
        let library: Library = serde_json::from_str::<LibraryWire>(json)
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(library.id, 12);
        assert!(library.books.is_empty());
    }

    #[test]
    fn wire_without_any_id_is_rejected() {
        let json = r#"{ "name": "Orphan" }"#;
        let result: Result<Library, _> =
            serde_json::from_str::<LibraryWire>(json).unwrap().try_into();
        assert!(matches!(result, Err(ClientError::Server(_))));
    }

    #[test]
    fn create_request_enforces_name_bounds() {
        let short = CreateLibraryRequest {
            name: "ab".to_string(),
            private: false,
        };
        assert!(short.validate().is_err());

        let long = CreateLibraryRequest {
            name: "x".repeat(101),
            private: false,
        };
        assert!(long.validate().is_err());

        let ok = CreateLibraryRequest {
            name: "Sci-Fi Favorites".to_string(),
            private: true,
        };
        assert!(ok.validate().is_ok());
    }
}
