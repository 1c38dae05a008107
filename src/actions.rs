//! Action layer: every mutation the client performs
//!
//! Single funnel between views and the backend. Each operation validates
//! its input locally first (a local rejection never issues a request),
//! calls the backend, and on success merges the server's authoritative
//! response into the session store. On failure the store is left exactly
//! as it was and the error is returned to the caller.

use std::sync::Arc;
use validator::Validate;

use crate::error::{ClientError, ClientResult};
use crate::http::Backend;
use crate::models::{
    Book, BookDraft, CreateLibraryRequest, Library, LoginRequest, SignupRequest,
    UpdateLibraryRequest,
};
use crate::store::SessionStore;

pub struct Actions {
    backend: Arc<dyn Backend>,
    store: SessionStore,
}

impl Actions {
    pub fn new(backend: Arc<dyn Backend>, store: SessionStore) -> Self {
        Self { backend, store }
    }

    /// Library/book mutations are refused locally when anonymous; the
    /// server would reject them anyway but the client must not attempt.
    fn require_login(&self) -> ClientResult<()> {
        if self.store.read().is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::Auth("not logged in".to_string()))
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        request
            .validate()
            .map_err(|e| ClientError::from_validation(&e))?;

        let session = self.backend.login(&request).await?;
        self.store.update(|prev| prev.with_session(session));
        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.backend.logout().await?;
        self.store.reset();
        tracing::info!("Logged out");
        Ok(())
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> ClientResult<()> {
        let request = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        request
            .validate()
            .map_err(|e| ClientError::from_validation(&e))?;

        let session = self.backend.signup(&request).await?;
        self.store.update(|prev| prev.with_session(session));
        tracing::info!("Signed up as {}", username);
        Ok(())
    }

    pub async fn create_library(&self, name: &str, private: bool) -> ClientResult<Library> {
        let request = CreateLibraryRequest {
            name: name.to_string(),
            private,
        };
        request
            .validate()
            .map_err(|e| ClientError::from_validation(&e))?;
        self.require_login()?;

        let library = self.backend.create_library(&request).await?;
        tracing::info!("Created library '{}' (id={})", library.name, library.id);
        self.store.update(|prev| prev.with_library(library.clone()));
        Ok(library)
    }

    /// Rename a library. Only the name is merged back, preserving the
    /// library's id and book list as they are in the store.
    pub async fn update_library(&self, library_id: i64, new_name: &str) -> ClientResult<()> {
        let request = UpdateLibraryRequest {
            name: new_name.to_string(),
        };
        request
            .validate()
            .map_err(|e| ClientError::from_validation(&e))?;
        self.require_login()?;

        let updated = self.backend.rename_library(library_id, &request).await?;
        tracing::info!("Renamed library id={} to '{}'", library_id, updated.name);
        self.store
            .update(|prev| prev.with_renamed_library(library_id, &updated.name));
        Ok(())
    }

    /// Delete a library; books are catalog-owned so the global catalog is
    /// untouched.
    pub async fn delete_library(&self, library_id: i64) -> ClientResult<()> {
        self.require_login()?;

        self.backend.delete_library(library_id).await?;
        tracing::info!("Deleted library id={}", library_id);
        self.store.update(|prev| prev.without_library(library_id));
        Ok(())
    }

    /// Add a book to a library, either linking an existing catalog book by
    /// id or creating a new one. The server's canonical representation is
    /// merged into both the library and the catalog without duplicating ids.
    pub async fn add_book_to_library(
        &self,
        library_id: i64,
        draft: BookDraft,
    ) -> ClientResult<Book> {
        draft
            .validate()
            .map_err(|e| ClientError::from_validation(&e))?;
        self.require_login()?;

        let book = self.backend.add_book(library_id, &draft).await?;
        tracing::info!(
            "Added book '{}' (id={}) to library id={}",
            book.title,
            book.id,
            library_id
        );
        self.store
            .update(|prev| prev.with_linked_book(library_id, book.clone()));
        Ok(book)
    }

    /// Rate a book. The confirmed rating is applied to every library entry
    /// and the catalog entry sharing the id, against the state current when
    /// the response arrives: a book removed in the meantime stays removed.
    pub async fn rate_book(&self, library_id: i64, book_id: i64, rating: u8) -> ClientResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(ClientError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        self.require_login()?;

        let updated = self.backend.rate_book(library_id, book_id, rating).await?;
        tracing::info!("Rated book id={} with {}", book_id, rating);
        self.store
            .update(|prev| prev.with_book_rating(book_id, &updated.rating));
        Ok(())
    }

    /// Remove a book from one library; other libraries and the catalog keep
    /// their entries.
    pub async fn delete_book(&self, library_id: i64, book_id: i64) -> ClientResult<()> {
        self.require_login()?;

        self.backend.remove_book(library_id, book_id).await?;
        tracing::info!("Removed book id={} from library id={}", book_id, library_id);
        self.store
            .update(|prev| prev.without_library_book(library_id, book_id));
        Ok(())
    }
}
