//! Session state: the single client-side view of user, libraries, and catalog

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::book::{Book, BookWire, Rating};
use crate::models::library::{Library, LibraryWire};
use crate::models::user::User;

/// Session payload from `GET /user_session`: who is logged in and which
/// libraries they own. The catalog is fetched separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInfo {
    pub user: Option<User>,
    pub libraries: Vec<Library>,
}

/// Raw session payload as the backend sends it
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfoWire {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub libraries: Vec<LibraryWire>,
}

impl TryFrom<SessionInfoWire> for SessionInfo {
    type Error = ClientError;

    fn try_from(wire: SessionInfoWire) -> Result<Self, Self::Error> {
        Ok(SessionInfo {
            user: wire.user,
            libraries: wire
                .libraries
                .into_iter()
                .map(Library::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// The process-wide client state: current user, owned libraries, and the
/// global book catalog.
///
/// Every change goes through a pure producer that returns a fresh value;
/// nothing here mutates in place. The producers below uphold two rules:
/// a book carried by any library has a same-id catalog entry with identical
/// rating data, and library identity (`id`) survives every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<User>,
    pub libraries: Vec<Library>,
    pub books: Vec<Book>,
}

impl SessionState {
    /// Empty, unauthenticated state
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Derived auth: a user record present means logged in, nothing else does
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn library(&self, library_id: i64) -> Option<&Library> {
        self.libraries.iter().find(|l| l.id == library_id)
    }

    pub fn catalog_book(&self, book_id: i64) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    /// Replace user and libraries (login, signup, session refresh); the
    /// already-fetched catalog is kept.
    ///
    /// Library books arrive carrying per-user ratings the anonymous catalog
    /// fetch could not know, so their rating data is folded into the same-id
    /// catalog entries; a library book missing from the catalog is added.
    pub fn with_session(&self, info: SessionInfo) -> Self {
        let mut books = self.books.clone();
        for library in &info.libraries {
            for book in &library.books {
                match books.iter_mut().find(|b| b.id == book.id) {
                    Some(slot) => slot.rating = book.rating.clone(),
                    None => books.push(book.clone()),
                }
            }
        }
        Self {
            user: info.user,
            libraries: info.libraries,
            books,
        }
    }

    /// Replace the global catalog
    pub fn with_catalog(&self, books: Vec<Book>) -> Self {
        Self {
            user: self.user.clone(),
            libraries: self.libraries.clone(),
            books,
        }
    }

    /// Drop user and libraries (logout); the catalog stays cached
    pub fn logged_out(&self) -> Self {
        Self {
            user: None,
            libraries: Vec::new(),
            books: self.books.clone(),
        }
    }

    /// Insert a library, or replace the entry already carrying its id
    pub fn with_library(&self, library: Library) -> Self {
        let mut next = self.clone();
        match next.libraries.iter_mut().find(|l| l.id == library.id) {
            Some(slot) => *slot = library,
            None => next.libraries.push(library),
        }
        next
    }

    /// Remove a library; its books stay in the catalog (catalog-owned)
    pub fn without_library(&self, library_id: i64) -> Self {
        let mut next = self.clone();
        next.libraries.retain(|l| l.id != library_id);
        next
    }

    /// Rename a library in place, preserving its id and book list
    pub fn with_renamed_library(&self, library_id: i64, name: &str) -> Self {
        let mut next = self.clone();
        if let Some(library) = next.libraries.iter_mut().find(|l| l.id == library_id) {
            library.name = name.to_string();
        }
        next
    }

    /// Merge a server-confirmed book into one library and the catalog.
    ///
    /// Idempotent on id: an id already present in the target library is
    /// replaced rather than duplicated, and the catalog keeps exactly one
    /// entry per id.
    pub fn with_linked_book(&self, library_id: i64, book: Book) -> Self {
        let mut next = self.clone();
        match next.books.iter_mut().find(|b| b.id == book.id) {
            Some(slot) => *slot = book.clone(),
            None => next.books.push(book.clone()),
        }
        if let Some(library) = next.libraries.iter_mut().find(|l| l.id == library_id) {
            match library.books.iter_mut().find(|b| b.id == book.id) {
                Some(slot) => *slot = book,
                None => library.books.push(book),
            }
        }
        next
    }

    /// Remove a book from one library only; other libraries and the catalog
    /// are untouched.
    pub fn without_library_book(&self, library_id: i64, book_id: i64) -> Self {
        let mut next = self.clone();
        if let Some(library) = next.libraries.iter_mut().find(|l| l.id == library_id) {
            library.books.retain(|b| b.id != book_id);
        }
        next
    }

    /// Apply a server-confirmed rating to every occurrence of the book.
    ///
    /// Maps existing entries only: a rating response arriving after the book
    /// was removed must not resurrect it anywhere.
    pub fn with_book_rating(&self, book_id: i64, rating: &Rating) -> Self {
        let mut next = self.clone();
        for library in &mut next.libraries {
            for book in &mut library.books {
                if book.id == book_id {
                    book.rating = rating.clone();
                }
            }
        }
        for book in &mut next.books {
            if book.id == book_id {
                book.rating = rating.clone();
            }
        }
        next
    }
}

/// Raw catalog payload: `GET /books` returns a bare array of books
pub fn catalog_from_wire(wire: Vec<BookWire>) -> Vec<Book> {
    wire.into_iter().map(Book::from).collect()
}
