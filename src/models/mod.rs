//! Data models for the Shelfside client

pub mod book;
pub mod library;
pub mod session;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDraft, Rating};
pub use library::{CreateLibraryRequest, Library, UpdateLibraryRequest};
pub use session::{SessionInfo, SessionState};
pub use user::{LoginRequest, SignupRequest, User};
