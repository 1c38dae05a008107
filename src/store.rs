//! Session store: single writer over the process-wide session state
//!
//! The original client let mutation handlers rebuild state from snapshots
//! captured before their request resolved, which loses concurrent updates.
//! Here every producer runs under one writer lock against the state current
//! at application time, so overlapping operations compose instead of
//! clobbering each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

use crate::http::Backend;
use crate::models::SessionState;

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<Arc<SessionState>>,
    publisher: watch::Sender<Arc<SessionState>>,
    initialized: AtomicBool,
}

impl SessionStore {
    /// Empty store; `read` is well-defined immediately but `is_initialized`
    /// stays false until `initialize` completes.
    pub fn new() -> Self {
        let initial = Arc::new(SessionState::anonymous());
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                publisher,
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Current snapshot
    pub fn read(&self) -> Arc<SessionState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply a pure producer against the state current at application time
    /// and publish the result. The only sanctioned mutation path.
    pub fn update<F>(&self, produce: F) -> Arc<SessionState>
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(produce(&guard));
        *guard = next.clone();
        // Published before the guard drops so snapshots reach subscribers in
        // commit order. Receivers may all be gone; that is not an error for
        // the writer.
        let _ = self.inner.publisher.send(next.clone());
        drop(guard);
        next
    }

    /// Change notifications for views; each new snapshot is observed at most
    /// once per receiver, latest wins.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.inner.publisher.subscribe()
    }

    /// True once `initialize` has run to completion, success or fallback
    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    /// Tear the session down to anonymous (logout); the catalog is public
    /// data and stays cached.
    pub fn reset(&self) -> Arc<SessionState> {
        self.update(|prev| prev.logged_out())
    }

    /// Fetch the current session and the global catalog, then publish the
    /// combined state in one update.
    ///
    /// A 401 on the session check means anonymous, not an error. Network or
    /// server failures degrade to the anonymous/empty portion so the UI is
    /// never stuck on a partially-loaded state.
    pub async fn initialize(&self, backend: &dyn Backend) {
        let session = match backend.fetch_session().await {
            Ok(info) => info,
            Err(err) if err.is_auth() => {
                tracing::debug!("No active session, starting anonymous");
                Default::default()
            }
            Err(err) => {
                tracing::warn!("Session check failed, starting anonymous: {}", err);
                Default::default()
            }
        };

        let catalog = match backend.fetch_catalog().await {
            Ok(books) => books,
            Err(err) => {
                tracing::warn!("Catalog fetch failed, starting with empty catalog: {}", err);
                Vec::new()
            }
        };

        self.update(|_| SessionState {
            user: session.user,
            libraries: session.libraries,
            books: catalog,
        });
        self.inner.initialized.store(true, Ordering::Release);

        let state = self.read();
        tracing::info!(
            "Session initialized: user={}, libraries={}, catalog={}",
            state
                .user
                .as_ref()
                .map(|u| u.username.as_str())
                .unwrap_or("<anonymous>"),
            state.libraries.len(),
            state.books.len()
        );
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::http::MockBackend;
    use crate::models::{Book, Library, Rating, SessionInfo, User};

    fn sample_user() -> User {
        User {
            id: 1,
            username: "reader".to_string(),
            email: Some("reader@example.com".to_string()),
        }
    }

    fn sample_book(id: i64) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: "Author".to_string(),
            genre: None,
            published_year: None,
            rating: Rating::default(),
        }
    }

    #[tokio::test]
    async fn initialize_populates_session_and_catalog() {
        let mut backend = MockBackend::new();
        backend.expect_fetch_session().returning(|| {
            Ok(SessionInfo {
                user: Some(sample_user()),
                libraries: vec![Library {
                    id: 1,
                    name: "Favorites".to_string(),
                    books: vec![],
                }],
            })
        });
        backend
            .expect_fetch_catalog()
            .returning(|| Ok(vec![sample_book(10), sample_book(11)]));

        let store = SessionStore::new();
        assert!(!store.is_initialized());
        store.initialize(&backend).await;

        let state = store.read();
        assert!(store.is_initialized());
        assert!(state.is_authenticated());
        assert_eq!(state.libraries.len(), 1);
        assert_eq!(state.books.len(), 2);
    }

    #[tokio::test]
    async fn initialize_falls_back_to_anonymous_on_auth_failure() {
        let mut backend = MockBackend::new();
        backend
            .expect_fetch_session()
            .returning(|| Err(ClientError::Auth("not logged in".to_string())));
        backend
            .expect_fetch_catalog()
            .returning(|| Ok(vec![sample_book(10)]));

        let store = SessionStore::new();
        store.initialize(&backend).await;

        let state = store.read();
        assert!(store.is_initialized());
        assert!(!state.is_authenticated());
        assert_eq!(state.books.len(), 1);
    }

    #[tokio::test]
    async fn initialize_degrades_to_empty_on_network_failure() {
        let mut backend = MockBackend::new();
        backend
            .expect_fetch_session()
            .returning(|| Err(ClientError::Network("connection refused".to_string())));
        backend
            .expect_fetch_catalog()
            .returning(|| Err(ClientError::Network("connection refused".to_string())));

        let store = SessionStore::new();
        store.initialize(&backend).await;

        assert!(store.is_initialized());
        assert_eq!(*store.read(), SessionState::anonymous());
    }

    #[tokio::test]
    async fn updates_compose_against_the_latest_state() {
        let store = SessionStore::new();
        store.update(|_| SessionState {
            user: Some(sample_user()),
            libraries: vec![],
            books: vec![sample_book(1)],
        });

        // A producer written before this update runs must still observe it
        store.update(|prev| prev.with_catalog(vec![sample_book(1), sample_book(2)]));
        store.update(|prev| {
            let mut next = prev.clone();
            next.books.retain(|b| b.id != 1);
            next
        });

        let state = store.read();
        assert!(state.is_authenticated());
        assert_eq!(state.books.len(), 1);
        assert_eq!(state.books[0].id, 2);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let store = SessionStore::new();
        let mut handles = Vec::new();
        for id in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.update(|prev| {
                    let mut next = prev.clone();
                    next.books.push(sample_book(id));
                    next
                });
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.read().books.len(), 16);
    }

    #[tokio::test]
    async fn subscribers_converge_on_the_latest_snapshot() {
        let store = SessionStore::new();
        let mut receiver = store.subscribe();

        // Snapshots are published in commit order, so once the racing
        // writers are done the last one seen is the last one committed.
        let mut handles = Vec::new();
        for id in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.update(|prev| {
                    let mut next = prev.clone();
                    next.books.push(sample_book(id));
                    next
                });
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*receiver.borrow_and_update(), store.read());
    }

    #[tokio::test]
    async fn reset_returns_to_anonymous_keeping_catalog() {
        let store = SessionStore::new();
        store.update(|_| SessionState {
            user: Some(sample_user()),
            libraries: vec![Library {
                id: 1,
                name: "Favorites".to_string(),
                books: vec![],
            }],
            books: vec![sample_book(10)],
        });

        store.reset();

        let state = store.read();
        assert!(!state.is_authenticated());
        assert!(state.libraries.is_empty());
        assert_eq!(state.books.len(), 1);
    }

    #[tokio::test]
    async fn subscribers_observe_new_snapshots() {
        let store = SessionStore::new();
        let mut receiver = store.subscribe();

        store.update(|prev| prev.with_catalog(vec![sample_book(5)]));
        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().books.len(), 1);
    }
}
