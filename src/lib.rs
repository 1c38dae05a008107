//! Shelfside Personal Library Client
//!
//! A Rust client for the Shelfside library management service: session
//! handling, a shared session/catalog state store, and the mutation
//! actions views dispatch, all against the backend's REST JSON API.

use std::sync::Arc;

pub mod actions;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod routes;
pub mod store;

pub use config::AppConfig;
pub use error::{ClientError, ClientResult};

/// Application handles shared by every view
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: store::SessionStore,
    pub actions: Arc<actions::Actions>,
}
