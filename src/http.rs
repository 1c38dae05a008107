//! HTTP access layer: typed calls against the backend API
//!
//! All requests carry the cookie-based session credentials held by the
//! shared `reqwest` client. Non-2xx statuses never reach callers as data;
//! they are classified into the client error taxonomy here.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::book::BookWire;
use crate::models::library::LibraryWire;
use crate::models::session::{catalog_from_wire, SessionInfoWire};
use crate::models::{
    Book, BookDraft, CreateLibraryRequest, Library, LoginRequest, SessionInfo, SignupRequest,
    UpdateLibraryRequest,
};

/// Everything the client can ask of the backend, one method per endpoint.
///
/// The action layer and the session store depend on this trait rather than
/// on `reqwest` so that tests can script backend behavior.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /user_session`
    async fn fetch_session(&self) -> ClientResult<SessionInfo>;
    /// `GET /books`
    async fn fetch_catalog(&self) -> ClientResult<Vec<Book>>;
    /// `POST /login`
    async fn login(&self, request: &LoginRequest) -> ClientResult<SessionInfo>;
    /// `DELETE /logout`
    async fn logout(&self) -> ClientResult<()>;
    /// `POST /signup`
    async fn signup(&self, request: &SignupRequest) -> ClientResult<SessionInfo>;
    /// `POST /libraries`
    async fn create_library(&self, request: &CreateLibraryRequest) -> ClientResult<Library>;
    /// `PATCH /libraries/:id`
    async fn rename_library(
        &self,
        library_id: i64,
        request: &UpdateLibraryRequest,
    ) -> ClientResult<Library>;
    /// `DELETE /libraries/:id`
    async fn delete_library(&self, library_id: i64) -> ClientResult<()>;
    /// `POST /libraries/:id/books`
    async fn add_book(&self, library_id: i64, draft: &BookDraft) -> ClientResult<Book>;
    /// `PATCH /libraries/:id/books/:book_id`
    async fn rate_book(&self, library_id: i64, book_id: i64, rating: u8) -> ClientResult<Book>;
    /// `DELETE /libraries/:id/books/:book_id`
    async fn remove_book(&self, library_id: i64, book_id: i64) -> ClientResult<()>;
}

/// `Backend` implementation over HTTP
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read a JSON body, classifying any non-2xx status first
    async fn read_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| ClientError::Server(format!("malformed response body: {}", e)))
    }

    /// Check the status of a response whose body does not matter (204s)
    async fn read_empty(&self, response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_session(&self) -> ClientResult<SessionInfo> {
        let response = self.http.get(self.endpoint("user_session")).send().await?;
        let wire: SessionInfoWire = self.read_json(response).await?;
        wire.try_into()
    }

    async fn fetch_catalog(&self) -> ClientResult<Vec<Book>> {
        let response = self.http.get(self.endpoint("books")).send().await?;
        let wire: Vec<BookWire> = self.read_json(response).await?;
        Ok(catalog_from_wire(wire))
    }

    async fn login(&self, request: &LoginRequest) -> ClientResult<SessionInfo> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(request)
            .send()
            .await?;
        let wire: SessionInfoWire = self.read_json(response).await?;
        wire.try_into()
    }

    async fn logout(&self) -> ClientResult<()> {
        let response = self.http.delete(self.endpoint("logout")).send().await?;
        self.read_empty(response).await
    }

    async fn signup(&self, request: &SignupRequest) -> ClientResult<SessionInfo> {
        let response = self
            .http
            .post(self.endpoint("signup"))
            .json(request)
            .send()
            .await?;
        let wire: SessionInfoWire = self.read_json(response).await?;
        wire.try_into()
    }

    async fn create_library(&self, request: &CreateLibraryRequest) -> ClientResult<Library> {
        let response = self
            .http
            .post(self.endpoint("libraries"))
            .json(request)
            .send()
            .await?;
        let wire: LibraryWire = self.read_json(response).await?;
        wire.try_into()
    }

    async fn rename_library(
        &self,
        library_id: i64,
        request: &UpdateLibraryRequest,
    ) -> ClientResult<Library> {
        let response = self
            .http
            .patch(self.endpoint(&format!("libraries/{}", library_id)))
            .json(request)
            .send()
            .await?;
        let wire: LibraryWire = self.read_json(response).await?;
        wire.try_into()
    }

    async fn delete_library(&self, library_id: i64) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("libraries/{}", library_id)))
            .send()
            .await?;
        self.read_empty(response).await
    }

    async fn add_book(&self, library_id: i64, draft: &BookDraft) -> ClientResult<Book> {
        let response = self
            .http
            .post(self.endpoint(&format!("libraries/{}/books", library_id)))
            .json(draft)
            .send()
            .await?;
        let wire: BookWire = self.read_json(response).await?;
        Ok(wire.into())
    }

    async fn rate_book(&self, library_id: i64, book_id: i64, rating: u8) -> ClientResult<Book> {
        let response = self
            .http
            .patch(self.endpoint(&format!("libraries/{}/books/{}", library_id, book_id)))
            .json(&json!({ "rating": rating }))
            .send()
            .await?;
        let wire: BookWire = self.read_json(response).await?;
        Ok(wire.into())
    }

    async fn remove_book(&self, library_id: i64, book_id: i64) -> ClientResult<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("libraries/{}/books/{}", library_id, book_id)))
            .send()
            .await?;
        self.read_empty(response).await
    }
}

/// Map a non-2xx response to the client error taxonomy
fn classify_failure(status: u16, body: &str) -> ClientError {
    let server_message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from));

    match status {
        401 => ClientError::Auth(server_message.unwrap_or_else(|| "not logged in".to_string())),
        400..=499 => ClientError::Validation(
            server_message.unwrap_or_else(|| format!("request rejected with status {}", status)),
        ),
        _ => ClientError::Server(
            server_message.unwrap_or_else(|| format!("server responded with status {}", status)),
        ),
    }
}
