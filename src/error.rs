//! Error types for the Shelfside client

use thiserror::Error;

/// Main client error type
///
/// Mirrors the failure taxonomy the backend exposes: a request that never
/// completed, a rejected session, a 4xx with an `{error}` body, or a
/// server-side failure (5xx or a malformed response).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication required: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Flatten `validator` derive output into a single user-facing message.
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let mut parts: Vec<String> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                match &error.message {
                    Some(message) => parts.push(message.to_string()),
                    None => parts.push(format!("{} is invalid", field)),
                }
            }
        }
        parts.sort();
        ClientError::Validation(parts.join("; "))
    }

    /// True when the failure means the session is missing or expired.
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            // A 2xx whose body did not match the contract is a server fault
            ClientError::Server(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
