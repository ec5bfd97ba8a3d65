use reqwest::StatusCode;

use crate::errors::StorageError;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

/// The login response did not have the expected shape
#[derive(thiserror::Error, Debug)]
pub enum LoginParseError {
    #[error("response body is not valid: {0}")]
    InvalidBody(#[from] serde_json::Error),
    #[error("response did not include a token")]
    MissingToken,
    #[error("user id must be a non-negative number or a non-empty string")]
    InvalidUserId,
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Login rejected with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("Unexpected login response: {0}")]
    UnexpectedResponse(#[from] LoginParseError),
    #[error("Failed to save session: {0}")]
    SessionNotSaved(#[from] StorageError),
}

impl AuthError {
    /// Returns `true` if the server refused the credentials (or the request)
    ///
    /// [`Rejected`]: AuthError::Rejected
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
