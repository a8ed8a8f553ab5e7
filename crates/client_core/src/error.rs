use shared::error::{ApiError, ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("backend returned {status}: {}", .error.message)]
    Http { status: u16, error: ApiError },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid session token: {0}")]
    InvalidToken(String),
    /// The session is valid but not tied to a company.
    #[error("session has no company; this action needs a company account")]
    NoCompany,
    #[error("{0}")]
    Validation(#[from] ApiException),
}

impl ClientError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Http { error, .. } => Some(error.code),
            Self::Validation(e) => Some(e.code),
            Self::NotAuthenticated | Self::InvalidToken(_) => Some(ErrorCode::Unauthorized),
            _ => None,
        }
    }

    /// True when signing in again is the only way forward.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::Unauthorized) | Some(ErrorCode::Forbidden)
        )
    }
}
