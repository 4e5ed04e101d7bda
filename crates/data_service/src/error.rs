use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{resource} identifier must not be empty")]
    InvalidIdentifier { resource: &'static str },
    #[error("cannot build request url for {path}: {reason}")]
    InvalidUrl { path: String, reason: String },
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {path} returned status {status}")]
    Status {
        path: String,
        status: u16,
        code: ErrorCode,
    },
    #[error("malformed response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn status(path: impl Into<String>, status: u16) -> Self {
        Self::Status {
            path: path.into(),
            status,
            code: ErrorCode::from_status(status),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FetchError::InvalidIdentifier { .. } | FetchError::InvalidUrl { .. } => {
                ErrorCode::Validation
            }
            FetchError::Transport { .. } => ErrorCode::Transport,
            FetchError::Status { code, .. } => *code,
            FetchError::Decode { .. } => ErrorCode::Decode,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), self.to_string())
    }
}
