use core::time::Duration;

use f1_admin_model::ModelError;
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ApiError {
    #[error("HTTP {}: {body}", .status.as_u16())]
    Status { status: StatusCode, body: String },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failure {0}")]
    Io(#[from] std::io::Error),
    #[error("hyper {0}")]
    Hyper(#[from] hyper::Error),
    #[error("hyper http {0}")]
    Http(#[from] http::Error),
    #[error("invalid url {0}")]
    Uri(#[from] http::uri::InvalidUri),
    #[error("unsupported url {0}, only http:// urls with a host are supported")]
    UnsupportedUrl(String),
    #[error("failed to encode request body {0}")]
    Encode(serde_json::Error),
    #[error("failed to decode response {0}")]
    Decode(#[from] ModelError),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The request never produced a response, e.g. connection refused or timeout.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Io(_) | Self::Hyper(_))
    }
}

pub type Result<T> = core::result::Result<T, ApiError>;
