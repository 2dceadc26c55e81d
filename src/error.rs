use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Why a request path could not be mapped under the root directory.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Path is outside root directory")]
    PathEscape,

    #[error("Invalid path")]
    InvalidPath,
}

/// Outcome of a failed browse request.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Access denied")]
    Forbidden,

    #[error("Invalid path")]
    InvalidPath,

    #[error("File not found")]
    NotFound,

    #[error("Cannot read directory: {0}")]
    DirectoryUnreadable(#[source] std::io::Error),

    #[error("Cannot read file: {0}")]
    FileUnreadable(#[source] std::io::Error),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Forbidden => StatusCode::FORBIDDEN,
            DispatchError::InvalidPath => StatusCode::BAD_REQUEST,
            DispatchError::NotFound => StatusCode::NOT_FOUND,
            DispatchError::DirectoryUnreadable(_) | DispatchError::FileUnreadable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short message shown to the client. Never contains a filesystem path
    /// or the underlying I/O error.
    pub fn public_message(&self) -> &'static str {
        match self {
            DispatchError::Forbidden => "Access denied",
            DispatchError::InvalidPath => "Invalid path",
            DispatchError::NotFound => "File not found",
            DispatchError::DirectoryUnreadable(_) => "Cannot read directory",
            DispatchError::FileUnreadable(_) => "Cannot read file",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::Forbidden => "PATH_TRAVERSAL",
            DispatchError::InvalidPath => "INVALID_PATH",
            DispatchError::NotFound => "NOT_FOUND",
            DispatchError::DirectoryUnreadable(_) | DispatchError::FileUnreadable(_) => {
                "READ_FAILURE"
            }
        }
    }
}

impl From<Rejection> for DispatchError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::PathEscape => DispatchError::Forbidden,
            Rejection::InvalidPath => DispatchError::InvalidPath,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    code: &'static str,
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.public_message(),
            code: self.code(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Errors raised while assembling the startup configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Root directory does not exist: {0}")]
    RootMissing(String),

    #[error("Root path is not a directory: {0}")]
    RootNotDirectory(String),

    #[error("Browse prefix must start with '/' and name a segment: {0:?}")]
    InvalidPrefix(String),
}
