//! HTTP error responses.

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Categories of handler failures, each tied to a status code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    #[default]
    InternalServerError,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl ErrorKind {
    /// Returns the HTTP status code for this error kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns a generic message for this error kind.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The request could not be processed due to invalid data",
            Self::NotFound => "The requested resource was not found",
            Self::InternalServerError => "An internal server error occurred",
            Self::ServiceUnavailable => "A backend service is unavailable",
        }
    }

    /// Creates an [`Error`] with the specified message.
    pub fn with_message(self, message: impl Into<String>) -> Error {
        Error::new(self).with_message(message)
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub error: String,
}

/// The error type for HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
}

impl Error {
    /// Creates a new [`Error`] with the specified kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Sets the message returned to the client.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message returned to the client.
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.kind.status_code())
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<docqa_rig::Error> for Error {
    fn from(error: docqa_rig::Error) -> Self {
        let kind = if error.is_recoverable() {
            ErrorKind::ServiceUnavailable
        } else {
            ErrorKind::InternalServerError
        };
        kind.with_message(error.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message().to_string(),
        };
        (self.kind.status_code(), Json(body)).into_response()
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_status_codes() {
        let unavailable = Error::from(docqa_rig::Error::generation("model offline"));
        assert_eq!(unavailable.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(unavailable.message(), "generation error: model offline");

        let internal = Error::from(docqa_rig::Error::embedding("bad vector"));
        assert_eq!(internal.kind(), ErrorKind::InternalServerError);
    }

    #[test]
    fn default_message_is_used_without_override() {
        let error = Error::new(ErrorKind::NotFound);
        assert_eq!(error.message(), "The requested resource was not found");
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }
}
