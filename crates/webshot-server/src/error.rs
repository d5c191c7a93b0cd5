//! Error types for the webshot server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

#[derive(Debug)]
pub enum WebshotError {
    Capture(page_capture::CaptureError),
    Cache(snapshot_cache::CacheError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for WebshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebshotError::Capture(err) => write!(f, "Capture error: {}", err),
            WebshotError::Cache(err) => write!(f, "Cache error: {}", err),
            WebshotError::Io(err) => write!(f, "IO error: {}", err),
            WebshotError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for WebshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebshotError::Capture(err) => Some(err),
            WebshotError::Cache(err) => Some(err),
            WebshotError::Io(err) => Some(err.as_ref()),
            WebshotError::Config(_) => None,
        }
    }
}

impl From<page_capture::CaptureError> for WebshotError {
    fn from(err: page_capture::CaptureError) -> Self {
        WebshotError::Capture(err)
    }
}

impl From<snapshot_cache::CacheError> for WebshotError {
    fn from(err: snapshot_cache::CacheError) -> Self {
        WebshotError::Cache(err)
    }
}

impl From<std::io::Error> for WebshotError {
    fn from(err: std::io::Error) -> Self {
        WebshotError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for WebshotError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        WebshotError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WebshotError>;

/// Request-level error that converts to a plain-text HTTP response
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(WebshotError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Error capturing or caching snapshot");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                )
                    .into_response()
            }
        }
    }
}

impl From<WebshotError> for AppError {
    fn from(err: WebshotError) -> Self {
        AppError::Internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_display() {
        let err = WebshotError::from(page_capture::CaptureError::Navigation(
            "http://nonexistent.invalid: net::ERR_NAME_NOT_RESOLVED".to_string(),
        ));
        assert_eq!(
            format!("{}", err),
            "Capture error: Navigation error: http://nonexistent.invalid: net::ERR_NAME_NOT_RESOLVED"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = WebshotError::Config("missing CACHE_DIR".to_string());
        assert_eq!(format!("{}", err), "Configuration error: missing CACHE_DIR");
    }

    #[test]
    fn test_bad_request_response() {
        let response = AppError::BadRequest("invalid width: abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_response_is_opaque() {
        let err = WebshotError::Config("secret detail".to_string());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
