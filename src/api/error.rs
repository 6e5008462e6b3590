// this_file: src/api/error.rs
//! HTTP error mapping for the analysis API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Serialize;

use crate::error::Error;

/// Error type returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Domain error from the analysis core
    Core(Error),
    /// Transport-shape problem (malformed multipart, missing field)
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    kind: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Core(err) => match &err {
                Error::UnsupportedMediaType(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "unsupported_media_type",
                    err.to_string(),
                ),
                Error::PayloadTooLarge { .. } => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "payload_too_large",
                    err.to_string(),
                ),
                Error::EmptyPayload => {
                    (StatusCode::BAD_REQUEST, "empty_payload", err.to_string())
                }
                Error::InvalidImage(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_image", err.to_string())
                }
                Error::InvalidMetric(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_metric", err.to_string())
                }
                Error::InvalidEdgeMode(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_edge_mode", err.to_string())
                }
                Error::InvalidUrl(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_url", err.to_string())
                }
                Error::DisallowedHost(_) => {
                    (StatusCode::BAD_REQUEST, "disallowed_host", err.to_string())
                }
                Error::FetchTimeout(_) => (
                    StatusCode::REQUEST_TIMEOUT,
                    "fetch_timeout",
                    err.to_string(),
                ),
                Error::UpstreamStatus(_) => {
                    (StatusCode::BAD_REQUEST, "upstream_status", err.to_string())
                }
                Error::FetchFailed(_) => {
                    (StatusCode::BAD_REQUEST, "fetch_failed", err.to_string())
                }
                // Internal details are logged, never returned to the client
                Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                    error!("Internal error serving request: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        let body = ErrorResponse {
            error: ErrorBody { message, kind },
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::Core(Error::UnsupportedMediaType("image/gif".into())),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                ApiError::Core(Error::PayloadTooLarge { size: 9, max: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                ApiError::Core(Error::FetchTimeout("https://example.com/a.png".into())),
                StatusCode::REQUEST_TIMEOUT,
            ),
            (
                ApiError::Core(Error::InvalidMetric("contrast".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Core(Error::Internal("oops".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::BadRequest("missing field".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
