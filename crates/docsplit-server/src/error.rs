//! Mapping of pipeline errors onto HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use docsplit_core::Error;

/// An error response: `{"error": message}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::InvalidParameters(_) | Error::EmptyInput(_) | Error::Http(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if err.is_client_error() {
            warn!("Rejected request: {}", err);
        } else {
            error!("Request failed: {}", err);
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        warn!("Unreadable upload: {}", err);
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidParameters("x".into()), StatusCode::BAD_REQUEST),
            (Error::EmptyInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::Http("x".into()), StatusCode::BAD_REQUEST),
            (Error::extraction("pdf", "x"), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_message_is_human_readable() {
        let api = ApiError::from(Error::InvalidParameters(
            "sentences_per_chunk must be at least 2 (got 1)".into(),
        ));
        assert_eq!(
            api.message,
            "Invalid parameters: sentences_per_chunk must be at least 2 (got 1)"
        );
    }
}
