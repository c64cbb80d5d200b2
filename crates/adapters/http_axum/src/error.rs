//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use driphub_domain::error::{DripHubError, NotFoundError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`DripHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(DripHubError);

impl ApiError {
    /// An id that does not parse can never name a resource, so it maps
    /// to 404 rather than leaking parser details.
    #[must_use]
    pub fn unknown_resource(entity: &'static str, id: &str) -> Self {
        Self(
            NotFoundError {
                entity,
                id: id.to_string(),
            }
            .into(),
        )
    }
}

impl From<DripHubError> for ApiError {
    fn from(err: DripHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DripHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            DripHubError::MalformedEvent(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            DripHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            DripHubError::Transition(err) => (StatusCode::CONFLICT, err.to_string()),
            DripHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
