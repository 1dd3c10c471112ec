use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shared::SyncError;

/// Error returned by handlers. Client errors carry their message; anything
/// else is logged and answered with a generic 500.
#[derive(Debug)]
pub enum ApiError {
    Sync(SyncError),
    /// The request body, query string or path could not be extracted.
    Rejected { status: StatusCode, message: String },
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        ApiError::Sync(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Rejected { status, message } => {
                tracing::debug!(%status, %message, "Rejected request");
                (status, message)
            }
            ApiError::Sync(e) => {
                let status = match &e {
                    SyncError::InvalidSymbol(_) | SyncError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    SyncError::NotFound { .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if e.is_client_error() {
                    (status, e.to_string())
                } else {
                    tracing::error!(error = %e, "Request failed");
                    (status, "Internal server error".to_string())
                }
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
