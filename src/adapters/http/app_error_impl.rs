use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::StoreUnavailable(_) => error_resp(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::StoreUnavailable,
                "Service temporarily unavailable. Please try again.".into(),
            ),
            AppError::RateLimited => error_resp(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorCode::RateLimited,
                "Too many requests. Please try again later.".into(),
            ),
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, msg)
            }
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, "Not found".into())
            }
            AppError::TokenAlreadyUsed => error_resp(
                StatusCode::CONFLICT,
                ErrorCode::TokenAlreadyUsed,
                "Token has already been used".into(),
            ),
            AppError::EmailDelivery(_) => error_resp(
                StatusCode::BAD_GATEWAY,
                ErrorCode::EmailDeliveryFailed,
                "Failed to send verification email".into(),
            ),
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                "Internal error".into(),
            ),
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, error: String) -> Response {
    let body = serde_json::json!({ "code": code.as_str(), "error": error });
    (status, Json(body)).into_response()
}
