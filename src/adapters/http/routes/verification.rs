//! Email verification routes used by the registration, resend and verify-email pages.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::validators::{is_valid_email, is_valid_user_id},
    domain::entities::verification_token::{TokenVerification, VerificationFailure},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationEmailPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerPayload {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct VerifyEmailPayload {
    #[serde(default)]
    token: String,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/send-verification-email", post(send_verification_email))
        .route("/verification/resend", post(resend))
        .route("/verify-email", post(verify_email))
}

/// POST /api/send-verification-email
/// Emails the link for a token the registration flow already issued.
async fn send_verification_email(
    State(app_state): State<AppState>,
    Json(payload): Json<SendVerificationEmailPayload>,
) -> AppResult<impl IntoResponse> {
    let (user_id, email) = validate_owner(&payload.user_id, &payload.email)?;
    let token = payload.token.trim();
    if token.is_empty() {
        return Err(AppError::InvalidInput("token is required".into()));
    }

    app_state
        .verification_use_cases
        .send_verification_email(user_id, email, token)
        .await?;

    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}

/// POST /api/verification/resend
/// Issues a new token and emails it in one step.
async fn resend(
    State(app_state): State<AppState>,
    Json(payload): Json<OwnerPayload>,
) -> AppResult<impl IntoResponse> {
    let (user_id, email) = validate_owner(&payload.user_id, &payload.email)?;

    app_state
        .verification_use_cases
        .resend_verification_email(user_id, email)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(SuccessResponse { success: true })))
}

/// POST /api/verify-email
/// Verifies and consumes the token, then marks the profile verified.
async fn verify_email(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyEmailPayload>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .verification_use_cases
        .complete_email_verification(payload.token.trim())
        .await?;

    Ok((verification_status(&result), Json(result)))
}

fn validate_owner<'a>(user_id: &'a str, email: &'a str) -> AppResult<(&'a str, &'a str)> {
    let user_id = user_id.trim();
    if !is_valid_user_id(user_id) {
        return Err(AppError::InvalidInput("userId is required".into()));
    }
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AppError::InvalidInput("Invalid email format".into()));
    }
    Ok((user_id, email))
}

fn verification_status(result: &TokenVerification) -> StatusCode {
    match result.failure() {
        None => StatusCode::OK,
        Some(VerificationFailure::NotFound) => StatusCode::NOT_FOUND,
        Some(VerificationFailure::AlreadyUsed) => StatusCode::CONFLICT,
        Some(VerificationFailure::Expired) => StatusCode::GONE,
        Some(VerificationFailure::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
