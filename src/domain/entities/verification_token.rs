use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Lifetime of every verification token. Fixed policy, not configuration.
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// A single-use, time-boxed proof that the holder controls `email`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VerificationToken {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub used: bool,
}

impl VerificationToken {
    /// Build a fresh, unused record. `expires_at` is always derived from `created_at`.
    pub fn issue(token: String, user_id: String, email: String, now: NaiveDateTime) -> Self {
        Self {
            token,
            user_id,
            email,
            created_at: now,
            expires_at: now + Duration::minutes(TOKEN_TTL_MINUTES),
            used: false,
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now > self.expires_at
    }

    /// Checks in the order: consumed, then expired.
    pub fn check(&self, now: NaiveDateTime) -> Result<(), VerificationFailure> {
        if self.used {
            return Err(VerificationFailure::AlreadyUsed);
        }
        if self.is_expired(now) {
            return Err(VerificationFailure::Expired);
        }
        Ok(())
    }

    /// Short prefix that is safe to put in logs.
    pub fn log_prefix(token: &str) -> &str {
        token.get(..8).unwrap_or(token)
    }
}

/// Why a token cannot be used for verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("Token not found")]
    NotFound,

    #[error("Token has already been used")]
    AlreadyUsed,

    #[error("Token has expired. Please request a new verification email.")]
    Expired,

    #[error("{0}")]
    StoreUnavailable(String),
}

impl VerificationFailure {
    pub fn code(&self) -> &'static str {
        match self {
            VerificationFailure::NotFound => "TOKEN_NOT_FOUND",
            VerificationFailure::AlreadyUsed => "TOKEN_ALREADY_USED",
            VerificationFailure::Expired => "TOKEN_EXPIRED",
            VerificationFailure::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

/// Outcome of verifying a token, rendered as `{valid, userId, email}` or `{valid, error, code}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerification {
    Valid { user_id: String, email: String },
    Invalid(VerificationFailure),
}

impl TokenVerification {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenVerification::Valid { .. })
    }

    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            TokenVerification::Valid { .. } => None,
            TokenVerification::Invalid(failure) => Some(failure),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerificationWire<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl Serialize for TokenVerification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            TokenVerification::Valid { user_id, email } => VerificationWire {
                valid: true,
                user_id: Some(user_id),
                email: Some(email),
                error: None,
                code: None,
            },
            TokenVerification::Invalid(failure) => VerificationWire {
                valid: false,
                user_id: None,
                email: None,
                error: Some(failure.to_string()),
                code: Some(failure.code()),
            },
        };
        wire.serialize(serializer)
    }
}

/// Result of the conditional `used: false -> true` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkUsedOutcome {
    Marked,
    AlreadyUsed,
    NotFound,
}
