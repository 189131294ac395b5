use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_json::json;
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        email_templates::{verification_email, verification_link},
        token::{generate_token, is_well_formed_token},
        use_cases::{audit::AuditTrail, settings::SettingsHandle},
    },
    domain::entities::{
        audit_entry::AuditAction,
        verification_token::{
            MarkUsedOutcome, TokenVerification, VerificationFailure, VerificationToken,
        },
    },
};

/// Keyed persistence for verification tokens. The only writer of token records.
#[async_trait]
pub trait VerificationTokenStore: Send + Sync {
    /// Upsert keyed by `record.token`.
    async fn put(&self, record: &VerificationToken) -> AppResult<()>;
    async fn get(&self, token: &str) -> AppResult<Option<VerificationToken>>;
    /// Atomically flips `used` from false to true. Leaves every other field alone.
    async fn mark_used(&self, token: &str) -> AppResult<MarkUsedOutcome>;
    async fn delete(&self, token: &str) -> AppResult<()>;
    /// Removes tokens whose `expires_at` is before `cutoff`. Returns how many went.
    async fn delete_expired_before(&self, cutoff: NaiveDateTime) -> AppResult<u64>;
}

#[async_trait]
pub trait UserProfileRepo: Send + Sync {
    /// Flags the profile only while its email is still `email`.
    /// `NotFound` when no profile has that id and address.
    async fn mark_email_verified(&self, user_id: &str, email: &str) -> AppResult<()>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct VerificationUseCases {
    store: Arc<dyn VerificationTokenStore>,
    profiles: Arc<dyn UserProfileRepo>,
    email: Arc<dyn EmailSender>,
    audit: AuditTrail,
    settings: SettingsHandle,
    app_origin: Url,
}

impl VerificationUseCases {
    pub fn new(
        store: Arc<dyn VerificationTokenStore>,
        profiles: Arc<dyn UserProfileRepo>,
        email: Arc<dyn EmailSender>,
        audit: AuditTrail,
        settings: SettingsHandle,
        app_origin: Url,
    ) -> Self {
        Self {
            store,
            profiles,
            email,
            audit,
            settings,
            app_origin,
        }
    }

    /// Issues a fresh token valid for 30 minutes or until consumed.
    #[instrument(skip(self))]
    pub async fn create_verification_token(&self, user_id: &str, email: &str) -> AppResult<String> {
        if user_id.is_empty() {
            return Err(AppError::InvalidInput("userId is required".into()));
        }
        if email.is_empty() {
            return Err(AppError::InvalidInput("email is required".into()));
        }

        let record = VerificationToken::issue(
            generate_token(),
            user_id.to_string(),
            email.to_string(),
            now(),
        );
        self.store.put(&record).await?;

        info!(
            token = VerificationToken::log_prefix(&record.token),
            expires_at = %record.expires_at,
            "Verification token created"
        );
        self.audit.record(
            AuditAction::VerificationTokenCreated,
            Some(user_id),
            json!({ "email": email, "expiresAt": record.expires_at }),
        );

        Ok(record.token)
    }

    /// Read-only check. Never consumes the token and never returns an error:
    /// store failures come back as `Invalid(StoreUnavailable)`.
    #[instrument(skip_all, fields(token = VerificationToken::log_prefix(token)))]
    pub async fn verify_token(&self, token: &str) -> TokenVerification {
        if !is_well_formed_token(token) {
            return TokenVerification::Invalid(VerificationFailure::NotFound);
        }

        let record = match self.store.get(token).await {
            Ok(Some(record)) => record,
            Ok(None) => return TokenVerification::Invalid(VerificationFailure::NotFound),
            Err(e) => {
                warn!(error = %e, "Token lookup failed");
                return TokenVerification::Invalid(VerificationFailure::StoreUnavailable(
                    e.to_string(),
                ));
            }
        };

        match record.check(now()) {
            Ok(()) => TokenVerification::Valid {
                user_id: record.user_id,
                email: record.email,
            },
            Err(failure) => TokenVerification::Invalid(failure),
        }
    }

    /// Consumes the token. The flip is a conditional update, so of two racing
    /// callers exactly one succeeds and the other gets `TokenAlreadyUsed`.
    #[instrument(skip_all, fields(token = VerificationToken::log_prefix(token)))]
    pub async fn mark_token_as_used(&self, token: &str) -> AppResult<()> {
        match self.store.mark_used(token).await? {
            MarkUsedOutcome::Marked => Ok(()),
            MarkUsedOutcome::AlreadyUsed => Err(AppError::TokenAlreadyUsed),
            MarkUsedOutcome::NotFound => Err(AppError::NotFound),
        }
    }

    /// Emails the verification link for an already issued token. The token must
    /// still be valid and belong to `user_id` and `email`.
    #[instrument(skip(self, token))]
    pub async fn send_verification_email(
        &self,
        user_id: &str,
        email: &str,
        token: &str,
    ) -> AppResult<()> {
        match self.verify_token(token).await {
            TokenVerification::Valid {
                user_id: owner,
                email: address,
            } if owner == user_id && address == email => {}
            TokenVerification::Invalid(VerificationFailure::StoreUnavailable(msg)) => {
                return Err(AppError::StoreUnavailable(msg));
            }
            _ => {
                return Err(AppError::InvalidInput(
                    "Invalid or expired verification token".into(),
                ));
            }
        }

        let settings = self.settings.current();
        let link = verification_link(&self.app_origin, token);
        let (subject, html) = verification_email(&self.app_origin, &settings.site_name, &link);
        self.email.send(email, &subject, &html).await?;

        self.audit.record(
            AuditAction::VerificationEmailSent,
            Some(user_id),
            json!({ "email": email }),
        );
        Ok(())
    }

    /// Issues a new token and emails it. A token whose email could not be sent
    /// is deleted again.
    #[instrument(skip(self))]
    pub async fn resend_verification_email(&self, user_id: &str, email: &str) -> AppResult<()> {
        let token = self.create_verification_token(user_id, email).await?;

        if let Err(e) = self.send_verification_email(user_id, email, &token).await {
            if let Err(cleanup) = self.store.delete(&token).await {
                warn!(error = %cleanup, "Failed to delete undeliverable token");
            }
            return Err(e);
        }
        Ok(())
    }

    /// The verify-email page flow: verify, consume, then flag the profile.
    #[instrument(skip_all, fields(token = VerificationToken::log_prefix(token)))]
    pub async fn complete_email_verification(&self, token: &str) -> AppResult<TokenVerification> {
        let (user_id, email) = match self.verify_token(token).await {
            TokenVerification::Valid { user_id, email } => (user_id, email),
            invalid => return Ok(invalid),
        };

        match self.mark_token_as_used(token).await {
            Ok(()) => {}
            Err(AppError::TokenAlreadyUsed) => {
                return Ok(TokenVerification::Invalid(VerificationFailure::AlreadyUsed));
            }
            Err(AppError::NotFound) => {
                return Ok(TokenVerification::Invalid(VerificationFailure::NotFound));
            }
            Err(e) => return Err(e),
        }

        self.profiles.mark_email_verified(&user_id, &email).await?;

        info!(user_id = %user_id, "Email verified");
        self.audit
            .record(AuditAction::EmailVerified, Some(&user_id), json!({}));

        Ok(TokenVerification::Valid { user_id, email })
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
