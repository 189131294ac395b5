use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    VerificationTokenCreated,
    VerificationEmailSent,
    EmailVerified,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::VerificationTokenCreated => "verification_token_created",
            AuditAction::VerificationEmailSent => "verification_email_sent",
            AuditAction::EmailVerified => "email_verified",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub subject: Option<String>,
    pub detail: serde_json::Value,
    pub created_at: NaiveDateTime,
}

impl AuditEntry {
    pub fn new(action: AuditAction, subject: Option<&str>, detail: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            subject: subject.map(str::to_owned),
            detail,
            created_at: Utc::now().naive_utc(),
        }
    }
}
