//! In-memory implementations of the verification storage and delivery traits.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::verification_token::{MarkUsedOutcome, VerificationToken},
    use_cases::verification::{EmailSender, UserProfileRepo, VerificationTokenStore},
};

fn store_down() -> AppError {
    AppError::StoreUnavailable("in-memory store offline".into())
}

// ============================================================================
// InMemoryVerificationTokenStore
// ============================================================================

/// Token store backed by a HashMap. `mark_used` runs under the lock so it has
/// the same compare-and-set behaviour as the SQL update.
#[derive(Default)]
pub struct InMemoryVerificationTokenStore {
    tokens: Mutex<HashMap<String, VerificationToken>>,
    failing: AtomicBool,
}

impl InMemoryVerificationTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Vec<VerificationToken>) -> Self {
        let store = Self::new();
        for token in tokens {
            store.insert(token);
        }
        store
    }

    pub fn insert(&self, record: VerificationToken) {
        self.tokens
            .lock()
            .unwrap()
            .insert(record.token.clone(), record);
    }

    pub fn snapshot(&self, token: &str) -> Option<VerificationToken> {
        self.tokens.lock().unwrap().get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(store_down());
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationTokenStore for InMemoryVerificationTokenStore {
    async fn put(&self, record: &VerificationToken) -> AppResult<()> {
        self.check_online()?;
        self.insert(record.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> AppResult<Option<VerificationToken>> {
        self.check_online()?;
        Ok(self.snapshot(token))
    }

    async fn mark_used(&self, token: &str) -> AppResult<MarkUsedOutcome> {
        self.check_online()?;
        let mut tokens = self.tokens.lock().unwrap();
        Ok(match tokens.get_mut(token) {
            None => MarkUsedOutcome::NotFound,
            Some(record) if record.used => MarkUsedOutcome::AlreadyUsed,
            Some(record) => {
                record.used = true;
                MarkUsedOutcome::Marked
            }
        })
    }

    async fn delete(&self, token: &str) -> AppResult<()> {
        self.check_online()?;
        self.tokens.lock().unwrap().remove(token);
        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: NaiveDateTime) -> AppResult<u64> {
        self.check_online()?;
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at >= cutoff);
        Ok((before - tokens.len()) as u64)
    }
}

// ============================================================================
// InMemoryUserProfileRepo
// ============================================================================

#[derive(Debug, Clone, Default)]
struct ProfileRecord {
    email: String,
    verify_calls: usize,
}

/// Profiles keyed by user id. Verification only lands when the email matches,
/// like the Postgres `WHERE id = $1 AND email = $2` update.
#[derive(Default)]
pub struct InMemoryUserProfileRepo {
    profiles: Mutex<HashMap<String, ProfileRecord>>,
    failing: AtomicBool,
}

impl InMemoryUserProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: &str, email: &str) {
        self.profiles.lock().unwrap().insert(
            user_id.to_string(),
            ProfileRecord {
                email: email.to_string(),
                verify_calls: 0,
            },
        );
    }

    pub fn is_verified(&self, user_id: &str) -> bool {
        self.verify_calls(user_id) > 0
    }

    pub fn verify_calls(&self, user_id: &str) -> usize {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .map(|p| p.verify_calls)
            .unwrap_or(0)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserProfileRepo for InMemoryUserProfileRepo {
    async fn mark_email_verified(&self, user_id: &str, email: &str) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(store_down());
        }
        match self.profiles.lock().unwrap().get_mut(user_id) {
            Some(profile) if profile.email == email => {
                profile.verify_calls += 1;
                Ok(())
            }
            _ => Err(AppError::NotFound),
        }
    }
}

// ============================================================================
// InMemoryEmailSender
// ============================================================================

#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email sender that captures outgoing mail instead of delivering it.
#[derive(Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<CapturedEmail>>,
    failing: AtomicBool,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured_emails(&self) -> Vec<CapturedEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::EmailDelivery("provider rejected message".into()));
        }
        self.sent.lock().unwrap().push(CapturedEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_token;

    #[tokio::test]
    async fn mark_used_flips_once() {
        let record = create_test_token(|_| {});
        let store = InMemoryVerificationTokenStore::with_tokens(vec![record.clone()]);

        assert_eq!(
            store.mark_used(&record.token).await.unwrap(),
            MarkUsedOutcome::Marked
        );
        assert_eq!(
            store.mark_used(&record.token).await.unwrap(),
            MarkUsedOutcome::AlreadyUsed
        );
        assert_eq!(
            store.mark_used("missing").await.unwrap(),
            MarkUsedOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn failing_store_rejects_every_call() {
        let store = InMemoryVerificationTokenStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.get("x").await,
            Err(AppError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.put(&create_test_token(|_| {})).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
