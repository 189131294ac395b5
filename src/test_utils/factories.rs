//! Test data factories. Use the closure parameter to override specific fields.

use chrono::{NaiveDateTime, Utc};

use crate::{
    application::token::generate_token, domain::entities::verification_token::VerificationToken,
};

/// A fresh, unused token for `u1` / `a@b.com` issued just now.
pub fn create_test_token(overrides: impl FnOnce(&mut VerificationToken)) -> VerificationToken {
    let mut record = VerificationToken::issue(
        generate_token(),
        "u1".to_string(),
        "a@b.com".to_string(),
        test_now(),
    );
    overrides(&mut record);
    record
}

pub fn test_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
