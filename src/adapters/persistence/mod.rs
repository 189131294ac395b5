use sqlx::{PgPool, error::ErrorKind};

use crate::app_error::AppError;

pub mod audit_log;
pub mod settings;
pub mod user_profile;
pub mod verification_token;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return AppError::InvalidInput("A record with this value already exists".into());
                }
                // e.g. a token whose expiry is not created_at + 30 minutes
                ErrorKind::CheckViolation => {
                    return AppError::InvalidInput("Record violates a storage constraint".into());
                }
                ErrorKind::NotNullViolation => {
                    return AppError::InvalidInput("Required field is missing".into());
                }
                _ => {}
            }
        }
        tracing::error!(error = %err, "Database error");
        AppError::StoreUnavailable("Database operation failed".into())
    }
}
