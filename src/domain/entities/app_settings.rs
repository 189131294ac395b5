use serde::{Deserialize, Serialize};

pub const DEFAULT_SITE_NAME: &str = "Tournament Hub";

/// Platform-wide settings managed from the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub site_name: String,
    pub registration_open: bool,
    pub email_verification_required: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            registration_open: true,
            email_verification_required: true,
        }
    }
}
