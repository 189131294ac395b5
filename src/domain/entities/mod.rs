pub mod app_settings;
pub mod audit_entry;
pub mod verification_token;
