use validator::ValidateEmail;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Auth provider uids are opaque, but never blank and never absurdly long.
pub fn is_valid_user_id(user_id: &str) -> bool {
    let user_id = user_id.trim();
    !user_id.is_empty() && user_id.len() <= 128
}
