//! Input validation
//!
//! Explicit checks applied by the service layer before anything is written.

use crate::error::{CoreError, Result};
use crate::model::{ExchangeType, NewSession};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CAPACITY: u32 = 10_000;

/// Require a non-blank string field
pub fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "must not be blank"));
    }
    Ok(())
}

/// Minimal structural email check: one '@' with a dotted domain
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| CoreError::validation("email", "must contain '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(CoreError::validation("email", "malformed address"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(CoreError::validation("email", "domain must contain a dot"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(CoreError::validation("email", "must not contain whitespace"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::validation(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

/// Lower-case and trim an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a session before it is created
pub fn validate_new_session(session: &NewSession) -> Result<()> {
    require_non_blank("title", &session.title)?;
    if session.title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::validation(
            "title",
            format!("must be at most {} characters", MAX_TITLE_LEN),
        ));
    }
    if session.capacity == 0 {
        return Err(CoreError::validation("capacity", "must be at least 1"));
    }
    if session.capacity > MAX_CAPACITY {
        return Err(CoreError::validation(
            "capacity",
            format!("must be at most {}", MAX_CAPACITY),
        ));
    }
    if session.starts_at >= session.ends_at {
        return Err(CoreError::validation("endsAt", "must be after startsAt"));
    }
    validate_cost(session.exchange_type, session.credits_cost)
}

/// Costs are non-negative and swaps are free
pub fn validate_cost(exchange_type: ExchangeType, credits_cost: i64) -> Result<()> {
    if credits_cost < 0 {
        return Err(CoreError::validation("creditsCost", "must not be negative"));
    }
    if exchange_type == ExchangeType::Swap && credits_cost != 0 {
        return Err(CoreError::validation("creditsCost", "swap sessions cost no credits"));
    }
    Ok(())
}
