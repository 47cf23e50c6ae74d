//! Request validation.
//!
//! Validation never mutates state; a request that fails here has touched no
//! store.

use crate::account::CreateRequest;
use crate::protocol::Protocol;

/// Rejected input.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("username is required")]
    EmptyUsername,

    #[error("username may only contain letters, digits and underscore")]
    InvalidUsername(String),

    #[error("password is required for ssh accounts")]
    MissingPassword,

    #[error("expired_days must be >= 1")]
    InvalidExpiry,
}

/// Check that a username is non-empty and matches `[A-Za-z0-9_]+`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

/// Validate a caller-supplied create request for the given protocol.
pub fn validate_request(protocol: Protocol, req: &CreateRequest) -> Result<(), ValidationError> {
    validate_username(&req.username)?;
    if protocol.is_ssh() && req.password.as_deref().unwrap_or("").is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    if req.expired_days < 1 {
        return Err(ValidationError::InvalidExpiry);
    }
    Ok(())
}
