use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::user::errors::UserError;

/// Errors raised while authenticating requests.
///
/// `Unauthorized` deliberately carries no detail: missing, malformed,
/// expired, and unresolvable tokens are all indistinguishable to callers.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error(transparent)]
    User(#[from] UserError),
}
