use jsonwebtoken::Algorithm;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Credential coordinator combining password verification and token
/// handling.
///
/// Deliberately knows nothing about where users live: callers look up the
/// stored hash, this type decides whether a presented password matches and
/// mints/validates the bearer tokens.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

impl Authenticator {
    pub fn new(jwt_secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret, algorithm),
        }
    }

    /// Verify a presented password against a stored hash.
    ///
    /// # Errors
    /// * `PasswordError` - stored hash is malformed or comparison failed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Sign claims into a bearer token.
    ///
    /// # Errors
    /// * `JwtError` - token signing failed
    pub fn issue_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode a bearer token.
    ///
    /// # Errors
    /// * `JwtError` - bad signature, malformed token, or expired
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
