use std::sync::Arc;

use auth::Authenticator;
use auth::Claims;

use crate::domain::auth::errors::AuthError;
use crate::user::models::User;
use crate::user::models::Username;
use crate::user::ports::UserRepository;

/// Authentication service composing the credential store with password
/// verification and token handling.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    token_ttl_minutes: i64,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>, token_ttl_minutes: i64) -> Self {
        Self {
            repository,
            authenticator,
            token_ttl_minutes,
        }
    }

    /// Check a username/password pair against the store.
    ///
    /// Unknown username, syntactically invalid username, and wrong password
    /// all come back as `Ok(None)` so callers cannot tell them apart.
    ///
    /// # Errors
    /// * `Password` - stored hash could not be verified at all
    /// * `User` - the store lookup itself failed
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let Ok(username) = Username::new(username.to_string()) else {
            return Ok(None);
        };

        let Some(user) = self.repository.find_by_username(&username).await? else {
            return Ok(None);
        };

        if self
            .authenticator
            .verify_password(password, &user.password_hash)?
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Issue a bearer token for an authenticated user with the configured
    /// TTL.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::for_subject(user.username.as_str(), self.token_ttl_minutes);
        Ok(self.authenticator.issue_token(&claims)?)
    }

    /// Resolve the user a bearer token represents.
    ///
    /// Check order matters: the token is validated structurally before any
    /// store lookup, so garbage input never costs a database round trip.
    ///
    /// # Errors
    /// * `Unauthorized` - invalid/expired token, missing subject, or the
    ///   subject does not resolve to a user
    /// * `User` - the store lookup itself failed
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            AuthError::Unauthorized
        })?;

        let subject = claims.subject().ok_or(AuthError::Unauthorized)?;

        let username =
            Username::new(subject.to_string()).map_err(|_| AuthError::Unauthorized)?;

        self.repository
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}
