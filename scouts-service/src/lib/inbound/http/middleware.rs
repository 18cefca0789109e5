use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::auth::errors::AuthError;
use crate::domain::health::ports::DatabaseProber;
use crate::inbound::http::router::AppState;
use crate::user::models::User;
use crate::user::ports::UserRepository;

/// Extension type carrying the resolved user of an authenticated request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware validating the bearer token and resolving the current user.
///
/// Every failure mode (missing header, malformed header, invalid/expired
/// token, unresolvable subject) produces the same 401 so callers learn
/// nothing about which check failed.
pub async fn authenticate<UR, HP>(
    State(state): State<AppState<UR, HP>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response>
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    let token = extract_bearer_token(&req).ok_or_else(unauthorized)?;

    let user = state
        .auth_service
        .current_user(token)
        .await
        .map_err(|e| match e {
            AuthError::Unauthorized => unauthorized(),
            other => {
                tracing::error!(error = %other, "Failed to resolve current user");
                ApiError::InternalServerError(other.to_string()).into_response()
            }
        })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    ApiError::Unauthorized("Could not validate credentials".to_string()).into_response()
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
