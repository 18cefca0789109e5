use axum::extract::State;
use axum::Form;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use crate::domain::health::ports::DatabaseProber;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

/// Exchange a username/password pair for a bearer token.
///
/// Unknown usernames and wrong passwords are answered identically.
pub async fn authenticate<UR, HP>(
    State(state): State<AppState<UR, HP>>,
    Form(body): Form<AuthenticationRequestBody>,
) -> Result<Json<Token>, ApiError>
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    let user = state
        .auth_service
        .authenticate(&body.username, &body.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".to_string()))?;

    let access_token = state.auth_service.issue_token(&user)?;

    Ok(Json(Token {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticationRequestBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}
