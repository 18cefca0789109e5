use axum::extract::State;
use axum::Json;

use super::ping_messages;
use super::ApiError;
use super::PingResponse;
use crate::domain::health::ports::DatabaseProber;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

/// Readiness probe; runs one round trip against the database.
pub async fn ping_database<UR, HP>(
    State(state): State<AppState<UR, HP>>,
) -> Result<Json<PingResponse>, ApiError>
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    if state.health_service.check_database().await {
        Ok(Json(PingResponse::ok()))
    } else {
        Err(ApiError::DependencyUnavailable(
            ping_messages::DB_ERROR.to_string(),
        ))
    }
}
