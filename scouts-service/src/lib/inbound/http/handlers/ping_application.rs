use axum::extract::State;
use axum::Json;

use super::PingResponse;
use crate::domain::health::ports::DatabaseProber;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

/// Liveness probe; answers as long as the process serves requests.
pub async fn ping_application<UR, HP>(
    State(_state): State<AppState<UR, HP>>,
) -> Json<PingResponse>
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    Json(PingResponse::ok())
}
