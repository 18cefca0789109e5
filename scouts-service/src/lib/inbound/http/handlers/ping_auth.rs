use axum::Extension;
use axum::Json;

use super::PingResponse;
use crate::inbound::http::middleware::CurrentUser;

/// Authenticated probe; echoes the username the token resolved to.
pub async fn ping_auth(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<PingResponse> {
    Json(PingResponse::ok_with_detail(user.username.as_str()))
}
