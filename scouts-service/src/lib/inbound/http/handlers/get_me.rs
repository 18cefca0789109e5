use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::inbound::http::middleware::CurrentUser;
use crate::user::models::User;

/// Profile of the user the bearer token resolves to.
pub async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserSchema> {
    Json((&user).into())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSchema {
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserSchema {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
