use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::authenticate::authenticate;
use super::handlers::get_me::get_me;
use super::handlers::ping_application::ping_application;
use super::handlers::ping_auth::ping_auth;
use super::handlers::ping_database::ping_database;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::service::AuthService;
use crate::domain::health::ports::DatabaseProber;
use crate::domain::health::service::HealthService;
use crate::user::ports::UserRepository;

pub struct AppState<UR, HP>
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    pub auth_service: Arc<AuthService<UR>>,
    pub health_service: Arc<HealthService<HP>>,
}

// Manual impl: deriving would demand UR/HP themselves be Clone.
impl<UR, HP> Clone for AppState<UR, HP>
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            health_service: Arc::clone(&self.health_service),
        }
    }
}

pub fn create_router<UR, HP>(
    auth_service: Arc<AuthService<UR>>,
    health_service: Arc<HealthService<HP>>,
    path_prefix: &str,
) -> Router
where
    UR: UserRepository,
    HP: DatabaseProber,
{
    let state = AppState {
        auth_service,
        health_service,
    };

    let public_routes = Router::new()
        .route("/user/authentication", post(authenticate::<UR, HP>))
        .route(
            "/health_check/ping_application",
            get(ping_application::<UR, HP>),
        )
        .route("/health_check/ping_database", get(ping_database::<UR, HP>));

    let protected_routes = Router::new()
        .route("/user/me", get(get_me))
        .route("/health_check/ping_auth", get(ping_auth))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<UR, HP>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let v1 = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state);

    Router::new()
        .nest(&format!("{path_prefix}/v1"), v1)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
}
