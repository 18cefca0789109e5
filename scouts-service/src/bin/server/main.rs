use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use auth::Authenticator;
use jsonwebtoken::Algorithm;
use scouts_service::config::Config;
use scouts_service::domain::auth::service::AuthService;
use scouts_service::domain::health::service::HealthService;
use scouts_service::domain::notify::models::NotifyLevel;
use scouts_service::domain::notify::service::StatusNotifier;
use scouts_service::inbound::http::router::create_router;
use scouts_service::outbound::repositories::PostgresProber;
use scouts_service::outbound::repositories::PostgresUserRepository;
use scouts_service::outbound::telegram::TelegramBot;
use scouts_service::scheduler;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;

    let default_filter = if config.app.debug {
        "scouts_service=debug,tower_http=debug"
    } else {
        "scouts_service=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url())
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let algorithm = Algorithm::from_str(&config.jwt.algorithm)
        .with_context(|| format!("Unsupported JWT algorithm: {}", config.jwt.algorithm))?;
    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        algorithm,
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let prober = Arc::new(PostgresProber::new(pg_pool));

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        authenticator,
        config.jwt.expire_minutes,
    ));
    let health_service = Arc::new(HealthService::new(prober));

    let bot = Arc::new(TelegramBot::new(config.telegram.bot_token.clone()));
    let notifier = Arc::new(StatusNotifier::new(
        Arc::clone(&bot),
        config.telegram.error_chat_id.clone(),
    ));

    let address = format!("{}:{}", config.app.host, config.app.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, protocol = "http", "Http server listening");

    let application = create_router(auth_service, health_service, &config.app.path_prefix);
    let http_server = tokio::spawn(async move { axum::serve(listener, application).await });

    let jobs = scheduler::registrations(&config, Arc::clone(&notifier), bot)?;
    tracing::info!(jobs = jobs.len(), "Scheduler starting");
    let scheduler = tokio::spawn(scheduler::run(jobs, Arc::clone(&notifier)));

    match tokio::try_join!(http_server, scheduler) {
        Ok(_) => tracing::info!("Server exited"),
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            notifier
                .send_traceback_message_safe(
                    &format!("Service terminated unexpectedly: {e}"),
                    &format!("{e:?}"),
                    NotifyLevel::Error,
                )
                .await;
        }
    };

    Ok(())
}
