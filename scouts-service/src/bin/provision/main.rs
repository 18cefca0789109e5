//! Account provisioning tool.
//!
//! There is no registration endpoint; accounts are created (or have their
//! password rotated) with this binary instead:
//!
//! ```text
//! provision <username> <password>
//! ```

use std::sync::Arc;

use anyhow::bail;
use scouts_service::config::Config;
use scouts_service::domain::user::service::UserService;
use scouts_service::outbound::repositories::PostgresUserRepository;
use scouts_service::user::models::CreateUserCommand;
use scouts_service::user::models::UpdateUserCommand;
use scouts_service::user::models::Username;
use scouts_service::user::ports::UserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scouts_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(username), Some(password)) = (args.next(), args.next()) else {
        bail!("Usage: provision <username> <password>");
    };

    let config = Config::load()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url())
        .await?;
    sqlx::migrate!("./migrations").run(&pg_pool).await?;

    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let service = UserService::new(Arc::clone(&repository));

    let username = Username::new(username)?;

    match repository.find_by_username(&username).await? {
        Some(user) => {
            service
                .update_user(
                    &user.id,
                    UpdateUserCommand {
                        username: None,
                        password: Some(password),
                    },
                )
                .await?;
            tracing::info!(username = %username, "Password updated for existing user");
        }
        None => {
            let user = service
                .create_user(CreateUserCommand { username, password })
                .await?;
            tracing::info!(id = %user.id, username = %user.username, "User created");
        }
    }

    Ok(())
}
