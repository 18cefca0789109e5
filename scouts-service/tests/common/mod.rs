use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use jsonwebtoken::Algorithm;
use scouts_service::domain::auth::service::AuthService;
use scouts_service::domain::health::ports::DatabaseProber;
use scouts_service::domain::health::ports::ProbeError;
use scouts_service::domain::health::service::HealthService;
use scouts_service::domain::user::service::UserService;
use scouts_service::inbound::http::router::create_router;
use scouts_service::user::errors::UserError;
use scouts_service::user::models::CreateUserCommand;
use scouts_service::user::models::User;
use scouts_service::user::models::UserId;
use scouts_service::user::models::Username;
use scouts_service::user::ports::UserRepository;
use tokio::sync::RwLock;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server on a random port, backed by
/// an in-memory user store and a toggleable database probe.
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub user_service: UserService<InMemoryUserRepository>,
    pub jwt_handler: JwtHandler,
    prober: Arc<StubProber>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let repository = Arc::new(InMemoryUserRepository::default());
        let prober = Arc::new(StubProber::new());

        let authenticator = Arc::new(Authenticator::new(JWT_SECRET, Algorithm::HS256));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&repository),
            authenticator,
            60,
        ));
        let health_service = Arc::new(HealthService::new(Arc::clone(&prober)));
        let user_service = UserService::new(Arc::clone(&repository));

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(auth_service, health_service, "/api");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            user_service,
            jwt_handler: JwtHandler::new(JWT_SECRET, Algorithm::HS256),
            prober,
        }
    }

    /// Provision a user directly through the domain service.
    pub async fn create_user(&self, username: &str, password: &str) -> User {
        self.user_service
            .create_user(CreateUserCommand {
                username: Username::new(username.to_string()).unwrap(),
                password: password.to_string(),
            })
            .await
            .expect("Failed to create user")
    }

    /// Flip the database probe between healthy and failing.
    pub fn set_database_healthy(&self, healthy: bool) {
        self.prober.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }
}

/// In-memory user store standing in for Postgres.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

/// Database probe toggled by tests.
pub struct StubProber {
    healthy: AtomicBool,
}

impl StubProber {
    fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl DatabaseProber for StubProber {
    async fn probe(&self) -> Result<(), ProbeError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProbeError("connection refused".to_string()))
        }
    }
}
