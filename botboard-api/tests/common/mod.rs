//! Common test utilities for integration tests
//!
//! Provides shared infrastructure:
//! - In-memory database with migrations applied
//! - Owner bootstrap and seeded users/sessions
//! - A recording mailer
//! - A local webhook receiver for dispatch assertions
//! - Request helpers driving the router via `tower::Service`

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use botboard_api::app::{build_router, AppState};
use botboard_api::config::{
    Config, DatabaseConfig as ApiDatabaseConfig, OwnerConfig, ServerConfig, WebhookConfig,
};
use botboard_shared::auth::credential::Argon2Credentials;
use botboard_shared::auth::session::{AuthContext, SESSION_COOKIE};
use botboard_shared::db::{bootstrap, migrations, pool};
use botboard_shared::dispatch::WebhookDispatcher;
use botboard_shared::models::bot::Bot;
use botboard_shared::models::button::{Button, CreateButton, Visibility};
use botboard_shared::models::user::{CreateUser, Role, User};
use botboard_shared::notify::MemoryMailer;
use serde_json::Value;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::Service as _;

/// Password used for seeded users that log in through the endpoint
pub const OWNER_PASSWORD: &str = "Own3r!Pass";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub state: AppState,
    pub mailer: MemoryMailer,
    pub owner: User,
}

impl TestContext {
    /// Creates a new test context over a fresh in-memory database
    pub async fn new() -> anyhow::Result<Self> {
        let db = pool::create_pool(&pool::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await?;
        migrations::run_migrations(&db).await?;

        let credentials = Argon2Credentials;
        bootstrap::initialize(&db, &credentials, "owner@example.com", OWNER_PASSWORD).await?;
        let owner = User::find_by_email(&db, "owner@example.com")
            .await?
            .expect("owner should exist after bootstrap");

        let mailer = MemoryMailer::new();
        // Short timeout so the slow-endpoint tests settle quickly.
        let dispatcher = WebhookDispatcher::new(Duration::from_millis(500))?;

        let state = AppState::new(db.clone(), test_config(), Arc::new(mailer.clone()), dispatcher);
        let app = build_router(state.clone());

        Ok(TestContext {
            db,
            app,
            state,
            mailer,
            owner,
        })
    }

    /// Creates a user directly in the database
    ///
    /// The password hash is a placeholder; use the register/approve flow for
    /// accounts that must actually log in.
    pub async fn seed_user(&self, email: &str, role: Role, approved: bool) -> anyhow::Result<User> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: email.to_string(),
                password_hash: "test_hash".to_string(),
                role,
                approved,
            },
        )
        .await?;
        Ok(user)
    }

    /// Opens a session for a user, returning the Cookie header value
    pub async fn session_for(&self, user: &User) -> String {
        let id = self
            .state
            .sessions
            .create(
                self.state.credentials.as_ref(),
                AuthContext {
                    user_id: user.id,
                    email: user.email.clone(),
                    role: user.role,
                },
            )
            .await;
        format!("{}={}", SESSION_COOKIE, id)
    }

    /// Opens a session for the bootstrapped owner
    pub async fn owner_session(&self) -> String {
        let owner = self.owner.clone();
        self.session_for(&owner).await
    }

    /// Creates a button directly in the database
    pub async fn seed_button(&self, title: &str, visibility: Visibility) -> anyhow::Result<Button> {
        let button = Button::create(
            &self.db,
            CreateButton {
                title: title.to_string(),
                category: "Lighting".to_string(),
                webhook_url: "http://example.com/legacy".to_string(),
                visibility,
                created_by: Some(self.owner.id),
            },
        )
        .await?;
        Ok(button)
    }

    /// Looks up the default bot created by the bootstrap
    pub async fn default_bot(&self) -> anyhow::Result<Bot> {
        let bots = Bot::list(&self.db).await?;
        Ok(bots.into_iter().next().expect("default bot should exist"))
    }
}

/// Configuration used by tests; never read from the environment
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: "http://localhost:3000".to_string(),
        },
        database: ApiDatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        owner: OwnerConfig {
            email: "owner@example.com".to_string(),
            password: OWNER_PASSWORD.to_string(),
        },
        mail: None,
        webhook: WebhookConfig { timeout_seconds: 1 },
    }
}

/// Builds a request with optional session cookie and JSON body
pub fn request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

/// Sends a request through the router, returning the raw response
///
/// Use this when headers matter (Set-Cookie, Location).
pub async fn send_raw(ctx: &TestContext, req: Request<Body>) -> axum::response::Response {
    ctx.app
        .clone()
        .call(req)
        .await
        .expect("router call should not fail")
}

/// Sends a request through the router and parses the JSON response body
///
/// Returns `Value::Null` for empty bodies (e.g., redirects).
pub async fn send(ctx: &TestContext, req: Request<Body>) -> (StatusCode, Value) {
    let response = send_raw(ctx, req).await;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// State shared with the local webhook receiver
#[derive(Clone, Default)]
pub struct ReceiverState {
    pub hits: Arc<Mutex<Vec<Value>>>,
}

/// A local HTTP server standing in for webhook destinations
pub struct WebhookReceiver {
    pub addr: SocketAddr,
    pub hits: Arc<Mutex<Vec<Value>>>,
}

impl WebhookReceiver {
    /// URL of the recording endpoint
    pub fn hook_url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    /// URL of an endpoint that outlives the dispatcher's timeout
    pub fn slow_url(&self) -> String {
        format!("http://{}/slow", self.addr)
    }

    /// Snapshot of received payloads
    pub async fn hits(&self) -> Vec<Value> {
        self.hits.lock().await.clone()
    }
}

async fn record(State(state): State<ReceiverState>, Json(payload): Json<Value>) -> StatusCode {
    state.hits.lock().await.push(payload);
    StatusCode::OK
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

/// Starts a local webhook receiver on an ephemeral port
pub async fn start_receiver() -> anyhow::Result<WebhookReceiver> {
    let state = ReceiverState::default();
    let hits = state.hits.clone();

    let app = Router::new()
        .route("/hook", post(record))
        .route("/slow", post(slow))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(WebhookReceiver { addr, hits })
}
