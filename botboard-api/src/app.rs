//! Application state and router builder
//!
//! # Router layout
//!
//! ```text
//! /
//! ├── GET  /                         # redirect to dashboard or login
//! ├── GET  /health                   # health check (public)
//! ├── GET/POST /login                # session login (public)
//! ├── GET/POST /register             # registration submission (public)
//! ├── authenticated
//! │   ├── GET  /dashboard            # buttons grouped by category
//! │   ├── GET  /logout
//! │   └── POST /trigger-webhook/:id  # webhook dispatch
//! ├── admin or owner
//! │   ├── GET/POST /add-button
//! │   ├── POST /create-bot
//! │   └── POST /update-bot-webhook
//! └── owner
//!     └── GET/POST /approve-registration
//! ```
//!
//! Middleware is applied per route group: the session layer resolves the
//! cookie into an `AuthContext` extension, and the role gates sit inside it.

use crate::config::Config;
use crate::middleware::session::{require_admin, require_owner, session_auth_layer};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use botboard_shared::auth::credential::{Argon2Credentials, Credentials};
use botboard_shared::auth::session::SessionStore;
use botboard_shared::dispatch::WebhookDispatcher;
use botboard_shared::notify::Mailer;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; everything
/// inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Server-side session store
    pub sessions: SessionStore,

    /// Password/token capability
    pub credentials: Arc<dyn Credentials>,

    /// Notification sender
    pub mailer: Arc<dyn Mailer>,

    /// Webhook dispatch engine
    pub dispatcher: WebhookDispatcher,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: SqlitePool,
        config: Config,
        mailer: Arc<dyn Mailer>,
        dispatcher: WebhookDispatcher,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions: SessionStore::new(),
            credentials: Arc::new(Argon2Credentials),
            mailer,
            dispatcher,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/", get(routes::auth::home))
        .route("/health", get(routes::health::health_check))
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route(
            "/register",
            get(routes::registration::register_page).post(routes::registration::register),
        );

    // Routes for any authenticated user
    let user_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route("/logout", get(routes::auth::logout))
        .route(
            "/trigger-webhook/:button_id",
            post(routes::trigger::trigger_webhook),
        )
        .layer(from_fn_with_state(state.clone(), session_auth_layer));

    // Routes requiring the admin or owner role
    let admin_routes = Router::new()
        .route(
            "/add-button",
            get(routes::buttons::categories).post(routes::buttons::add_button),
        )
        .route("/create-bot", post(routes::bots::create_bot))
        .route("/update-bot-webhook", post(routes::bots::update_bot_webhook))
        .layer(from_fn(require_admin))
        .layer(from_fn_with_state(state.clone(), session_auth_layer));

    // Routes requiring the owner role
    let owner_routes = Router::new()
        .route(
            "/approve-registration",
            get(routes::registration::review).post(routes::registration::decide),
        )
        .layer(from_fn(require_owner))
        .layer(from_fn_with_state(state.clone(), session_auth_layer));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .merge(owner_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
