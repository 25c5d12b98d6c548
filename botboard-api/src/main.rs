//! # Botboard API Server
//!
//! Internal dashboard that lets approved users trigger webhooks ("buttons")
//! routed to one or more registered "bots", gated by an owner-approval
//! registration workflow.
//!
//! ## Usage
//!
//! ```bash
//! OWNER_EMAIL=owner@example.com OWNER_PASSWORD='Own3r!Pass' cargo run -p botboard-api
//! ```

use botboard_api::app::{build_router, AppState};
use botboard_api::config::Config;
use botboard_shared::auth::credential::Argon2Credentials;
use botboard_shared::db::{bootstrap, migrations, pool};
use botboard_shared::dispatch::WebhookDispatcher;
use botboard_shared::notify::{LogMailer, MailSettings, Mailer, SmtpMailer};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "botboard_api=debug,botboard_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Botboard API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    // Database
    let db = pool::create_pool(&pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    migrations::run_migrations(&db).await?;

    // Owner account and default bot
    let credentials = Argon2Credentials;
    bootstrap::initialize(&db, &credentials, &config.owner.email, &config.owner.password).await?;

    // Notification sender
    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(SmtpMailer::new(MailSettings {
            smtp_host: mail.smtp_host.clone(),
            username: mail.username.clone(),
            password: mail.password.clone(),
            from: mail.from.clone(),
            approver: config.owner.email.clone(),
            base_url: config.server.public_url.clone(),
        })?),
        None => {
            tracing::warn!("SMTP not configured; notifications will be logged only");
            Arc::new(LogMailer)
        }
    };

    // Webhook dispatch engine
    let dispatcher = WebhookDispatcher::new(Duration::from_secs(config.webhook.timeout_seconds))?;

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer, dispatcher);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
