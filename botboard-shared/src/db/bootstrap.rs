//! Startup data bootstrap
//!
//! Ensures the fixed records the application expects are present before the
//! server starts accepting requests: the single owner account and the
//! default "Bot 1" delivery target. Both operations are idempotent so
//! restarts are safe.

use crate::auth::credential::Credentials;
use crate::models::bot::Bot;
use crate::models::user::{CreateUser, Role, User};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Ensures the owner account and the default bot exist.
pub async fn initialize(
    pool: &SqlitePool,
    credentials: &dyn Credentials,
    owner_email: &str,
    owner_password: &str,
) -> anyhow::Result<()> {
    let owner = ensure_owner_account(pool, credentials, owner_email, owner_password).await?;
    Bot::ensure_default(pool, owner.id).await?;
    Ok(())
}

/// Creates the owner account if no user with the given email exists.
///
/// The owner is created pre-approved with the `owner` role. An existing
/// account is returned as-is; in particular its password is not reset.
pub async fn ensure_owner_account(
    pool: &SqlitePool,
    credentials: &dyn Credentials,
    email: &str,
    password: &str,
) -> anyhow::Result<User> {
    if let Some(existing) = User::find_by_email(pool, email).await? {
        debug!(email, "Owner account already exists");
        return Ok(existing);
    }

    let password_hash = credentials.hash_password(password)?;
    let owner = User::create(
        pool,
        CreateUser {
            email: email.to_string(),
            password_hash,
            role: Role::Owner,
            approved: true,
        },
    )
    .await?;

    info!(email, "Owner account created");
    Ok(owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credential::Argon2Credentials;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::{create_pool, DatabaseConfig};

    async fn test_pool() -> SqlitePool {
        let pool = create_pool(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .expect("pool should open");
        run_migrations(&pool).await.expect("migrations should apply");
        pool
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = test_pool().await;
        let credentials = Argon2Credentials;

        initialize(&pool, &credentials, "owner@example.com", "Own3r!Pass")
            .await
            .expect("first initialize should succeed");
        initialize(&pool, &credentials, "owner@example.com", "Own3r!Pass")
            .await
            .expect("second initialize should succeed");

        let owner = User::find_by_email(&pool, "owner@example.com")
            .await
            .unwrap()
            .expect("owner should exist");
        assert_eq!(owner.role, Role::Owner);
        assert!(owner.approved);

        let bots = Bot::list(&pool).await.unwrap();
        assert_eq!(bots.len(), 1);
        assert_eq!(bots[0].name, "Bot 1");
    }
}
