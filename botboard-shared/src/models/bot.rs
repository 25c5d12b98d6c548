//! Bot model and database operations
//!
//! A bot is a named delivery target. Bots are auto-named "Bot N" in creation
//! order; "Bot 1" is ensured at startup so dispatch always has at least one
//! possible target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Name of the bot created at startup
pub const DEFAULT_BOT_NAME: &str = "Bot 1";

/// Bot model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bot {
    /// Unique bot ID
    pub id: i64,

    /// Display name ("Bot 1", "Bot 2", ...)
    pub name: String,

    /// User who created the bot
    pub created_by: Option<i64>,

    /// When the bot was created
    pub created_at: DateTime<Utc>,
}

impl Bot {
    /// Creates a new bot
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        created_by: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let bot = sqlx::query_as::<_, Bot>(
            r#"
            INSERT INTO bots (name, created_by)
            VALUES (?1, ?2)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(name)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(bot)
    }

    /// Lists all bots in creation order
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let bots = sqlx::query_as::<_, Bot>(
            r#"
            SELECT id, name, created_by, created_at
            FROM bots
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(bots)
    }

    /// Finds a bot by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let bot = sqlx::query_as::<_, Bot>(
            r#"
            SELECT id, name, created_by, created_at
            FROM bots
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(bot)
    }

    /// Returns the next auto-generated bot name ("Bot N")
    pub async fn next_default_name(pool: &SqlitePool) -> Result<String, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bots")
            .fetch_one(pool)
            .await?;

        Ok(format!("Bot {}", count + 1))
    }

    /// Ensures the default bot exists, creating it if missing
    pub async fn ensure_default(pool: &SqlitePool, created_by: i64) -> Result<Self, sqlx::Error> {
        let existing = sqlx::query_as::<_, Bot>(
            r#"
            SELECT id, name, created_by, created_at
            FROM bots
            WHERE name = ?1
            "#,
        )
        .bind(DEFAULT_BOT_NAME)
        .fetch_optional(pool)
        .await?;

        match existing {
            Some(bot) => Ok(bot),
            None => Self::create(pool, DEFAULT_BOT_NAME, Some(created_by)).await,
        }
    }

    /// Deletes a bot by ID
    ///
    /// Webhook links for the bot are removed by cascade.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bots WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
