//! Bot webhook link model and database operations
//!
//! A `BotWebhook` row is the per-(bot, button) override URL. At most one row
//! exists per pair (UNIQUE constraint); a missing row means "not configured"
//! for that pair, which is distinct from a row holding an empty URL. Rows
//! cascade-delete with either parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Webhook link between one bot and one button
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BotWebhook {
    /// Unique link ID
    pub id: i64,

    /// Bot this link belongs to
    pub bot_id: i64,

    /// Button this link belongs to
    pub button_id: i64,

    /// Destination URL; None or blank means not configured
    pub webhook_url: Option<String>,

    /// When the link was created
    pub created_at: DateTime<Utc>,
}

/// A webhook link joined with its bot's name, filtered to usable URLs
///
/// This is the row shape the dispatch engine fans out over.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConfiguredWebhook {
    pub id: i64,
    pub bot_id: i64,
    pub button_id: i64,
    pub webhook_url: String,
    pub bot_name: String,
}

impl BotWebhook {
    /// Creates or replaces the webhook URL for a (bot, button) pair
    ///
    /// The UNIQUE(bot_id, button_id) constraint makes this an upsert: an
    /// existing link keeps its id and gets the new URL.
    pub async fn upsert(
        pool: &SqlitePool,
        bot_id: i64,
        button_id: i64,
        webhook_url: &str,
    ) -> Result<Self, sqlx::Error> {
        let link = sqlx::query_as::<_, BotWebhook>(
            r#"
            INSERT INTO bot_webhooks (bot_id, button_id, webhook_url)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (bot_id, button_id) DO UPDATE SET webhook_url = excluded.webhook_url
            RETURNING id, bot_id, button_id, webhook_url, created_at
            "#,
        )
        .bind(bot_id)
        .bind(button_id)
        .bind(webhook_url)
        .fetch_one(pool)
        .await?;

        Ok(link)
    }

    /// Finds the unique link for a (bot, button) pair
    pub async fn find_by_bot_and_button(
        pool: &SqlitePool,
        bot_id: i64,
        button_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let link = sqlx::query_as::<_, BotWebhook>(
            r#"
            SELECT id, bot_id, button_id, webhook_url, created_at
            FROM bot_webhooks
            WHERE bot_id = ?1 AND button_id = ?2
            "#,
        )
        .bind(bot_id)
        .bind(button_id)
        .fetch_optional(pool)
        .await?;

        Ok(link)
    }

    /// Lists all links for a bot
    pub async fn list_by_bot(pool: &SqlitePool, bot_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let links = sqlx::query_as::<_, BotWebhook>(
            r#"
            SELECT id, bot_id, button_id, webhook_url, created_at
            FROM bot_webhooks
            WHERE bot_id = ?1
            "#,
        )
        .bind(bot_id)
        .fetch_all(pool)
        .await?;

        Ok(links)
    }

    /// Lists all links for a button
    pub async fn list_by_button(
        pool: &SqlitePool,
        button_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let links = sqlx::query_as::<_, BotWebhook>(
            r#"
            SELECT id, bot_id, button_id, webhook_url, created_at
            FROM bot_webhooks
            WHERE button_id = ?1
            "#,
        )
        .bind(button_id)
        .fetch_all(pool)
        .await?;

        Ok(links)
    }

    /// Lists dispatchable links for a button, joined with the bot name
    ///
    /// Only links with a non-blank URL are returned; an empty result means
    /// "no webhooks configured" for the button.
    pub async fn list_configured_for_button(
        pool: &SqlitePool,
        button_id: i64,
    ) -> Result<Vec<ConfiguredWebhook>, sqlx::Error> {
        let links = sqlx::query_as::<_, ConfiguredWebhook>(
            r#"
            SELECT bw.id, bw.bot_id, bw.button_id, bw.webhook_url, b.name AS bot_name
            FROM bot_webhooks bw
            JOIN bots b ON bw.bot_id = b.id
            WHERE bw.button_id = ?1
              AND bw.webhook_url IS NOT NULL
              AND TRIM(bw.webhook_url) != ''
            ORDER BY bw.bot_id
            "#,
        )
        .bind(button_id)
        .fetch_all(pool)
        .await?;

        Ok(links)
    }

    /// Deletes the link for a (bot, button) pair
    pub async fn delete(
        pool: &SqlitePool,
        bot_id: i64,
        button_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bot_webhooks WHERE bot_id = ?1 AND button_id = ?2")
            .bind(bot_id)
            .bind(button_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
