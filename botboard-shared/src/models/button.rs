//! Button model and database operations
//!
//! A button is a named, categorized trigger. Its `webhook_url` is the legacy
//! default target kept from before per-bot links existed; dispatch resolves
//! destinations through `bot_webhooks`. Visibility gates whether the lowest
//! privilege tier may trigger the button.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Who may see and trigger a button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Button model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Button {
    /// Unique button ID
    pub id: i64,

    /// Display title
    pub title: String,

    /// Grouping category shown on the dashboard
    pub category: String,

    /// Legacy default webhook target
    pub webhook_url: String,

    /// Visibility tier
    pub visibility: Visibility,

    /// User who created the button
    pub created_by: Option<i64>,

    /// When the button was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new button
#[derive(Debug, Clone)]
pub struct CreateButton {
    pub title: String,
    pub category: String,
    pub webhook_url: String,
    pub visibility: Visibility,
    pub created_by: Option<i64>,
}

impl Button {
    /// Creates a new button
    pub async fn create(pool: &SqlitePool, data: CreateButton) -> Result<Self, sqlx::Error> {
        let button = sqlx::query_as::<_, Button>(
            r#"
            INSERT INTO buttons (title, category, webhook_url, visibility, created_by)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, title, category, webhook_url, visibility, created_by, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.category)
        .bind(data.webhook_url)
        .bind(data.visibility)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(button)
    }

    /// Lists all buttons, ordered for dashboard grouping
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let buttons = sqlx::query_as::<_, Button>(
            r#"
            SELECT id, title, category, webhook_url, visibility, created_by, created_at
            FROM buttons
            ORDER BY category, title
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(buttons)
    }

    /// Lists public buttons only, ordered for dashboard grouping
    pub async fn list_public(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let buttons = sqlx::query_as::<_, Button>(
            r#"
            SELECT id, title, category, webhook_url, visibility, created_by, created_at
            FROM buttons
            WHERE visibility = 'public'
            ORDER BY category, title
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(buttons)
    }

    /// Finds a button by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let button = sqlx::query_as::<_, Button>(
            r#"
            SELECT id, title, category, webhook_url, visibility, created_by, created_at
            FROM buttons
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(button)
    }

    /// Lists distinct categories in use, ordered alphabetically
    ///
    /// Each category appears once regardless of how many buttons share it.
    pub async fn categories(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM buttons ORDER BY category",
        )
        .fetch_all(pool)
        .await?;

        Ok(categories)
    }

    /// Deletes a button by ID
    ///
    /// Bot webhook links for the button are removed by cascade.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM buttons WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::pool::{create_pool, DatabaseConfig};

    async fn test_pool() -> SqlitePool {
        let pool = create_pool(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn lighting_button(title: &str, visibility: Visibility) -> CreateButton {
        CreateButton {
            title: title.to_string(),
            category: "Lighting".to_string(),
            webhook_url: "http://example.com/hook".to_string(),
            visibility,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_public_listing_excludes_private() {
        let pool = test_pool().await;

        Button::create(&pool, lighting_button("Hall", Visibility::Public))
            .await
            .unwrap();
        Button::create(&pool, lighting_button("Vault", Visibility::Private))
            .await
            .unwrap();

        assert_eq!(Button::list(&pool).await.unwrap().len(), 2);

        let public = Button::list_public(&pool).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "Hall");
    }

    #[tokio::test]
    async fn test_categories_are_distinct() {
        let pool = test_pool().await;

        Button::create(&pool, lighting_button("Hall", Visibility::Public))
            .await
            .unwrap();
        Button::create(&pool, lighting_button("Garage", Visibility::Public))
            .await
            .unwrap();
        Button::create(
            &pool,
            CreateButton {
                category: "Audio".to_string(),
                ..lighting_button("Bell", Visibility::Public)
            },
        )
        .await
        .unwrap();

        let categories = Button::categories(&pool).await.unwrap();
        assert_eq!(categories, vec!["Audio".to_string(), "Lighting".to_string()]);
        assert_eq!(
            categories.iter().filter(|c| c.as_str() == "Lighting").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;

        let button = Button::create(&pool, lighting_button("Hall", Visibility::Public))
            .await
            .unwrap();

        assert!(Button::delete(&pool, button.id).await.unwrap());
        assert!(!Button::delete(&pool, button.id).await.unwrap());
        assert!(Button::find_by_id(&pool, button.id).await.unwrap().is_none());
    }
}
