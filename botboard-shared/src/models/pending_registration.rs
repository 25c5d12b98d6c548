//! Pending registration model and database operations
//!
//! A pending registration is transient: it exists between form submission
//! and the owner's decision, addressed by a single-use random token.
//! Deleting by token is the consumption primitive: whichever decision
//! deletes the row first wins, and any later attempt simply finds nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A not-yet-approved account request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingRegistration {
    /// Unique record ID
    pub id: i64,

    /// Registrant email, unique among pending records
    pub email: String,

    /// Argon2id hash of the requested password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Single-use approval token (256 bits, hex-encoded)
    pub token: String,

    /// When the registration was (last) submitted
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a pending registration
#[derive(Debug, Clone)]
pub struct CreatePendingRegistration {
    pub email: String,
    pub password_hash: String,
    pub token: String,
}

impl PendingRegistration {
    /// Creates a pending registration, replacing any existing one for the
    /// same email
    ///
    /// Re-submission is an explicit upsert: the record keeps its id but gets
    /// a fresh password hash, a fresh token, and a refreshed timestamp. The
    /// previous token becomes permanently invalid.
    pub async fn upsert(
        pool: &SqlitePool,
        data: CreatePendingRegistration,
    ) -> Result<Self, sqlx::Error> {
        let pending = sqlx::query_as::<_, PendingRegistration>(
            r#"
            INSERT INTO pending_registrations (email, password_hash, token)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (email) DO UPDATE SET
                password_hash = excluded.password_hash,
                token = excluded.token,
                created_at = CURRENT_TIMESTAMP
            RETURNING id, email, password_hash, token, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.token)
        .fetch_one(pool)
        .await?;

        Ok(pending)
    }

    /// Finds a pending registration by email
    pub async fn find_by_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let pending = sqlx::query_as::<_, PendingRegistration>(
            r#"
            SELECT id, email, password_hash, token, created_at
            FROM pending_registrations
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(pending)
    }

    /// Finds a pending registration by token
    pub async fn find_by_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let pending = sqlx::query_as::<_, PendingRegistration>(
            r#"
            SELECT id, email, password_hash, token, created_at
            FROM pending_registrations
            WHERE token = ?1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(pending)
    }

    /// Consumes a pending registration by token
    ///
    /// Returns true if a record was deleted. Returns false when the token is
    /// unknown or was already consumed by a concurrent decision.
    pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pending_registrations WHERE token = ?1")
            .bind(token)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
