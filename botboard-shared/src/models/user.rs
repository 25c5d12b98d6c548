//! User model and database operations
//!
//! Users are created two ways: the owner bootstrap at startup, or approval
//! of a pending registration. Accounts created through approval arrive with
//! `approved = true` and the role chosen by the approver; a user never picks
//! or escalates their own role.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     role TEXT NOT NULL DEFAULT 'user',
//!     approved BOOLEAN NOT NULL DEFAULT 0,
//!     created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;

/// Privilege tier of a user account
///
/// Stored as lowercase TEXT. `User` is the lowest tier and the only one
/// gated out of private buttons; `Admin` and `Owner` may manage buttons and
/// bots; only `Owner` decides registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Owner,
}

impl Role {
    /// Whether this role may manage buttons, bots, and webhook links.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin | Role::Owner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)] // Never expose the hash in API responses
    pub password_hash: String,

    /// Privilege tier
    pub role: Role,

    /// Whether the account may log in
    ///
    /// Set by the owner bootstrap or the approval transition.
    pub approved: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Privilege tier
    pub role: Role,

    /// Whether the account is already approved
    pub approved: bool,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint) or
    /// the database operation fails.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role, approved)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, email, password_hash, role, approved, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .bind(data.approved)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, approved, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, approved, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists accounts that have not been approved
    ///
    /// Accounts created through the registration workflow never appear here
    /// (approval creates them already approved); this surfaces accounts
    /// inserted by hand.
    pub async fn list_unapproved(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, approved, created_at
            FROM users
            WHERE approved = 0
            ORDER BY created_at
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user by email
    ///
    /// Returns true if a user was deleted.
    pub async fn delete_by_email(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?1")
            .bind(email)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
