//! Registration approval workflow
//!
//! The lifecycle of an account request, keyed by email:
//!
//! ```text
//! no record --submit--> pending --approve--> User created (approved, role set)
//!                          |                 pending record deleted
//!                          |
//!                          +-----deny------> pending record deleted
//! ```
//!
//! Submitting again while pending *replaces* the record (new password hash,
//! new token, refreshed timestamp), so a registrant can always recover from a
//! lost approval email. Tokens are single-use: both decisions delete the
//! record, and any later decision on the same token finds nothing. That
//! delete-on-consume step is also what serializes concurrent decisions.
//!
//! Notifications are fire-and-forget: a mailer failure is logged and never
//! rolls back persisted state.

use crate::auth::credential::{validate_password_strength, CredentialError, Credentials, TOKEN_BITS};
use crate::models::pending_registration::{CreatePendingRegistration, PendingRegistration};
use crate::models::user::{Role, User};
use crate::notify::{ApprovalOutcome, Mailer};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Error type for the registration workflow
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// Malformed email or weak password
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Email already belongs to a user
    #[error("{0}")]
    Duplicate(String),

    /// Token does not match a pending registration
    #[error("{0}")]
    NotFound(String),

    /// Credential operation failed
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Database operation failed
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Approver's decision on a pending registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Create the account with the given role
    Approve { role: Role },

    /// Reject the request
    Deny,
}

/// What a decision did, for reporting back to the approver
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    /// Email of the (former) registrant
    pub email: String,

    /// How the registration was decided
    pub outcome: ApprovalOutcome,
}

/// Submits a registration request
///
/// Validates the email shape and password strength, rejects emails that
/// already belong to a user, and persists a pending record with a fresh
/// 256-bit token, replacing any existing pending record for the same email.
/// On success an approval request is sent to the approver; a send failure is
/// logged and does not undo the persisted record.
///
/// # Errors
///
/// - [`RegistrationError::Validation`]: malformed email or weak password
/// - [`RegistrationError::Duplicate`]: email already registered (including
///   losing a concurrent-registration race on the unique constraint)
pub async fn submit(
    pool: &SqlitePool,
    credentials: &dyn Credentials,
    mailer: &dyn Mailer,
    email: &str,
    password: &str,
) -> Result<PendingRegistration, RegistrationError> {
    let email = email.trim();

    if !is_valid_email(email) {
        return Err(RegistrationError::Validation {
            field: "email",
            message: "Invalid email format".to_string(),
        });
    }

    validate_password_strength(password).map_err(|message| RegistrationError::Validation {
        field: "password",
        message,
    })?;

    if User::find_by_email(pool, email).await?.is_some() {
        return Err(RegistrationError::Duplicate(
            "Email already registered".to_string(),
        ));
    }

    let token = credentials.random_token(TOKEN_BITS);
    let password_hash = credentials.hash_password(password)?;

    let pending = match PendingRegistration::upsert(
        pool,
        CreatePendingRegistration {
            email: email.to_string(),
            password_hash,
            token,
        },
    )
    .await
    {
        Ok(pending) => pending,
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(RegistrationError::Duplicate(
                "A registration for this email already exists".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = mailer
        .send_approval_request(&pending.email, &pending.token)
        .await
    {
        warn!(email = %pending.email, error = %err, "Approval request notification failed");
    }

    info!(email = %pending.email, "Registration submitted, awaiting approval");
    Ok(pending)
}

/// Decides a pending registration by token
///
/// Approval creates the user (stored hash, approver-chosen role,
/// approved=true) and deletes the pending record in one transaction, then
/// notifies the registrant. Denial deletes the record and notifies. Either
/// way the token is consumed; replaying it yields
/// [`RegistrationError::NotFound`].
pub async fn decide(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    token: &str,
    decision: Decision,
) -> Result<DecisionOutcome, RegistrationError> {
    let not_found =
        || RegistrationError::NotFound("Registration request not found or already processed".to_string());

    let pending = PendingRegistration::find_by_token(pool, token)
        .await?
        .ok_or_else(not_found)?;

    let outcome = match decision {
        Decision::Approve { role } => {
            let mut tx = pool.begin().await?;

            let insert = sqlx::query(
                r#"
                INSERT INTO users (email, password_hash, role, approved)
                VALUES (?1, ?2, ?3, 1)
                "#,
            )
            .bind(&pending.email)
            .bind(&pending.password_hash)
            .bind(role)
            .execute(&mut *tx)
            .await;

            if let Err(sqlx::Error::Database(db_err)) = &insert {
                if db_err.is_unique_violation() {
                    return Err(RegistrationError::Duplicate(
                        "Email already registered".to_string(),
                    ));
                }
            }
            insert?;

            let deleted = sqlx::query("DELETE FROM pending_registrations WHERE token = ?1")
                .bind(token)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            if deleted == 0 {
                // A concurrent decision consumed the token between the lookup
                // and this transaction; yield to it.
                tx.rollback().await?;
                return Err(not_found());
            }

            tx.commit().await?;

            info!(email = %pending.email, %role, "Registration approved");
            ApprovalOutcome::Approved(role)
        }
        Decision::Deny => {
            if !PendingRegistration::delete_by_token(pool, token).await? {
                return Err(not_found());
            }

            info!(email = %pending.email, "Registration denied");
            ApprovalOutcome::Denied
        }
    };

    if let Err(err) = mailer.send_approval_result(&pending.email, outcome).await {
        warn!(email = %pending.email, error = %err, "Approval result notification failed");
    }

    Ok(DecisionOutcome {
        email: pending.email,
        outcome,
    })
}

/// Checks the basic shape of an email address
///
/// Mirrors the form-level rule: one `@`, a non-blank local part, and a domain
/// with a dot separating non-empty labels. Real validation happens when the
/// approval email arrives (or doesn't).
pub fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
