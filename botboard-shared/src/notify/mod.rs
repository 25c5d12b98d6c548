//! Email notification sender
//!
//! The registration workflow fires two notifications: an approval request to
//! the approver when a registration is submitted, and an approval result to
//! the registrant when it is decided. Both are fire-and-forget: the caller
//! logs a failure and moves on, it never rolls back state.
//!
//! Implementations:
//! - [`smtp::SmtpMailer`]: production delivery over SMTP
//! - [`LogMailer`]: records intent in the log when SMTP is not configured
//! - [`memory::MemoryMailer`]: captures messages for tests

use crate::models::user::Role;
use async_trait::async_trait;
use tracing::info;

pub mod memory;
pub mod smtp;

pub use memory::MemoryMailer;
pub use smtp::{MailSettings, SmtpMailer};

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Failed to build the message (bad address, template problem)
    #[error("Failed to build message: {0}")]
    Build(String),

    /// Failed to hand the message to the transport
    #[error("Failed to send message: {0}")]
    Transport(String),
}

/// Result of an approval decision, as communicated to the registrant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Registration approved with the granted role
    Approved(Role),

    /// Registration denied
    Denied,
}

/// Notification sender contract
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Asks the approver to review a new registration
    ///
    /// The message carries a review link embedding the approval token.
    async fn send_approval_request(
        &self,
        registrant_email: &str,
        token: &str,
    ) -> Result<(), MailError>;

    /// Tells the registrant how their registration was decided
    async fn send_approval_result(
        &self,
        registrant_email: &str,
        outcome: ApprovalOutcome,
    ) -> Result<(), MailError>;
}

/// Mailer used when no SMTP transport is configured
///
/// Logs what would have been sent so the workflow stays observable in
/// development.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_approval_request(
        &self,
        registrant_email: &str,
        token: &str,
    ) -> Result<(), MailError> {
        info!(
            registrant = registrant_email,
            token, "SMTP not configured; approval request not sent"
        );
        Ok(())
    }

    async fn send_approval_result(
        &self,
        registrant_email: &str,
        outcome: ApprovalOutcome,
    ) -> Result<(), MailError> {
        info!(
            registrant = registrant_email,
            ?outcome,
            "SMTP not configured; approval result not sent"
        );
        Ok(())
    }
}
