//! In-memory mailer for tests
//!
//! Records every notification instead of sending it, and can be switched
//! into a failing mode to exercise the fire-and-forget error handling.

use super::{ApprovalOutcome, MailError, Mailer};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A recorded notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    ApprovalRequest {
        registrant_email: String,
        token: String,
    },
    ApprovalResult {
        registrant_email: String,
        outcome: ApprovalOutcome,
    },
}

/// Recording [`Mailer`] for tests
#[derive(Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryMailer {
    /// Creates an empty recording mailer
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of everything sent so far
    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    fn check_failing(&self) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(MailError::Transport("mailer set to failing".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send_approval_request(
        &self,
        registrant_email: &str,
        token: &str,
    ) -> Result<(), MailError> {
        self.check_failing()?;
        self.sent.lock().await.push(SentMail::ApprovalRequest {
            registrant_email: registrant_email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }

    async fn send_approval_result(
        &self,
        registrant_email: &str,
        outcome: ApprovalOutcome,
    ) -> Result<(), MailError> {
        self.check_failing()?;
        self.sent.lock().await.push(SentMail::ApprovalResult {
            registrant_email: registrant_email.to_string(),
            outcome,
        });
        Ok(())
    }
}
