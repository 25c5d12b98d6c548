//! SMTP notification transport
//!
//! Sends the approval-request and approval-result templates over an
//! authenticated SMTP relay (STARTTLS, port 587).

use super::{ApprovalOutcome, MailError, Mailer};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials as SmtpCredentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

/// SMTP and addressing configuration for the mailer
#[derive(Debug, Clone)]
pub struct MailSettings {
    /// SMTP relay host (e.g., "smtp.gmail.com")
    pub smtp_host: String,

    /// Username for SMTP authentication
    pub username: String,

    /// Password for SMTP authentication
    pub password: String,

    /// From address for all notifications
    pub from: String,

    /// Approver address; receives approval requests
    pub approver: String,

    /// Public base URL used to build review links
    pub base_url: String,
}

/// Production [`Mailer`] over lettre's async SMTP transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    settings: MailSettings,
}

impl SmtpMailer {
    /// Creates a mailer from settings
    ///
    /// # Errors
    ///
    /// Returns an error if the relay host is not a valid SMTP target.
    pub fn new(settings: MailSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .credentials(SmtpCredentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport, settings })
    }

    /// Builds the review link for an approval token
    fn approval_link(&self, token: &str) -> String {
        format!(
            "{}/approve-registration?token={}",
            self.settings.base_url.trim_end_matches('/'),
            token
        )
    }

    async fn deliver(&self, to: &str, subject: &str, html: String) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.settings
                    .from
                    .parse()
                    .map_err(|e| MailError::Build(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::Build(format!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!(to, subject, "Notification sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_approval_request(
        &self,
        registrant_email: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.approval_link(token);
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px;\">\
             <h2>Botboard - Registration Request</h2>\
             <p>A new user has registered and requires your approval:</p>\
             <p><strong>Email:</strong> {registrant_email}</p>\
             <p><a href=\"{link}\">Review Registration Request</a></p>\
             <p style=\"color: #666; font-size: 12px;\">\
             If the link doesn't work, copy and paste it into your browser:<br>{link}</p>\
             </div>"
        );

        self.deliver(
            &self.settings.approver,
            "New User Registration Approval Required",
            html,
        )
        .await
    }

    async fn send_approval_result(
        &self,
        registrant_email: &str,
        outcome: ApprovalOutcome,
    ) -> Result<(), MailError> {
        let (subject, body) = match outcome {
            ApprovalOutcome::Approved(role) => (
                "Botboard - Registration Approved",
                format!(
                    "Your registration has been approved! You have been assigned the role: \
                     <strong>{role}</strong>. You can now log in at {}/login.",
                    self.settings.base_url.trim_end_matches('/')
                ),
            ),
            ApprovalOutcome::Denied => (
                "Botboard - Registration Denied",
                "Your registration request has been denied. Please contact the administrator \
                 for more information."
                    .to_string(),
            ),
        };

        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px;\">\
             <h2>Botboard</h2><p>{body}</p></div>"
        );

        self.deliver(registrant_email, subject, html).await
    }
}
