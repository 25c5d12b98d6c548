//! Button-to-bot webhook dispatch engine
//!
//! Resolves a triggered button (plus a bot selector) to one or more
//! destination URLs and delivers a JSON payload to each. The interesting
//! part is failure isolation: fan-out to "all" issues every call
//! concurrently and waits for every outcome, a settle-all join rather than a
//! fail-fast one, so one dead endpoint cannot block delivery to the others.
//!
//! A delivery failure is data, not an error: the caller learns that dispatch
//! was *attempted* (or that nothing was configured), and per-destination
//! failures are captured in the outcome and logged. This holds on both the
//! single-bot and the all-bots path.

use crate::auth::session::AuthContext;
use crate::models::bot::Bot;
use crate::models::bot_webhook::BotWebhook;
use crate::models::button::{Button, Visibility};
use crate::models::user::Role;
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-destination delivery timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for dispatch
///
/// Delivery failures are deliberately absent: they are captured per
/// destination inside [`DispatchOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Button id does not resolve to a button
    #[error("Button not found: {0}")]
    ButtonNotFound(i64),

    /// Bot id does not resolve to a bot
    #[error("Bot not found: {0}")]
    BotNotFound(i64),

    /// Private button triggered by the lowest privilege tier
    #[error("Access denied")]
    Forbidden,

    /// Database operation failed
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Which bot(s) a trigger is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotSelector {
    /// Every bot with a configured webhook for the button
    All,

    /// One specific bot
    Bot(i64),
}

impl BotSelector {
    /// Parses the wire form: the sentinel "all" or a numeric bot id
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == "all" {
            Some(BotSelector::All)
        } else {
            raw.parse().ok().map(BotSelector::Bot)
        }
    }
}

/// JSON body POSTed to each destination
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayload {
    pub button_id: i64,
    pub button_title: String,
    /// Email of the user who pressed the button
    pub triggered_by: String,
    /// ISO-8601 timestamp, shared by every destination of one trigger
    pub timestamp: String,
    pub bot_name: String,
    pub bot_id: i64,
}

/// What happened to one destination
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub bot_id: i64,
    pub bot_name: String,

    /// Whether the destination acknowledged with a success status
    pub delivered: bool,

    /// Transport or status error, when delivery failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of a trigger
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Dispatch was attempted for at least one destination
    ///
    /// Individual deliveries may still have failed; see `deliveries`.
    Dispatched {
        button_title: String,
        attempted: usize,
        deliveries: Vec<DeliveryOutcome>,
    },

    /// No webhook configured for the selection; no calls were made
    NotConfigured { button_title: String },
}

/// Webhook dispatcher with a fixed per-call timeout
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    http: reqwest::Client,
}

impl WebhookDispatcher {
    /// Creates a dispatcher whose outbound calls time out independently
    /// after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Resolves and triggers a button for the selected bot(s)
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ButtonNotFound`]: unknown button id
    /// - [`DispatchError::Forbidden`]: private button, `user`-role caller
    ///
    /// Network-level delivery failures are NOT errors; they are reported
    /// inside the returned [`DispatchOutcome`].
    pub async fn dispatch(
        &self,
        pool: &SqlitePool,
        caller: &AuthContext,
        button_id: i64,
        selector: BotSelector,
    ) -> Result<DispatchOutcome, DispatchError> {
        let button = Button::find_by_id(pool, button_id)
            .await?
            .ok_or(DispatchError::ButtonNotFound(button_id))?;

        if button.visibility == Visibility::Private && caller.role == Role::User {
            return Err(DispatchError::Forbidden);
        }

        match selector {
            BotSelector::All => self.dispatch_all(pool, caller, &button).await,
            BotSelector::Bot(bot_id) => self.dispatch_one(pool, caller, &button, bot_id).await,
        }
    }

    /// Fans out to every configured destination for the button
    async fn dispatch_all(
        &self,
        pool: &SqlitePool,
        caller: &AuthContext,
        button: &Button,
    ) -> Result<DispatchOutcome, DispatchError> {
        let webhooks = BotWebhook::list_configured_for_button(pool, button.id).await?;

        if webhooks.is_empty() {
            debug!(button = %button.title, "No webhooks configured, nothing to dispatch");
            return Ok(DispatchOutcome::NotConfigured {
                button_title: button.title.clone(),
            });
        }

        let attempted = webhooks.len();
        let timestamp = Utc::now().to_rfc3339();

        let deliveries = join_all(webhooks.into_iter().map(|webhook| {
            let payload = TriggerPayload {
                button_id: button.id,
                button_title: button.title.clone(),
                triggered_by: caller.email.clone(),
                timestamp: timestamp.clone(),
                bot_name: webhook.bot_name.clone(),
                bot_id: webhook.bot_id,
            };
            self.deliver(webhook.bot_id, webhook.bot_name, webhook.webhook_url, payload)
        }))
        .await;

        Ok(DispatchOutcome::Dispatched {
            button_title: button.title.clone(),
            attempted,
            deliveries,
        })
    }

    /// Delivers to the single (bot, button) destination, if configured
    async fn dispatch_one(
        &self,
        pool: &SqlitePool,
        caller: &AuthContext,
        button: &Button,
        bot_id: i64,
    ) -> Result<DispatchOutcome, DispatchError> {
        let link = BotWebhook::find_by_bot_and_button(pool, bot_id, button.id).await?;

        let url = match link
            .and_then(|l| l.webhook_url)
            .filter(|u| !u.trim().is_empty())
        {
            Some(url) => url,
            None => {
                debug!(button = %button.title, bot_id, "Webhook not configured for this bot");
                return Ok(DispatchOutcome::NotConfigured {
                    button_title: button.title.clone(),
                });
            }
        };

        let bot = Bot::find_by_id(pool, bot_id)
            .await?
            .ok_or(DispatchError::BotNotFound(bot_id))?;

        let payload = TriggerPayload {
            button_id: button.id,
            button_title: button.title.clone(),
            triggered_by: caller.email.clone(),
            timestamp: Utc::now().to_rfc3339(),
            bot_name: bot.name.clone(),
            bot_id: bot.id,
        };

        let delivery = self.deliver(bot.id, bot.name, url, payload).await;

        Ok(DispatchOutcome::Dispatched {
            button_title: button.title.clone(),
            attempted: 1,
            deliveries: vec![delivery],
        })
    }

    /// Performs one outbound POST, capturing failure instead of raising it
    async fn deliver(
        &self,
        bot_id: i64,
        bot_name: String,
        url: String,
        payload: TriggerPayload,
    ) -> DeliveryOutcome {
        let result = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                debug!(bot = %bot_name, url = %url, "Webhook delivered");
                DeliveryOutcome {
                    bot_id,
                    bot_name,
                    delivered: true,
                    error: None,
                }
            }
            Err(err) => {
                warn!(bot = %bot_name, url = %url, error = %err, "Webhook delivery failed");
                DeliveryOutcome {
                    bot_id,
                    bot_name,
                    delivered: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_selector_parse() {
        assert_eq!(BotSelector::parse("all"), Some(BotSelector::All));
        assert_eq!(BotSelector::parse("7"), Some(BotSelector::Bot(7)));
        assert_eq!(BotSelector::parse(""), None);
        assert_eq!(BotSelector::parse("seven"), None);
        assert_eq!(BotSelector::parse("ALL"), None);
    }

    #[test]
    fn test_payload_uses_camel_case_keys() {
        let payload = TriggerPayload {
            button_id: 3,
            button_title: "Hall".to_string(),
            triggered_by: "user@example.com".to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
            bot_name: "Bot 1".to_string(),
            bot_id: 1,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["buttonId"], 3);
        assert_eq!(json["buttonTitle"], "Hall");
        assert_eq!(json["triggeredBy"], "user@example.com");
        assert_eq!(json["botName"], "Bot 1");
        assert_eq!(json["botId"], 1);
        assert!(json.get("button_id").is_none());
    }
}
