//! Dashboard endpoint
//!
//! `GET /dashboard?bot=<id|all>` returns the data the dashboard renders:
//! visible buttons grouped by category, the bot list, and webhook
//! annotations for the selected view. Admins and the owner see every button;
//! plain users only see public ones.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use botboard_shared::auth::session::AuthContext;
use botboard_shared::models::bot::Bot;
use botboard_shared::models::bot_webhook::BotWebhook;
use botboard_shared::models::button::{Button, Visibility};
use botboard_shared::models::user::Role;
use serde::{Deserialize, Serialize};

/// Dashboard query
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Bot selector: a bot id or "all" (default)
    pub bot: Option<String>,
}

/// Dashboard response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: DashboardUser,
    pub categories: Vec<CategoryGroup>,
    pub bots: Vec<BotSummary>,
    pub selected_bot: String,
    pub total_bots: usize,
}

/// Identity block rendered in the header
#[derive(Debug, Serialize)]
pub struct DashboardUser {
    pub email: String,
    pub role: Role,
}

/// Buttons sharing one category
#[derive(Debug, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub buttons: Vec<DashboardButton>,
}

/// One button with view-specific webhook annotations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardButton {
    pub id: i64,
    pub title: String,
    pub visibility: Visibility,

    /// This bot's webhook URL for the button (per-bot view only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_webhook_url: Option<String>,

    /// This bot's webhook link id (per-bot view only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_webhook_id: Option<i64>,

    /// Number of bots with a usable webhook for the button ("all" view only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_count: Option<usize>,

    /// Whether every bot has a usable webhook for the button ("all" view only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_all_webhooks: Option<bool>,
}

/// Bot summary for the selector
#[derive(Debug, Serialize)]
pub struct BotSummary {
    pub id: i64,
    pub name: String,
}

/// Dashboard handler
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let buttons = if context.role.can_manage() {
        Button::list(&state.db).await?
    } else {
        Button::list_public(&state.db).await?
    };

    let bots = Bot::list(&state.db).await?;
    let selected_bot = query.bot.unwrap_or_else(|| "all".to_string());

    // Annotate each button for the selected view, keeping its category so
    // the grouping pass below can fold the (category, title)-ordered list.
    let annotated: Vec<(String, DashboardButton)> = if selected_bot == "all" {
        let mut annotated = Vec::with_capacity(buttons.len());
        for button in buttons {
            let webhook_count = BotWebhook::list_configured_for_button(&state.db, button.id)
                .await?
                .len();
            annotated.push((
                button.category,
                DashboardButton {
                    id: button.id,
                    title: button.title,
                    visibility: button.visibility,
                    bot_webhook_url: None,
                    bot_webhook_id: None,
                    webhook_count: Some(webhook_count),
                    has_all_webhooks: Some(!bots.is_empty() && webhook_count == bots.len()),
                },
            ));
        }
        annotated
    } else {
        let bot_id: i64 = selected_bot
            .parse()
            .map_err(|_| ApiError::BadRequest("Invalid bot selector".to_string()))?;
        let links = BotWebhook::list_by_bot(&state.db, bot_id).await?;

        buttons
            .into_iter()
            .map(|button| {
                let link = links.iter().find(|l| l.button_id == button.id);
                (
                    button.category,
                    DashboardButton {
                        id: button.id,
                        title: button.title,
                        visibility: button.visibility,
                        bot_webhook_url: link.and_then(|l| l.webhook_url.clone()),
                        bot_webhook_id: link.map(|l| l.id),
                        webhook_count: None,
                        has_all_webhooks: None,
                    },
                )
            })
            .collect()
    };

    let mut categories: Vec<CategoryGroup> = Vec::new();
    for (category, button) in annotated {
        match categories.last_mut() {
            Some(group) if group.category == category => group.buttons.push(button),
            _ => categories.push(CategoryGroup {
                category,
                buttons: vec![button],
            }),
        }
    }

    Ok(Json(DashboardResponse {
        user: DashboardUser {
            email: context.email,
            role: context.role,
        },
        categories,
        bots: bots
            .iter()
            .map(|b| BotSummary {
                id: b.id,
                name: b.name.clone(),
            })
            .collect(),
        selected_bot,
        total_bots: bots.len(),
    }))
}
