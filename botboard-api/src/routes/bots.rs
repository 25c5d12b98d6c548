//! Bot management endpoints (admin or owner)
//!
//! - `POST /create-bot` - create the next auto-named bot
//! - `POST /update-bot-webhook` - set a (bot, button) webhook URL

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use botboard_shared::auth::session::AuthContext;
use botboard_shared::models::bot::Bot;
use botboard_shared::models::bot_webhook::BotWebhook;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Create bot response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBotResponse {
    pub success: bool,
    pub message: String,
    pub bot_id: i64,
    pub bot_name: String,
}

/// Update webhook request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBotWebhookRequest {
    pub bot_id: i64,
    pub button_id: i64,
    pub webhook_url: String,
}

/// Update webhook response
#[derive(Debug, Serialize)]
pub struct UpdateBotWebhookResponse {
    pub success: bool,
    pub message: String,
}

/// Creates the next bot ("Bot N")
pub async fn create_bot(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> ApiResult<Json<CreateBotResponse>> {
    let name = Bot::next_default_name(&state.db).await?;
    let bot = Bot::create(&state.db, &name, Some(context.user_id)).await?;

    info!(bot = %bot.name, by = %context.email, "Bot created");

    Ok(Json(CreateBotResponse {
        success: true,
        message: format!("{} created successfully!", bot.name),
        bot_id: bot.id,
        bot_name: bot.name,
    }))
}

/// Sets the webhook URL for a (bot, button) pair, replacing any previous one
///
/// # Errors
///
/// - `404 Not Found`: the referenced bot or button does not exist
pub async fn update_bot_webhook(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Json(req): Json<UpdateBotWebhookRequest>,
) -> ApiResult<Json<UpdateBotWebhookResponse>> {
    BotWebhook::upsert(&state.db, req.bot_id, req.button_id, req.webhook_url.trim()).await?;

    info!(
        bot_id = req.bot_id,
        button_id = req.button_id,
        by = %context.email,
        "Bot webhook updated"
    );

    Ok(Json(UpdateBotWebhookResponse {
        success: true,
        message: "Webhook updated successfully!".to_string(),
    }))
}
