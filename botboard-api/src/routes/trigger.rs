//! Webhook trigger endpoint
//!
//! `POST /trigger-webhook/:button_id` with `{"botId": "<id>" | "all"}`.
//!
//! The response tells the caller whether dispatch was attempted ("activated
//! for N bot(s)") or nothing was configured; individual delivery failures
//! are logged by the engine and never fail the request.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use botboard_shared::auth::session::AuthContext;
use botboard_shared::dispatch::{BotSelector, DispatchOutcome};
use serde::{Deserialize, Serialize};

/// Trigger request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRequest {
    /// A bot id or the sentinel "all"
    pub bot_id: String,
}

/// Trigger response
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    /// Whether dispatch was attempted for at least one destination
    pub success: bool,
    pub message: String,
}

/// Trigger handler
///
/// # Errors
///
/// - `400 Bad Request`: malformed bot selector
/// - `404 Not Found`: unknown button
/// - `403 Forbidden`: private button, `user`-role caller
pub async fn trigger_webhook(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(button_id): Path<i64>,
    Json(req): Json<TriggerRequest>,
) -> ApiResult<Json<TriggerResponse>> {
    let selector = BotSelector::parse(&req.bot_id)
        .ok_or_else(|| ApiError::BadRequest("Invalid bot selector".to_string()))?;

    let outcome = state
        .dispatcher
        .dispatch(&state.db, &context, button_id, selector)
        .await?;

    let response = match outcome {
        DispatchOutcome::Dispatched {
            button_title,
            attempted,
            deliveries,
        } => match selector {
            BotSelector::All => TriggerResponse {
                success: true,
                message: format!("Button \"{}\" activated for {} bot(s)!", button_title, attempted),
            },
            BotSelector::Bot(_) => {
                let bot_name = deliveries
                    .first()
                    .map(|d| d.bot_name.clone())
                    .unwrap_or_default();
                TriggerResponse {
                    success: true,
                    message: format!("Button \"{}\" activated for {}!", button_title, bot_name),
                }
            }
        },
        DispatchOutcome::NotConfigured { .. } => TriggerResponse {
            success: false,
            message: match selector {
                BotSelector::All => "No webhooks configured for this button".to_string(),
                BotSelector::Bot(_) => "Webhook not configured for this bot".to_string(),
            },
        },
    };

    Ok(Json(response))
}
