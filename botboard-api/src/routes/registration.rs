//! Registration and approval endpoints
//!
//! - `GET /register` - registration page data
//! - `POST /register` - submit a registration request
//! - `GET /approve-registration?token=` - pending request summary (owner)
//! - `POST /approve-registration` - approve or deny a request (owner)
//!
//! Viewing the approval page does not consume the token; only a decision
//! does. The role is chosen by the owner at decision time.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Json,
};
use botboard_shared::models::pending_registration::PendingRegistration;
use botboard_shared::models::user::Role;
use botboard_shared::notify::ApprovalOutcome;
use botboard_shared::registration::{self, Decision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Requested password (validated against the strength policy)
    pub password: String,

    /// Must match `password`
    pub confirm_password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
}

/// Approval page query
#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub token: Option<String>,
}

/// Approval page data
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub email: String,
    pub token: String,
    pub submitted_at: DateTime<Utc>,
}

/// Decision request
#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub token: String,
    pub action: DecideAction,
    pub role: Option<Role>,
}

/// Decision action
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecideAction {
    Approve,
    Deny,
}

/// Decision response
#[derive(Debug, Serialize)]
pub struct DecideResponse {
    pub success: bool,
    pub message: String,
}

/// Registration page data
pub async fn register_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "registration open" }))
}

/// Submit a registration request
///
/// # Errors
///
/// - `422 Unprocessable Entity`: malformed email, weak password, or
///   password/confirmation mismatch
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate()?;

    if req.password != req.confirm_password {
        return Err(ApiError::ValidationError(vec![
            crate::error::ValidationErrorDetail {
                field: "confirmPassword".to_string(),
                message: "Passwords do not match".to_string(),
            },
        ]));
    }

    registration::submit(
        &state.db,
        state.credentials.as_ref(),
        state.mailer.as_ref(),
        &req.email,
        &req.password,
    )
    .await?;

    Ok(Json(RegisterResponse {
        success: true,
        message: "Registration submitted! Please wait for owner approval. \
                  You will receive an email notification."
            .to_string(),
    }))
}

/// Pending request summary for the approval page
///
/// # Errors
///
/// - `400 Bad Request`: missing token parameter
/// - `404 Not Found`: unknown or already-consumed token
pub async fn review(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Json<ReviewResponse>> {
    let token = query
        .token
        .ok_or_else(|| ApiError::BadRequest("Invalid approval link".to_string()))?;

    let pending = PendingRegistration::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("Registration request not found or already processed".to_string())
        })?;

    Ok(Json(ReviewResponse {
        email: pending.email,
        token: pending.token,
        submitted_at: pending.created_at,
    }))
}

/// Approve or deny a pending registration
///
/// # Errors
///
/// - `400 Bad Request`: approve without a role
/// - `404 Not Found`: unknown or already-consumed token
pub async fn decide(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> ApiResult<Json<DecideResponse>> {
    let decision = match req.action {
        DecideAction::Approve => Decision::Approve {
            role: req
                .role
                .ok_or_else(|| ApiError::BadRequest("A role is required to approve".to_string()))?,
        },
        DecideAction::Deny => Decision::Deny,
    };

    let outcome =
        registration::decide(&state.db, state.mailer.as_ref(), &req.token, decision).await?;

    let message = match outcome.outcome {
        ApprovalOutcome::Approved(role) => {
            format!("User {} has been approved with role: {}", outcome.email, role)
        }
        ApprovalOutcome::Denied => {
            format!("Registration for {} has been denied", outcome.email)
        }
    };

    Ok(Json(DecideResponse {
        success: true,
        message,
    }))
}
