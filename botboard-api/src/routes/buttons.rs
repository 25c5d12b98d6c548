//! Button management endpoints (admin or owner)
//!
//! - `GET /add-button` - existing categories for the form
//! - `POST /add-button` - create a button in an existing or new category

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use botboard_shared::auth::session::AuthContext;
use botboard_shared::models::button::{Button, CreateButton, Visibility};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Categories response
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

/// Add button request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddButtonRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// Existing category picked from the list
    pub category: Option<String>,

    /// Freshly typed category; wins over `category` when non-blank
    pub new_category: Option<String>,

    #[validate(length(min = 1, message = "Webhook URL is required"))]
    pub webhook_url: String,

    pub visibility: Visibility,
}

/// Add button response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddButtonResponse {
    pub success: bool,
    pub message: String,
    pub button_id: i64,
}

/// Lists categories already in use
pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = Button::categories(&state.db).await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// Creates a button
///
/// # Errors
///
/// - `422 Unprocessable Entity`: missing title, webhook URL, or category
pub async fn add_button(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Json(req): Json<AddButtonRequest>,
) -> ApiResult<Json<AddButtonResponse>> {
    req.validate()?;

    let category = req
        .new_category
        .filter(|c| !c.trim().is_empty())
        .or(req.category.filter(|c| !c.trim().is_empty()))
        .ok_or_else(|| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "category".to_string(),
                message: "Please select or create a category".to_string(),
            }])
        })?;

    let button = Button::create(
        &state.db,
        CreateButton {
            title: req.title.trim().to_string(),
            category: category.trim().to_string(),
            webhook_url: req.webhook_url.trim().to_string(),
            visibility: req.visibility,
            created_by: Some(context.user_id),
        },
    )
    .await?;

    info!(button = %button.title, category = %button.category, by = %context.email, "Button added");

    Ok(Json(AddButtonResponse {
        success: true,
        message: "Button added successfully!".to_string(),
        button_id: button.id,
    }))
}
