//! Session authentication endpoints
//!
//! - `GET /` - redirect to the dashboard or the login page
//! - `GET /login` - login page data (redirects if already logged in)
//! - `POST /login` - authenticate and set the session cookie
//! - `GET /logout` - destroy the session
//!
//! Login failures are reported with one uniform message so the response does
//! not reveal whether an email exists; the only distinct case is an account
//! still waiting for approval.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::{resolve_session, session_cookie_value},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use botboard_shared::auth::session::{AuthContext, SESSION_COOKIE, SESSION_TTL_HOURS};
use botboard_shared::models::user::{Role, User};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Authenticated user ID
    pub user_id: i64,

    /// Authenticated user email
    pub email: String,

    /// Authenticated user role
    pub role: Role,
}

/// Home: send the caller wherever their session state points
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if resolve_session(&state, &headers).await.is_some() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// Login page data
///
/// An already-authenticated caller is sent straight to the dashboard.
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if resolve_session(&state, &headers).await.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    Json(serde_json::json!({ "status": "login required" })).into_response()
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (same message)
/// - `403 Forbidden`: account exists but is pending approval
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !user.approved {
        return Err(ApiError::Forbidden(
            "Your account is pending approval".to_string(),
        ));
    }

    let valid = state
        .credentials
        .verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let context = AuthContext {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    let session_id = state
        .sessions
        .create(state.credentials.as_ref(), context)
        .await;

    info!(email = %user.email, role = %user.role, "User logged in");

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        SESSION_TTL_HOURS * 60 * 60
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid session cookie: {}", e)))?;

    let mut response = Json(LoginResponse {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
    .into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);

    Ok(response)
}

/// Logout endpoint
///
/// Destroys the server-side session, clears the cookie, and redirects to
/// the login page. Always succeeds, session or not.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session_id) = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(session_cookie_value)
    {
        state.sessions.destroy(session_id).await;
    }

    let clear_cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);

    (
        [(header::SET_COOKIE, clear_cookie)],
        Redirect::to("/login"),
    )
}
