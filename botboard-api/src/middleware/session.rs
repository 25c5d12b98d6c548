//! Session authentication middleware
//!
//! Resolves the session cookie into an [`AuthContext`] and injects it into
//! request extensions so handlers receive the caller's identity as an
//! explicit, request-scoped value. Requests without a valid session are
//! redirected to `/login`; role gates on top of that answer 403.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use botboard_shared::auth::session::{AuthContext, SESSION_COOKIE};
use botboard_shared::models::user::Role;

/// Session authentication layer
///
/// On success the request proceeds with an `AuthContext` extension; on a
/// missing or expired session the caller is redirected to the login page.
pub async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(context) = resolve_session(&state, req.headers()).await else {
        return Redirect::to("/login").into_response();
    };

    req.extensions_mut().insert(context);

    next.run(req).await
}

/// Role gate: admin or owner
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let context = current_context(&req)?;

    if context.role.can_manage() {
        Ok(next.run(req).await)
    } else {
        Err(ApiError::Forbidden(
            "Access denied. Insufficient permissions.".to_string(),
        ))
    }
}

/// Role gate: owner only
pub async fn require_owner(req: Request, next: Next) -> Result<Response, ApiError> {
    let context = current_context(&req)?;

    if context.role == Role::Owner {
        Ok(next.run(req).await)
    } else {
        Err(ApiError::Forbidden(
            "Access denied. Insufficient permissions.".to_string(),
        ))
    }
}

fn current_context(req: &Request) -> Result<&AuthContext, ApiError> {
    req.extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::Unauthorized("Missing session".to_string()))
}

/// Resolves a request's session cookie to an identity, if any
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<AuthContext> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let session_id = session_cookie_value(cookie_header)?;
    state.sessions.get(session_id).await
}

/// Extracts the session id from a Cookie header value
pub fn session_cookie_value(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|value| !value.is_empty())
}
