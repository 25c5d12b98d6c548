//! Server-side sessions and the request-scoped identity
//!
//! A session is keyed by an opaque random token carried in the
//! `botboard_session` cookie; the server side holds the payload. The
//! authenticated identity travels through a request as an explicit
//! [`AuthContext`] value injected into request extensions by the session
//! middleware, never as ambient state.
//!
//! Sessions expire 24 hours after login and are evicted lazily on lookup.
//! The store is in-memory: a restart logs everyone out, which is acceptable
//! for an internal tool.

use crate::auth::credential::{Credentials, TOKEN_BITS};
use crate::models::user::Role;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "botboard_session";

/// Session lifetime in hours
pub const SESSION_TTL_HOURS: i64 = 24;

/// Authenticated identity of the current request
///
/// Carried by parameter into the workflow and dispatch layers.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Authenticated user email
    pub email: String,

    /// Authenticated user role
    pub role: Role,
}

/// One server-side session record
#[derive(Debug, Clone)]
struct Session {
    context: AuthContext,
    created_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self) -> bool {
        Utc::now() - self.created_at > Duration::hours(SESSION_TTL_HOURS)
    }
}

/// In-memory session store
///
/// Cheap to clone; all clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session for an authenticated identity
    ///
    /// Returns the opaque session id to be set as the cookie value.
    pub async fn create(&self, credentials: &dyn Credentials, context: AuthContext) -> String {
        let id = credentials.random_token(TOKEN_BITS);

        let mut sessions = self.inner.write().await;
        sessions.insert(
            id.clone(),
            Session {
                context,
                created_at: Utc::now(),
            },
        );

        id
    }

    /// Resolves a session id to its identity
    ///
    /// Expired sessions are removed on lookup and treated as absent.
    pub async fn get(&self, id: &str) -> Option<AuthContext> {
        {
            let sessions = self.inner.read().await;
            match sessions.get(id) {
                Some(session) if !session.is_expired() => {
                    return Some(session.context.clone());
                }
                Some(_) => {} // expired, fall through to evict
                None => return None,
            }
        }

        debug!("Evicting expired session");
        self.inner.write().await.remove(id);
        None
    }

    /// Destroys a session
    ///
    /// Returns true if a session existed.
    pub async fn destroy(&self, id: &str) -> bool {
        self.inner.write().await.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credential::Argon2Credentials;

    fn context(email: &str, role: Role) -> AuthContext {
        AuthContext {
            user_id: 1,
            email: email.to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_get_destroy() {
        let store = SessionStore::new();
        let credentials = Argon2Credentials;

        let id = store
            .create(&credentials, context("user@example.com", Role::User))
            .await;
        assert_eq!(id.len(), 64);

        let resolved = store.get(&id).await.expect("session should resolve");
        assert_eq!(resolved.email, "user@example.com");
        assert_eq!(resolved.role, Role::User);

        assert!(store.destroy(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(!store.destroy(&id).await);
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.get("no-such-session").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let store = SessionStore::new();

        // Insert a session that is already past its TTL.
        store.inner.write().await.insert(
            "stale".to_string(),
            Session {
                context: context("old@example.com", Role::Admin),
                created_at: Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1),
            },
        );

        assert!(store.get("stale").await.is_none());
        assert!(store.inner.read().await.is_empty());
    }
}
