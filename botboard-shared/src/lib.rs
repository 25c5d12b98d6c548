//! # Botboard Shared Library
//!
//! This crate contains the models, business logic, and utilities used by the
//! Botboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Credential utilities and the session store
//! - `db`: Connection pool, migrations, and startup bootstrap
//! - `registration`: Pending-registration approval workflow
//! - `dispatch`: Button-to-bot webhook dispatch engine
//! - `notify`: Email notification sender

pub mod auth;
pub mod db;
pub mod dispatch;
pub mod models;
pub mod notify;
pub mod registration;

/// Current version of the Botboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
