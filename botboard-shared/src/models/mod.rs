//! Database models
//!
//! Each model owns its CRUD operations as associated async functions taking
//! the connection pool. Ids are SQLite `AUTOINCREMENT` integers.

pub mod bot;
pub mod bot_webhook;
pub mod button;
pub mod pending_registration;
pub mod user;
