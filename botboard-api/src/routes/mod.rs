//! API route handlers

pub mod auth;
pub mod bots;
pub mod buttons;
pub mod dashboard;
pub mod health;
pub mod registration;
pub mod trigger;
