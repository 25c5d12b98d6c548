//! Authentication utilities
//!
//! - `credential`: password hashing, verification, and random token
//!   generation behind a narrow swappable interface
//! - `session`: server-side session store and the request-scoped
//!   authenticated identity

pub mod credential;
pub mod session;
