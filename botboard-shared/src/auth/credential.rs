//! Credential and token utilities
//!
//! Password hashing and random token generation are cross-cutting concerns,
//! so they sit behind the narrow [`Credentials`] interface: `hash_password`,
//! `verify_password`, `random_token`. Callers depend on the trait, never on
//! the concrete algorithm.
//!
//! The production implementation is [`Argon2Credentials`]:
//!
//! - **Algorithm**: Argon2id
//! - **Memory**: 64 MB (65536 KB)
//! - **Iterations**: 3 passes
//! - **Parallelism**: 4 lanes
//! - **Output**: 32-byte hash
//!
//! Tokens are drawn from the OS RNG and hex-encoded, so a 256-bit token is
//! a 64-character string.
//!
//! # Example
//!
//! ```
//! use botboard_shared::auth::credential::{Argon2Credentials, Credentials, TOKEN_BITS};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Argon2Credentials;
//!
//! let hash = credentials.hash_password("super_secret_password_123")?;
//! assert!(credentials.verify_password("super_secret_password_123", &hash)?);
//! assert!(!credentials.verify_password("wrong_password", &hash)?);
//!
//! let token = credentials.random_token(TOKEN_BITS);
//! assert_eq!(token.len(), 64);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng as SaltRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use rand::{rngs::OsRng, RngCore};

/// Entropy of approval and session tokens, in bits
pub const TOKEN_BITS: usize = 256;

/// Special characters accepted by the password strength policy
pub const PASSWORD_SPECIAL_CHARS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    Verify(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Narrow capability interface for password and token handling
///
/// The workflow and session layers depend on this trait; the concrete
/// algorithm is an implementation detail and swappable.
pub trait Credentials: Send + Sync {
    /// Hashes a plaintext password into a self-describing digest
    fn hash_password(&self, plain: &str) -> Result<String, CredentialError>;

    /// Verifies a plaintext password against a digest
    fn verify_password(&self, plain: &str, digest: &str) -> Result<bool, CredentialError>;

    /// Generates an unguessable random token with at least `bits` of entropy
    fn random_token(&self, bits: usize) -> String;
}

/// Argon2id-backed implementation of [`Credentials`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Credentials;

impl Credentials for Argon2Credentials {
    fn hash_password(&self, plain: &str) -> Result<String, CredentialError> {
        // Salt from the OS RNG, parameters embedded in the PHC string.
        let salt = SaltString::generate(&mut SaltRng);

        let params = ParamsBuilder::new()
            .m_cost(65536) // 64 MB
            .t_cost(3)
            .p_cost(4)
            .output_len(32)
            .build()
            .map_err(|e| CredentialError::Hash(format!("Invalid parameters: {}", e)))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let password_hash = argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    fn verify_password(&self, plain: &str, digest: &str) -> Result<bool, CredentialError> {
        let parsed_hash = PasswordHash::new(digest)
            .map_err(|e| CredentialError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

        let argon2 = Argon2::default();

        match argon2.verify_password(plain.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::Verify(format!("Verification failed: {}", e))),
        }
    }

    fn random_token(&self, bits: usize) -> String {
        let mut bytes = vec![0u8; bits.div_ceil(8)];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Validates password strength
///
/// The policy requires:
/// - At least 8 characters
/// - At least one uppercase letter
/// - At least one lowercase letter
/// - At least one digit
/// - At least one of the special characters `@$!%*?&`
///
/// # Returns
///
/// `Ok(())` if the password is acceptable, `Err` with a description if not
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(&c)) {
        return Err(
            "Password must contain at least one special character (@$!%*?&)".to_string(),
        );
    }

    Ok(())
}
