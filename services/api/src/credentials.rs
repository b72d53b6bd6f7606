//! Credential and token primitives: password hashing, OTP generation and
//! digests, session bearer-token generation and digests. Pure functions,
//! no state.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::domain::types::OTP_LENGTH;
use crate::error::ApiError;

/// Charset for session bearer tokens (URL-safe base64 alphabet).
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Session token length in characters. 43 symbols over a 64-symbol charset
/// gives 258 bits of entropy.
const TOKEN_LEN: usize = 43;

/// Hash a password with Argon2id (PHC string format, default cost params).
/// A hashing failure is fatal — there is no user-facing error path here.
pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hash: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
/// A malformed stored hash is corrupted data, not a wrong password.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid stored password hash: {e}")))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Internal(anyhow::anyhow!("password verify: {e}"))),
    }
}

/// Generate a uniform 6-digit numeric OTP. The range bounds enforce the
/// fixed width — no zero-padding involved.
pub fn generate_otp() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000..1_000_000u32).to_string()
}

/// SHA-256 hex digest of an OTP code. Not timing-safe, but a low-value
/// target given the 15-minute validity window and attempt caps.
pub fn hash_otp(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

pub fn verify_otp(code: &str, hash: &str) -> bool {
    hash_otp(code) == hash
}

/// Generate a random URL-safe session bearer token. Only its digest is ever
/// persisted.
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// SHA-256 hex digest of a session token — the stored lookup key.
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Last four characters of a token, for UI display only. Never used for
/// auth decisions.
pub fn token_last_four(token: &str) -> String {
    token.chars().skip(token.chars().count().saturating_sub(4)).collect()
}

/// OTP length as usize for generation-side assertions.
pub const fn otp_length() -> usize {
    OTP_LENGTH as usize
}
