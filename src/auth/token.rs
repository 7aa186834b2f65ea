use rand::{Rng, distributions::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const TOKEN_PREFIX: &str = "beans";
const LOOKUP_LENGTH: usize = 8;
const SECRET_BYTES: usize = 16;
const SECRET_LENGTH: usize = SECRET_BYTES * 2;
const RESET_CODE_LENGTH: usize = 8;

/// A freshly minted session token. Only `digest` is ever persisted.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub raw: String,
    pub digest: String,
}

/// Generates a new token with the format: beans_<lookup>_<secret>
#[must_use]
pub fn generate_session_token() -> IssuedToken {
    let raw = build_token(&generate_lookup(), &generate_secret());
    let digest = digest_token(&raw);
    IssuedToken { raw, digest }
}

/// SHA-256 hex digest of a raw token. Session tokens carry 128 bits of
/// randomness, so a fast digest is enough to keep them out of snapshots.
#[must_use]
pub fn digest_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a single-use password reset code (8 uppercase alphanumerics).
#[must_use]
pub fn generate_reset_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_CODE_LENGTH)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// Generates the lookup portion of the token (first 8 chars of a UUID)
#[must_use]
fn generate_lookup() -> String {
    let uuid = uuid::Uuid::new_v4();
    uuid.to_string()[..LOOKUP_LENGTH].to_string()
}

#[must_use]
fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[must_use]
fn build_token(lookup: &str, secret: &str) -> String {
    format!("{TOKEN_PREFIX}_{lookup}_{secret}")
}

/// Parses a token string into its components (lookup, secret)
pub fn parse_token(token: &str) -> Result<(String, String)> {
    let malformed = || Error::invalid("malformed token");

    let rest = token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|r| r.strip_prefix('_'))
        .ok_or_else(malformed)?;
    let (lookup, secret) = rest.split_once('_').ok_or_else(malformed)?;

    if lookup.len() != LOOKUP_LENGTH
        || secret.len() != SECRET_LENGTH
        || !secret.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(malformed());
    }

    Ok((lookup.to_string(), secret.to_string()))
}
