use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

/// A user allowed to call the API.
///
/// The raw API token is never stored, only its SHA-256 hex digest.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email_id: String,
    pub active: bool,
    pub api_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Active users with a nonzero id can act on the API.
    pub fn can_authenticate(&self) -> bool {
        self.active && self.id != 0
    }
}

/// Hex-encoded SHA-256 of an API token, as stored in `users.api_token_hash`.
pub fn hash_api_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
