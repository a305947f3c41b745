use serde::Deserialize;
use std::collections::HashMap;

/// How callers authenticate against the API.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Header carrying the API token; `Authorization: Bearer` is always accepted too
    pub token_header: String,

    /// Fixed `token = user_id` pairs, used when no database is configured
    pub static_tokens: HashMap<String, i32>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_header: "token".to_string(),
            static_tokens: HashMap::new(),
        }
    }
}
