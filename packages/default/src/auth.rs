//! Resolves the calling user from request headers.
use crate::models::config::AuthConfig;
use crate::models::users::hash_api_token;
use crate::queries::users::get_active_by_token_hash;
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no API token in request")]
    MissingToken,
    #[error("API token is not recognised")]
    InvalidToken,
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

#[async_trait]
pub trait UserService: Send + Sync {
    /// Returns the id of the user behind the request's API token.
    async fn get_logged_in_user(&self, headers: &HeaderMap) -> Result<i32, AuthError>;
}

/// Pull the API token from `header_name`, falling back to `Authorization: Bearer`.
pub fn extract_token<'a>(headers: &'a HeaderMap, header_name: &str) -> Option<&'a str> {
    let from_header = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    from_header.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

/// Tokens come from `[auth.static_tokens]`; meant for local setups without a database.
pub struct StaticTokenUserService {
    token_header: String,
    tokens: HashMap<String, i32>,
}

impl StaticTokenUserService {
    pub fn new(token_header: impl Into<String>, tokens: HashMap<String, i32>) -> Self {
        Self {
            token_header: token_header.into(),
            tokens,
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        if cfg.static_tokens.is_empty() {
            warn!("⚠️ No static API tokens configured; every write will be rejected");
        }
        Self::new(cfg.token_header.clone(), cfg.static_tokens.clone())
    }
}

#[async_trait]
impl UserService for StaticTokenUserService {
    async fn get_logged_in_user(&self, headers: &HeaderMap) -> Result<i32, AuthError> {
        let token = extract_token(headers, &self.token_header).ok_or(AuthError::MissingToken)?;
        self.tokens
            .get(token)
            .copied()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Looks the token's SHA-256 digest up in the `users` table.
pub struct PgUserService {
    pool: PgPool,
    token_header: String,
}

impl PgUserService {
    pub fn new(pool: PgPool, token_header: impl Into<String>) -> Self {
        Self {
            pool,
            token_header: token_header.into(),
        }
    }
}

#[async_trait]
impl UserService for PgUserService {
    async fn get_logged_in_user(&self, headers: &HeaderMap) -> Result<i32, AuthError> {
        let token = extract_token(headers, &self.token_header).ok_or(AuthError::MissingToken)?;
        let user = get_active_by_token_hash(&self.pool, &hash_api_token(token))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.can_authenticate() {
            debug!("User {} matched token but cannot authenticate", user.id);
            return Err(AuthError::InvalidToken);
        }
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn token_header_wins_over_bearer() {
        let map = headers(&[("token", "abc"), ("authorization", "Bearer xyz")]);
        assert_eq!(extract_token(&map, "token"), Some("abc"));
    }

    #[test]
    fn bearer_is_used_when_header_missing() {
        let map = headers(&[("authorization", "Bearer xyz")]);
        assert_eq!(extract_token(&map, "token"), Some("xyz"));
    }

    #[test]
    fn blank_and_non_bearer_values_are_ignored() {
        let map = headers(&[("token", "  "), ("authorization", "Basic Zm9vOmJhcg==")]);
        assert_eq!(extract_token(&map, "token"), None);
    }

    #[tokio::test]
    async fn static_service_resolves_known_token() {
        let service = StaticTokenUserService::new(
            "token",
            HashMap::from([("dev-token".to_string(), 42)]),
        );
        let user_id = service
            .get_logged_in_user(&headers(&[("token", "dev-token")]))
            .await
            .unwrap();
        assert_eq!(user_id, 42);
    }

    #[tokio::test]
    async fn static_service_rejects_missing_and_unknown_tokens() {
        let service = StaticTokenUserService::new(
            "token",
            HashMap::from([("dev-token".to_string(), 42)]),
        );
        assert!(matches!(
            service.get_logged_in_user(&HeaderMap::new()).await,
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            service
                .get_logged_in_user(&headers(&[("token", "other")]))
                .await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn static_service_honours_custom_header() {
        let service = StaticTokenUserService::from_config(&AuthConfig {
            token_header: "x-api-token".to_string(),
            static_tokens: HashMap::from([("t".to_string(), 7)]),
        });
        let user_id = service
            .get_logged_in_user(&headers(&[("x-api-token", "t")]))
            .await
            .unwrap();
        assert_eq!(user_id, 7);
    }
}
