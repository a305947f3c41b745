use crate::models::users::User;
use anyhow::Result;
use sqlx::PgPool;

/// Fetch the active user owning the given API token hash.
pub async fn get_active_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE api_token_hash = $1 AND active = TRUE",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}
