use crate::models::cluster_helm_config::{ClusterHelmConfig, ClusterHelmConfigRequest};
use anyhow::{Context, Result};
use sqlx::PgPool;

/// Insert a config for `request.environment`, or update the existing one.
///
/// `created_by` and `created_at` survive updates; `id` is stable per environment.
pub async fn upsert_cluster_helm_config(
    pool: &PgPool,
    request: &ClusterHelmConfigRequest,
    user_id: i32,
) -> Result<ClusterHelmConfig> {
    let record = sqlx::query_as::<_, ClusterHelmConfig>(
        r#"
        INSERT INTO cluster_helm_config (
            environment, cluster_id, config, tiller_url, tiller_cert, tiller_key,
            active, created_by, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
        ON CONFLICT (environment) DO UPDATE SET
            cluster_id = EXCLUDED.cluster_id,
            config = EXCLUDED.config,
            tiller_url = EXCLUDED.tiller_url,
            tiller_cert = EXCLUDED.tiller_cert,
            tiller_key = EXCLUDED.tiller_key,
            active = EXCLUDED.active,
            updated_by = EXCLUDED.updated_by,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&request.environment)
    .bind(request.cluster_id)
    .bind(&request.config)
    .bind(&request.tiller_url)
    .bind(&request.tiller_cert)
    .bind(&request.tiller_key)
    .bind(request.active)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .with_context(|| {
        format!(
            "saving helm config for environment '{}'",
            request.environment
        )
    })?;
    Ok(record)
}

pub async fn get_by_environment(
    pool: &PgPool,
    environment: &str,
) -> Result<Option<ClusterHelmConfig>> {
    let record = sqlx::query_as::<_, ClusterHelmConfig>(
        "SELECT * FROM cluster_helm_config WHERE environment = $1",
    )
    .bind(environment)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1 as health_check")
        .execute(pool)
        .await
        .context("database health check")?;
    Ok(())
}
