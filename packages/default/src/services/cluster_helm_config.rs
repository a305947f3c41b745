//! Helm configuration service.
//!
//! Handlers only see the `ClusterHelmConfigService` trait. The Postgres backend
//! is used in production; the in-memory backend serves local development and
//! tests. Both enforce one record per environment and re-validate requests
//! before storing them.
use crate::models::cluster_helm_config::{ClusterHelmConfig, ClusterHelmConfigRequest};
use crate::queries::cluster_helm_config::{get_by_environment, ping, upsert_cluster_helm_config};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[async_trait]
pub trait ClusterHelmConfigService: Send + Sync {
    /// Create or update the record for `request.environment`, acting as `user_id`.
    async fn save(
        &self,
        request: ClusterHelmConfigRequest,
        user_id: i32,
    ) -> ServiceResult<ClusterHelmConfig>;

    async fn find_one_by_environment(&self, environment: &str) -> ServiceResult<ClusterHelmConfig>;

    async fn health_check(&self) -> ServiceResult<()>;

    fn backend_name(&self) -> &'static str;
}

fn validated(request: ClusterHelmConfigRequest) -> ServiceResult<ClusterHelmConfigRequest> {
    request
        .validate()
        .map_err(|e| ServiceError::Validation(e.to_string()))
}

fn not_found(environment: &str) -> ServiceError {
    ServiceError::NotFound(format!(
        "no helm config for environment '{environment}'"
    ))
}

pub struct PgClusterHelmConfigService {
    pool: PgPool,
}

impl PgClusterHelmConfigService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClusterHelmConfigService for PgClusterHelmConfigService {
    async fn save(
        &self,
        request: ClusterHelmConfigRequest,
        user_id: i32,
    ) -> ServiceResult<ClusterHelmConfig> {
        let request = validated(request)?;
        let record = upsert_cluster_helm_config(&self.pool, &request, user_id).await?;
        info!(
            "💾 Saved helm config {} for environment {} (user {})",
            record.id, record.environment, user_id
        );
        Ok(record)
    }

    async fn find_one_by_environment(&self, environment: &str) -> ServiceResult<ClusterHelmConfig> {
        if environment.is_empty() {
            return Err(not_found(environment));
        }
        get_by_environment(&self.pool, environment)
            .await?
            .ok_or_else(|| not_found(environment))
    }

    async fn health_check(&self) -> ServiceResult<()> {
        ping(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    next_id: i32,
    by_environment: HashMap<String, ClusterHelmConfig>,
}

/// Non-durable backend; state is lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryClusterHelmConfigService {
    state: RwLock<InMemoryState>,
}

impl InMemoryClusterHelmConfigService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryClusterHelmConfigService {
    async fn len(&self) -> usize {
        self.state.read().await.by_environment.len()
    }

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ClusterHelmConfigService for InMemoryClusterHelmConfigService {
    async fn save(
        &self,
        request: ClusterHelmConfigRequest,
        user_id: i32,
    ) -> ServiceResult<ClusterHelmConfig> {
        let request = validated(request)?;
        let mut state = self.state.write().await;

        if let Some(existing) = state.by_environment.get_mut(&request.environment) {
            existing.apply(request, user_id);
            debug!("Updated in-memory helm config {}", existing);
            return Ok(existing.clone());
        }

        state.next_id += 1;
        let record = ClusterHelmConfig::from_request(state.next_id, request, user_id);
        debug!("Inserted in-memory helm config {}", record);
        state
            .by_environment
            .insert(record.environment.clone(), record.clone());
        Ok(record)
    }

    async fn find_one_by_environment(&self, environment: &str) -> ServiceResult<ClusterHelmConfig> {
        self.state
            .read()
            .await
            .by_environment
            .get(environment)
            .cloned()
            .ok_or_else(|| not_found(environment))
    }

    async fn health_check(&self) -> ServiceResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
