use crate::auth::{PgUserService, StaticTokenUserService, UserService};
use crate::handlers::{cluster_helm_config, state::AppState, status::status};
use crate::models::config::AppConfig;
use crate::services::cluster_helm_config::{
    ClusterHelmConfigService, InMemoryClusterHelmConfigService, PgClusterHelmConfigService,
};
use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::{Duration, interval};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/cluster/helm/config", post(cluster_helm_config::save))
        .route(
            "/cluster/helm/config/{environment}",
            get(cluster_helm_config::get_by_environment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wires the Postgres backends when `pool` is given, the in-memory ones otherwise.
pub fn build_state(cfg: &AppConfig, pool: Option<PgPool>) -> AppState {
    let (service, users): (Arc<dyn ClusterHelmConfigService>, Arc<dyn UserService>) = match pool
    {
        Some(pool) => {
            info!("🗄️ Using PostgreSQL helm config store");
            (
                Arc::new(PgClusterHelmConfigService::new(pool.clone())),
                Arc::new(PgUserService::new(pool, cfg.auth.token_header.clone())),
            )
        }
        None => {
            warn!("⚠️ No [database] configured; helm configs are kept in memory only");
            (
                Arc::new(InMemoryClusterHelmConfigService::new()),
                Arc::new(StaticTokenUserService::from_config(&cfg.auth)),
            )
        }
    };
    AppState::new(service, users, cfg.api)
}

pub async fn serve(cfg: &AppConfig, state: AppState) -> Result<()> {
    let bind_address = cfg.server.bind_address();
    info!("Host: {}", cfg.server.host);
    info!("Port: {}", cfg.server.port);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️ Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections...");
}

/// Periodically logs connection pool usage.
pub async fn pool_monitor_task(pool: PgPool) {
    let mut interval = interval(Duration::from_secs(30));
    loop {
        interval.tick().await;
        let pool_size = pool.size() as usize;
        let idle_count = pool.num_idle();
        debug!(
            "📊 DB Pool - Total: {}, Idle: {}, Active: {}",
            pool_size,
            idle_count,
            pool_size.saturating_sub(idle_count)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::{ApiPolicy, AuthConfig};
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum::body::Bytes;
    use axum_test::TestServer;
    use std::collections::HashMap;

    #[tokio::test]
    async fn memory_state_uses_static_tokens_and_policy() {
        let cfg = AppConfig::default()
            .with_auth(AuthConfig {
                token_header: "token".to_string(),
                static_tokens: HashMap::from([("dev".to_string(), 3)]),
            })
            .with_api(ApiPolicy {
                read_requires_auth: false,
                not_found_as_404: true,
            });
        let state = build_state(&cfg, None);
        assert_eq!(state.helm_config_service.backend_name(), "memory");
        assert!(state.policy.not_found_as_404);

        let server = TestServer::new(build_router(state)).unwrap();
        let response = server
            .post("/cluster/helm/config")
            .add_header(HeaderName::from_static("token"), HeaderValue::from_static("dev"))
            .bytes(Bytes::from_static(br#"{"environment":"qa"}"#))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let response = server.get("/cluster/helm/config/unknown").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = TestServer::new(build_router(build_state(&AppConfig::default(), None)))
            .unwrap();
        let response = server.get("/cluster/helm/nope").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
