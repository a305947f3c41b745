mod api;
mod auth;
mod database;
mod server;

pub use api::*;
pub use auth::*;
pub use database::*;
pub use server::*;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "HELM_CONFIG_FORGE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/helm_config_forge/config.toml";
const ENV_PREFIX: &str = "HELM_CONFIG_FORGE";

/// Top-level application configuration.
///
/// This groups all config sections from the TOML file:
/// - `[server]`   → `ServerConfig`
/// - `[database]` → `DatabaseConfig` (optional, in-memory store when absent)
/// - `[auth]`     → `AuthConfig`
/// - `[api]`      → `ApiPolicy`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiPolicy,
}

impl AppConfig {
    /// Path of the config file, honoring `HELM_CONFIG_FORGE_CONFIG`.
    pub fn config_path() -> String {
        env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads `path` (optional) and layers `HELM_CONFIG_FORGE__SECTION__KEY`
    /// environment variables on top.
    pub fn load_from(config_path: &str) -> Result<Self> {
        debug!("{} => {}", CONFIG_PATH_ENV, config_path);

        let settings = Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("loading configuration")?;

        settings
            .try_deserialize::<Self>()
            .context("parsing configuration")
    }

    pub async fn db_pool(&self) -> Result<PgPool> {
        let database = self
            .database
            .as_ref()
            .context("missing [database] section in configuration")?;

        PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(database.acquire_timeout)
            .connect(&database.to_url())
            .await
            .context("connecting to database")
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_api(mut self, api: ApiPolicy) -> Self {
        self.api = api;
        self
    }

    /// Logs the effective configuration with secrets masked.
    pub fn debug_print(&self) {
        debug!("🔧 Loaded Configuration:");
        debug!("  [server]");
        debug!("    host = {}", self.server.host);
        debug!("    port = {}", self.server.port);

        if let Some(db) = &self.database {
            let masked: String = "*".repeat(db.password.chars().count());
            debug!("  [database]");
            debug!("    host = {}", db.host);
            debug!("    port = {}", db.port);
            debug!("    user = {}", db.user);
            debug!("    password = {}", masked);
            debug!("    name = {}", db.name);
            debug!("    max_connections = {}", db.max_connections);
        }

        debug!("  [auth]");
        debug!("    token_header = {}", self.auth.token_header);
        for user_id in self.auth.static_tokens.values() {
            debug!("    static_tokens[***] = {}", user_id);
        }

        debug!("  [api]");
        debug!("    read_requires_auth = {}", self.api.read_requires_auth);
        debug!("    not_found_as_404 = {}", self.api.not_found_as_404);
    }
}
