use anyhow::Context;
use clap::Parser;
use cluster_helm_config::{
    models::config::AppConfig,
    server::{build_state, pool_monitor_task, serve},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path (default: $HELM_CONFIG_FORGE_CONFIG or /var/lib/helm_config_forge/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen port from the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Skip running database migrations at startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()) // uses RUST_LOG
        .init();

    let args = Args::parse();
    info!("Cluster Helm Config: Starting...");

    let config_path = args.config.unwrap_or_else(AppConfig::config_path);
    let mut cfg = AppConfig::load_from(&config_path)
        .with_context(|| format!("loading config from {config_path}"))?;
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    cfg.debug_print();

    let pool = match cfg.database {
        Some(_) => {
            debug!("======== INITIALIZING DATABASE ========");
            let pool = cfg.db_pool().await?;
            if args.skip_migrations {
                info!("Skipping database migrations");
            } else {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("running migrations")?;
            }
            tokio::spawn(pool_monitor_task(pool.clone()));
            Some(pool)
        }
        None => None,
    };

    info!("Starting Cluster Helm Config Server...");
    let state = build_state(&cfg, pool);
    serve(&cfg, state).await
}
