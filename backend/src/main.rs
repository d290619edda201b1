//! Backend entry-point: loads settings, prepares storage and serves the
//! maintenance REST endpoints.

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use switchgear_pm::inbound::http::health::HealthState;
use switchgear_pm::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use switchgear_pm::settings::AppSettings;

mod server;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let policy = settings.concurrency_policy().map_err(io::Error::other)?;
    let mut config = ServerConfig::new(bind_addr)
        .with_tables(settings.table_names())
        .with_policy(policy);

    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url)
            .await
            .map_err(|e| io::Error::other(format!("failed to run migrations: {e}")))?;
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(|e| io::Error::other(format!("failed to create database pool: {e}")))?;
        info!(max_connections = settings.db_max_connections(), "database pool ready");
        config = config.with_db_pool(pool);
    }

    match settings.jwt_secret().map_err(io::Error::other)? {
        Some(secret) => config = config.with_jwt_secret(secret),
        None if cfg!(debug_assertions) => {}
        None => {
            return Err(io::Error::other(
                "a JWT secret is required in release builds (PM_JWT_SECRET_FILE or PM_JWT_SECRET)",
            ));
        }
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::build_prometheus());

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, ?policy, "starting switchgear maintenance server");
    create_server(health_state, config)?.await
}
