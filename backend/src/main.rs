//! Backend entry-point: loads configuration, checks the database and runs
//! the HTTP server until shutdown.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use actix_web::web;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use mockable::DefaultEnv;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fgw_admin::inbound::http::health::HealthState;
use fgw_admin::inbound::http::session_config::fingerprint::key_fingerprint;
use fgw_admin::inbound::http::session_config::{BuildMode, session_settings_from_env};
use fgw_admin::outbound::persistence::{DbConfig, DbPool, PoolConfig};
use server::{CliArgs, ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let dotenv_loaded = dotenv::dotenv().is_ok();
    init_tracing();
    if !dotenv_loaded {
        info!("no .env file; using the process environment");
    }

    let args = CliArgs::parse();
    let env = DefaultEnv::new();

    let db_config = DbConfig::from_env(&env).wrap_err("database configuration")?;
    let pool = DbPool::new(PoolConfig::new(db_config))
        .await
        .wrap_err("create database pool")?;
    if let Err(err) = pool.ping().await {
        error!(error = %err, "database is unreachable");
        return Err(err).wrap_err("database connectivity check");
    }
    info!("database reachable");

    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        ephemeral = session.ephemeral,
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind = args.bind;
    let health_state = web::Data::new(HealthState::new());
    let (server, sweeper) = create_server(health_state.clone(), ServerConfig::new(args, session, pool))
        .wrap_err_with(|| format!("bind {bind}"))?;
    info!(%bind, "listening");

    let outcome = server.await;
    health_state.mark_unhealthy();
    sweeper.stop().await;
    info!("server stopped");
    outcome.wrap_err("server terminated with an error")
}
