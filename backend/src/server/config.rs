//! Command-line options and the assembled server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use clap::Parser;

use fgw_admin::inbound::http::session_config::SessionSettings;
use fgw_admin::outbound::persistence::DbPool;

/// `fgw-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fgw-admin",
    about = "Administration site for FGW performers and roles",
    version
)]
pub struct CliArgs {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "FGW_BIND", default_value = "0.0.0.0:7777")]
    pub bind: SocketAddr,
    /// Directory served under `/web/`.
    #[arg(long = "static-dir", value_name = "path", default_value = "web")]
    pub static_dir: PathBuf,
    /// Seconds between sweeps of expired sessions.
    #[arg(
        long = "sweep-interval-secs",
        value_name = "seconds",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sweep_interval_secs: u64,
}

/// Everything `create_server` needs.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) static_dir: PathBuf,
    pub(crate) sweep_interval: Duration,
    pub(crate) db_pool: DbPool,
}

impl ServerConfig {
    /// Combine parsed arguments, session settings and a live pool.
    #[must_use]
    pub fn new(args: CliArgs, session: SessionSettings, db_pool: DbPool) -> Self {
        Self {
            key: session.key,
            cookie_secure: session.cookie_secure,
            same_site: session.same_site,
            bind_addr: args.bind,
            static_dir: args.static_dir,
            sweep_interval: Duration::from_secs(args.sweep_interval_secs),
            db_pool,
        }
    }
}
