//! Server construction and middleware wiring.

mod config;
mod sweeper;

pub use config::{CliArgs, ServerConfig};
pub use sweeper::Sweeper;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_files::Files;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use fgw_admin::Trace;
#[cfg(debug_assertions)]
use fgw_admin::doc::ApiDoc;
use fgw_admin::domain::{PerformerServiceImpl, RoleServiceImpl};
use fgw_admin::inbound::http::error::not_found;
use fgw_admin::inbound::http::health::{HealthState, live, ready};
use fgw_admin::inbound::http::routes;
use fgw_admin::inbound::http::session::cookie_session_middleware;
use fgw_admin::inbound::http::session_manager::SessionManager;
use fgw_admin::inbound::http::state::HttpState;
use fgw_admin::outbound::persistence::{DbPool, MssqlPerformerRepository, MssqlRoleRepository};

const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const KEEP_ALIVE: Duration = Duration::from_secs(120);
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    static_dir: PathBuf,
}

/// Wire the performer and role services over SQL Server repositories.
fn build_http_state(pool: &DbPool, sessions: Arc<SessionManager>) -> HttpState {
    let performers = PerformerServiceImpl::new(Arc::new(MssqlPerformerRepository::new(pool.clone())));
    let roles = RoleServiceImpl::new(Arc::new(MssqlRoleRepository::new(pool.clone())));
    HttpState::new(Arc::new(performers), Arc::new(roles), sessions)
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        static_dir,
    } = deps;

    let sessions = Arc::clone(&http_state.sessions);
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(ready)
        .service(live)
        .service(Files::new("/web", static_dir))
        .configure(|cfg| routes::configure(cfg, &sessions));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(not_found))
        .wrap(cookie_session_middleware(key, cookie_secure, same_site))
        .wrap(Trace)
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("fgw_admin")
        .endpoint("/metrics")
        .build()
        .map_err(|error| std::io::Error::other(format!("configure Prometheus metrics: {error}")))
}

/// Construct the HTTP server and start the session sweeper.
///
/// Readiness is flipped on once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<(Server, Sweeper)> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        static_dir,
        sweep_interval,
        db_pool,
    } = config;

    let sessions = Arc::new(SessionManager::new(Arc::new(DefaultClock)));
    let http_state = web::Data::new(build_http_state(&db_pool, Arc::clone(&sessions)));
    #[cfg(feature = "metrics")]
    let metrics = make_metrics()?;

    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        key,
        cookie_secure,
        same_site,
        static_dir,
    };
    let server = HttpServer::new(move || {
        let app = build_app(deps.clone());
        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());
        app
    })
    .client_request_timeout(CLIENT_REQUEST_TIMEOUT)
    .keep_alive(KEEP_ALIVE)
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind(bind_addr)?
    .run();

    let sweeper = Sweeper::spawn(sessions, sweep_interval);
    health_state.mark_ready();
    Ok((server, sweeper))
}
