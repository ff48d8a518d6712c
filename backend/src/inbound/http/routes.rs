//! Route table.
//!
//! Every resource answers unsupported methods with 405: an error page for
//! browser routes, the JSON envelope for API routes. Guards are applied per
//! resource so HTML and JSON resources under the same prefix can reject in
//! their own format.

use std::sync::Arc;

use actix_web::web;

use super::auth_middleware::{AuthMode, RequireAuth, RequireRole};
use super::error::{
    form_config, json_config, method_not_allowed, page_method_not_allowed, query_config,
};
use super::session_manager::SessionManager;
use super::{admin_performers, admin_roles, api, pages, session_check};

/// Register every page, API route and extractor config on `cfg`.
///
/// `sessions` backs the auth guards and must be the registry stored in
/// [`HttpState`](super::state::HttpState).
pub fn configure(cfg: &mut web::ServiceConfig, sessions: &Arc<SessionManager>) {
    let auth = |mode| RequireAuth::new(Arc::clone(sessions), mode);

    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(form_config());

    // Public pages.
    cfg.service(
        web::resource("/")
            .route(web::get().to(pages::index))
            .default_service(web::to(page_method_not_allowed)),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(pages::login_page))
            .route(web::post().to(pages::authenticate))
            .default_service(web::to(page_method_not_allowed)),
    )
    .service(
        web::resource("/auth")
            .route(web::post().to(pages::authenticate))
            .default_service(web::to(page_method_not_allowed)),
    )
    .service(
        web::resource("/logout")
            .route(web::get().to(pages::logout))
            .default_service(web::to(page_method_not_allowed)),
    );

    // Authenticated pages.
    cfg.service(
        web::resource("/fgw")
            .route(web::get().to(pages::landing))
            .default_service(web::to(page_method_not_allowed))
            .wrap(auth(AuthMode::Html)),
    )
    .service(
        web::resource("/admin")
            .route(web::get().to(pages::admin_home))
            .default_service(web::to(page_method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Html))
            .wrap(auth(AuthMode::Html)),
    )
    .service(
        web::resource("/admin/performers")
            .route(web::get().to(admin_performers::performers_page))
            .default_service(web::to(page_method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Html))
            .wrap(auth(AuthMode::Html)),
    )
    .service(
        web::resource("/admin/performers/upd")
            .route(web::put().to(admin_performers::update_performer_roles))
            .route(web::post().to(admin_performers::update_performer_roles))
            .default_service(web::to(method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Json))
            .wrap(auth(AuthMode::Json)),
    )
    .service(
        web::resource("/admin/roles")
            .route(web::get().to(admin_roles::roles_page))
            .default_service(web::to(page_method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Html))
            .wrap(auth(AuthMode::Html)),
    )
    .service(
        web::resource("/admin/roles/add")
            .route(web::post().to(admin_roles::add_role))
            .default_service(web::to(page_method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Html))
            .wrap(auth(AuthMode::Html)),
    )
    .service(
        web::resource("/admin/roles/upd")
            .route(web::put().to(admin_roles::update_role))
            .route(web::post().to(admin_roles::update_role))
            .default_service(web::to(method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Json))
            .wrap(auth(AuthMode::Json)),
    );

    // JSON API.
    cfg.service(
        web::resource("/api/fgw/login")
            .route(web::post().to(api::login))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/fgw/performers")
            .route(web::get().to(api::list_performers))
            .default_service(web::to(method_not_allowed))
            .wrap(auth(AuthMode::Json)),
    )
    .service(
        web::resource("/api/fgw/performers/upd")
            .route(web::put().to(api::update_performer))
            .default_service(web::to(method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Json))
            .wrap(auth(AuthMode::Json)),
    )
    .service(
        web::resource("/api/fgw/roles")
            .route(web::get().to(api::list_roles))
            .default_service(web::to(method_not_allowed))
            .wrap(auth(AuthMode::Json)),
    )
    .service(
        web::resource("/api/fgw/roles/add")
            .route(web::post().to(api::add_role))
            .default_service(web::to(method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Json))
            .wrap(auth(AuthMode::Json)),
    )
    .service(
        web::resource("/api/fgw/roles/upd")
            .route(web::put().to(api::update_role))
            .default_service(web::to(method_not_allowed))
            .wrap(RequireRole::admin(AuthMode::Json))
            .wrap(auth(AuthMode::Json)),
    )
    .service(
        web::resource("/api/session-check")
            .route(web::get().to(session_check::session_check))
            .route(web::head().to(session_check::session_check))
            .default_service(web::to(method_not_allowed)),
    );
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
