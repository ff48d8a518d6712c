//! Tests for the authentication and role guards.

use super::*;
use crate::inbound::http::session::SESSION_COOKIE_NAME;
use crate::inbound::http::session_manager::SessionTicket;
use crate::inbound::http::test_utils::{MutableClock, session_cookie, test_session_middleware};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::TimeDelta;
use rstest::{fixture, rstest};

struct Harness {
    clock: Arc<MutableClock>,
    sessions: Arc<SessionManager>,
}

#[fixture]
fn harness() -> Harness {
    let clock = Arc::new(MutableClock::new(Utc::now()));
    let sessions = Arc::new(SessionManager::new(clock.clone()));
    Harness { clock, sessions }
}

/// Log in as `/seed/{performer}/{role}`; `?aged_hours=` backdates the login.
async fn seed(
    path: web::Path<(i32, i32)>,
    query: web::Query<std::collections::HashMap<String, i64>>,
    sessions: web::Data<SessionManager>,
    session: SessionContext,
) -> Result<HttpResponse, Error> {
    let (performer, role) = path.into_inner();
    let ticket = sessions.create(PerformerId::new(performer));
    let aged = query.get("aged_hours").copied().unwrap_or_default();
    let ticket = SessionTicket {
        created_at: ticket.created_at - TimeDelta::hours(aged),
        token: ticket.token,
    };
    session.begin(&SessionPayload::for_login(
        PerformerId::new(performer),
        RoleId::new(role),
        ticket,
    ))?;
    Ok(HttpResponse::Ok().finish())
}

async fn revoke(sessions: web::Data<SessionManager>, session: SessionContext) -> HttpResponse {
    if let Some(payload) = session.payload() {
        sessions.revoke(&payload.token);
    }
    HttpResponse::Ok().finish()
}

async fn whoami(performer: AuthenticatedPerformer) -> HttpResponse {
    HttpResponse::Ok().body(performer.performer_id.to_string())
}

fn guarded_app(
    sessions: Arc<SessionManager>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(Arc::clone(&sessions)))
        .wrap(test_session_middleware())
        .route("/seed/{performer}/{role}", web::get().to(seed))
        .route("/revoke", web::get().to(revoke))
        .service(
            web::resource("/fgw")
                .wrap(RequireAuth::new(Arc::clone(&sessions), AuthMode::Html))
                .route(web::get().to(whoami)),
        )
        .service(
            web::resource("/admin")
                .wrap(RequireRole::admin(AuthMode::Html))
                .wrap(RequireAuth::new(Arc::clone(&sessions), AuthMode::Html))
                .route(web::get().to(whoami)),
        )
        .service(
            web::resource("/api/thing")
                .wrap(RequireRole::admin(AuthMode::Json))
                .wrap(RequireAuth::new(sessions, AuthMode::Json))
                .route(web::get().to(whoami)),
        )
        .service(
            web::resource("/unguarded-role")
                .wrap(RequireRole::admin(AuthMode::Json))
                .route(web::get().to(whoami)),
        )
}

fn get(uri: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::get().uri(uri)
}

fn cookie_from<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    assert_eq!(res.status(), StatusCode::OK);
    session_cookie(res).expect("login sets the session cookie")
}

fn header_value<B>(res: &ServiceResponse<B>, name: header::HeaderName) -> Option<String> {
    res.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[rstest]
#[actix_web::test]
async fn anonymous_html_request_gets_logout_page(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let res = actix_test::call_service(&app, get("/fgw").to_request()).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        header_value(&res, header::CACHE_CONTROL).as_deref(),
        Some(LOGOUT_CACHE_CONTROL)
    );
    assert_eq!(header_value(&res, header::EXPIRES).as_deref(), Some("0"));
    assert_eq!(
        header_value(&res, header::X_FRAME_OPTIONS).as_deref(),
        Some("DENY")
    );
    let body = actix_test::read_body(res).await;
    let body = std::str::from_utf8(&body).expect("utf8");
    assert!(body.contains("/login"));
}

#[rstest]
#[actix_web::test]
async fn anonymous_json_request_gets_401(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let res = actix_test::call_service(&app, get("/api/thing").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), crate::domain::ErrorCode::Unauthorized);
}

#[rstest]
#[actix_web::test]
async fn valid_session_reaches_handler_with_security_headers(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/1042/1").to_request()).await);

    let res = actix_test::call_service(
        &app,
        get("/fgw").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        header_value(&res, header::X_CONTENT_TYPE_OPTIONS).as_deref(),
        Some("nosniff")
    );
    assert_eq!(
        header_value(&res, header::REFERRER_POLICY).as_deref(),
        Some("same-origin")
    );
    assert_eq!(header_value(&res, header::CACHE_CONTROL).as_deref(), Some(NO_STORE));
    assert_eq!(actix_test::read_body(res).await, "1042");
    assert_eq!(harness.sessions.len(), 1);
}

#[rstest]
#[case(1, StatusCode::FORBIDDEN)]
#[case(2, StatusCode::FORBIDDEN)]
#[case(3, StatusCode::OK)]
#[actix_web::test]
async fn admin_pages_admit_only_role_three(
    harness: Harness,
    #[case] role: i32,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get(&format!("/seed/7/{role}")).to_request()).await);

    let page = actix_test::call_service(
        &app,
        get("/admin")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(page.status(), expected);

    let api = actix_test::call_service(
        &app,
        get("/api/thing").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(api.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn forbidden_page_is_html(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/7/1").to_request()).await);
    let res = actix_test::call_service(
        &app,
        get("/admin").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(
        header_value(&res, header::CONTENT_TYPE).as_deref(),
        Some("text/html; charset=utf-8")
    );
}

#[rstest]
#[actix_web::test]
async fn idle_session_is_logged_out(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/1042/1").to_request()).await);

    harness.clock.advance_seconds(31 * 60);
    let res = actix_test::call_service(
        &app,
        get("/fgw").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let removal = session_cookie(&res).expect("session cookie removed");
    assert_eq!(removal.name(), SESSION_COOKIE_NAME);
    assert_eq!(removal.value(), "");
    assert!(harness.sessions.is_empty());
}

#[rstest]
#[actix_web::test]
async fn swept_idle_session_stays_logged_out(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/1042/3").to_request()).await);

    harness.clock.advance_seconds(31 * 60);
    assert_eq!(harness.sessions.cleanup_expired(), 1);

    for _ in 0..2 {
        let res = actix_test::call_service(
            &app,
            get("/api/thing").cookie(cookie.clone()).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
    assert!(harness.sessions.is_empty());
}

#[rstest]
#[actix_web::test]
async fn activity_keeps_session_alive(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/1042/1").to_request()).await);

    for _ in 0..3 {
        harness.clock.advance_seconds(20 * 60);
        let res = actix_test::call_service(
            &app,
            get("/fgw")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(actix_test::read_body(res).await, "1042");
    }
}

#[rstest]
#[actix_web::test]
async fn session_older_than_a_day_is_rejected(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/1042/3?aged_hours=25").to_request()).await);

    let res = actix_test::call_service(
        &app,
        get("/api/thing").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn revoked_token_is_rejected(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let cookie = cookie_from(&actix_test::call_service(&app, get("/seed/1042/3").to_request()).await);

    actix_test::call_service(
        &app,
        get("/revoke")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let res = actix_test::call_service(
        &app,
        get("/api/thing").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn role_guard_without_auth_guard_fails_closed(harness: Harness) {
    let app = actix_test::init_service(guarded_app(Arc::clone(&harness.sessions))).await;
    let res = actix_test::call_service(
        &app,
        get("/unguarded-role").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
