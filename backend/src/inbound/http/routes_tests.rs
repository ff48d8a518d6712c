//! Route table tests: guards, method handling and extractor configs.

use super::*;
use crate::domain::ports::{MockPerformerService, MockRoleService};
use crate::domain::{AuthOutcome, Error, ErrorCode};
use crate::inbound::http::test_utils::{
    mock_state, performer_fixture, role_fixture, session_cookie, test_session_middleware,
};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::json;

macro_rules! routed_app {
    ($performers:expr, $roles:expr) => {{
        let state = mock_state($performers, $roles);
        let sessions = Arc::clone(&state.sessions);
        actix_test::init_service(
            App::new()
                .app_data(state)
                .wrap(test_session_middleware())
                .configure(|cfg| configure(cfg, &sessions)),
        )
        .await
    }};
}

fn content_type<B>(res: &actix_web::dev::ServiceResponse<B>) -> Option<String> {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[rstest]
#[case("/fgw")]
#[case("/admin")]
#[case("/admin/performers")]
#[case("/admin/roles")]
#[actix_web::test]
async fn anonymous_pages_get_the_logout_page(#[case] path: &str) {
    let app = routed_app!(MockPerformerService::new(), MockRoleService::new());
    let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(path).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok()),
        Some("no-cache, no-store, must-revalidate")
    );
    assert!(content_type(&res).is_some_and(|value| value.starts_with("text/html")));
}

#[rstest]
#[case(Method::GET, "/api/fgw/performers")]
#[case(Method::GET, "/api/fgw/roles")]
#[case(Method::PUT, "/api/fgw/roles/upd?roleId=1")]
#[case(Method::PUT, "/admin/performers/upd")]
#[actix_web::test]
async fn anonymous_api_calls_are_unauthorized(#[case] method: Method, #[case] path: &str) {
    let app = routed_app!(MockPerformerService::new(), MockRoleService::new());
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::default()
            .method(method)
            .uri(path)
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[actix_web::test]
async fn unsupported_methods_answer_405_in_the_route_format() {
    let app = routed_app!(MockPerformerService::new(), MockRoleService::new());

    let page = actix_test::call_service(&app, actix_test::TestRequest::delete().uri("/login").to_request()).await;
    assert_eq!(page.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(content_type(&page).is_some_and(|value| value.starts_with("text/html")));

    let api = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete().uri("/api/fgw/login").to_request(),
    )
    .await;
    assert_eq!(api.status(), StatusCode::METHOD_NOT_ALLOWED);
    let payload: Error = actix_test::read_body_json(api).await;
    assert_eq!(payload.code(), ErrorCode::MethodNotAllowed);
}

#[rstest]
#[actix_web::test]
async fn api_login_cookie_opens_guarded_routes_by_role() {
    let mut performers = MockPerformerService::new();
    performers
        .expect_authenticate()
        .returning(|id, _| Ok(AuthOutcome::succeeded(performer_fixture(id, "Оператор О.О.", 1))));
    performers
        .expect_list_all()
        .returning(|| Ok(vec![performer_fixture(1, "Оператор О.О.", 1)]));
    let mut roles = MockRoleService::new();
    roles.expect_list_all().returning(|| Ok(vec![role_fixture(1, "Оператор")]));
    roles.expect_add().never();

    let app = routed_app!(performers, roles);
    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/login")
            .set_json(json!({"id": 1, "password": "pw"}))
            .to_request(),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = session_cookie(&login).expect("session cookie");

    let listed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/fgw/performers")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);

    let add = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/roles/add")
            .cookie(cookie)
            .set_json(json!({"id": 9, "name": "x", "description": "y"}))
            .to_request(),
    )
    .await;
    assert_eq!(add.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn malformed_api_json_uses_the_error_envelope() {
    let app = routed_app!(MockPerformerService::new(), MockRoleService::new());
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[actix_web::test]
async fn session_probe_is_public() {
    let app = routed_app!(MockPerformerService::new(), MockRoleService::new());
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::default()
            .method(Method::HEAD)
            .uri("/api/session-check")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("session-status"));
}

#[rstest]
#[actix_web::test]
async fn login_form_only_skips_for_a_live_session() {
    let mut performers = MockPerformerService::new();
    performers
        .expect_authenticate()
        .returning(|id, _| Ok(AuthOutcome::succeeded(performer_fixture(id, "Админ А.А.", 3))));
    let app = routed_app!(performers, MockRoleService::new());

    let login = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/login")
            .set_json(json!({"id": 5, "password": "pw"}))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&login).expect("session cookie");

    let live = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/").cookie(cookie.clone()).to_request(),
    )
    .await;
    let body = String::from_utf8(actix_test::read_body(live).await.to_vec()).expect("utf8");
    assert!(body.contains("/admin"));
    assert!(!body.contains("performerPassword"));

    actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/logout").cookie(cookie.clone()).to_request(),
    )
    .await;

    let stale = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(stale.status(), StatusCode::OK);
    let removal = session_cookie(&stale).expect("stale cookie is cleared");
    assert_eq!(removal.value(), "");
    let body = String::from_utf8(actix_test::read_body(stale).await.to_vec()).expect("utf8");
    assert!(body.contains("performerPassword"));
}
