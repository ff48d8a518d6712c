//! Tests for the JSON API handlers.

use super::*;
use crate::domain::ports::{MockPerformerService, MockRoleService};
use crate::domain::{AuthFailure, ErrorCode};
use crate::inbound::http::error::{json_config, query_config};
use crate::inbound::http::test_utils::{
    authenticated, mock_state, performer_fixture, session_cookie,
    test_session_middleware,
};
use actix_web::dev::Service as _;
use actix_web::http::StatusCode;
use actix_web::{App, HttpMessage, test as actix_test};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

macro_rules! api_app {
    ($state:expr) => {
        actix_test::init_service(
            App::new()
                .app_data($state)
                .app_data(json_config())
                .app_data(query_config())
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(authenticated(7, 3));
                    srv.call(req)
                })
                .wrap(test_session_middleware())
                .route("/api/fgw/login", web::post().to(login))
                .route("/api/fgw/performers", web::get().to(list_performers))
                .route("/api/fgw/performers/upd", web::put().to(update_performer))
                .route("/api/fgw/roles", web::get().to(list_roles))
                .route("/api/fgw/roles/add", web::post().to(add_role))
                .route("/api/fgw/roles/upd", web::put().to(update_role)),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn login_sets_session_and_returns_outcome() {
    let mut performers = MockPerformerService::new();
    performers
        .expect_authenticate()
        .withf(|id, password| *id == 1042 && password == "secret")
        .times(1)
        .returning(|_, _| Ok(AuthOutcome::succeeded(performer_fixture(1042, "Иванов И.И.", 3))));
    let state = mock_state(performers, MockRoleService::new());
    let sessions = std::sync::Arc::clone(&state.sessions);

    let app = api_app!(state);
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/login")
            .set_json(json!({"id": 1042, "password": "secret"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_some());
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["performer"]["id"], json!(1042));
    assert_eq!(sessions.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn failed_login_carries_outcome_in_details() {
    let mut performers = MockPerformerService::new();
    performers.expect_authenticate().returning(|_, _| {
        Err(AuthFailure::new(
            "invalid performer id or password",
            Error::unauthorized("invalid credentials"),
        ))
    });

    let app = api_app!(mock_state(performers, MockRoleService::new()));
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/login")
            .set_json(json!({"id": 1042, "password": "wrong"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&res).is_none());
    let payload: Error = actix_test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::Unauthorized);
    assert_eq!(
        payload.details().and_then(|details| details.get("success")),
        Some(&json!(false))
    );
}

#[rstest]
#[actix_web::test]
async fn lists_are_wrapped_in_named_arrays() {
    let mut performers = MockPerformerService::new();
    performers
        .expect_list_all()
        .returning(|| Ok(vec![performer_fixture(1, "А", 1), performer_fixture(2, "Б", 3)]));
    let mut roles = MockRoleService::new();
    roles.expect_list_all().returning(|| Ok(Vec::new()));

    let app = api_app!(mock_state(performers, roles));
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/fgw/performers").to_request(),
    )
    .await;
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["performers"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["performers"][1]["idRoleAForms"], json!(3));

    let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/fgw/roles").to_request())
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({"roles": []}));
}

#[rstest]
#[actix_web::test]
async fn performer_update_takes_id_from_query() {
    let mut performers = MockPerformerService::new();
    performers
        .expect_exists()
        .with(eq(PerformerId::new(55)))
        .returning(|_| Ok(true));
    performers
        .expect_update_roles()
        .withf(|update| update.performer_id == PerformerId::new(55) && update.roles.forms == RoleId::ADMIN)
        .times(1)
        .returning(|_| Ok(()));

    let app = api_app!(mock_state(performers, MockRoleService::new()));
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/fgw/performers/upd?performerId=55")
            .set_json(json!({"id": 55, "fio": "ignored", "idRoleAForms": 3, "idRoleAFGW": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: PerformerRolesUpdated = actix_test::read_body_json(res).await;
    assert_eq!(updated.performer_id, PerformerId::new(55));
}

#[rstest]
#[actix_web::test]
async fn missing_query_id_is_bad_request() {
    let mut performers = MockPerformerService::new();
    performers.expect_exists().never();

    let app = api_app!(mock_state(performers, MockRoleService::new()));
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/fgw/performers/upd")
            .set_json(json!({"idRoleAForms": 3, "idRoleAFGW": 1}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn role_add_answers_created() {
    let mut roles = MockRoleService::new();
    roles
        .expect_add()
        .withf(|draft| draft.id == RoleId::new(9) && draft.created_by == PerformerId::new(7))
        .times(1)
        .returning(|_| Ok(()));

    let app = api_app!(mock_state(MockPerformerService::new(), roles));
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/fgw/roles/add")
            .set_json(json!({"id": 9, "name": "Аудитор", "description": "Проверка"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let saved: RoleSaved = actix_test::read_body_json(res).await;
    assert_eq!(saved.role_id, RoleId::new(9));
}

#[rstest]
#[case(Error::invalid_request("name must not be empty"), StatusCode::BAD_REQUEST)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[actix_web::test]
async fn role_update_maps_service_errors(#[case] failure: Error, #[case] status: StatusCode) {
    let mut roles = MockRoleService::new();
    roles.expect_exists().returning(|_| Ok(true));
    roles
        .expect_update()
        .times(1)
        .return_once(move |_| Err(failure));

    let app = api_app!(mock_state(MockPerformerService::new(), roles));
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/fgw/roles/upd?roleId=3")
            .set_json(json!({"name": " ", "description": "x"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), status);
}
