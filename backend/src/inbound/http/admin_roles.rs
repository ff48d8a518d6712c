//! Administrator view of roles.
//!
//! ```text
//! GET      /admin/roles       role table with inline editing
//! POST     /admin/roles/add   form roleId, name, description; 303 back to the table
//! PUT|POST /admin/roles/upd   {"roleId":4,"name":"...","description":"..."}
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::info;

use super::ApiResult;
use super::auth_middleware::AuthenticatedPerformer;
use super::dto::{RoleEditRequest, RoleForm, RoleSaved, mutation_timestamp};
use super::error::{HtmlResultExt, PageResult};
use super::pages::{AdminHeader, html_response};
use super::state::HttpState;
use super::templates;
use crate::domain::{Error, Role, RoleDraft, RoleId, RoleUpdate};

const ROLES_PAGE: &str = "/admin/roles";

#[derive(Serialize)]
struct RolesPage {
    #[serde(flatten)]
    header: AdminHeader,
    roles: Vec<Role>,
}

/// `GET /admin/roles`.
///
/// # Errors
/// Renders the error page when a lookup fails.
pub async fn roles_page(
    req: HttpRequest,
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
) -> PageResult<HttpResponse> {
    let (roles, header) = futures_util::future::join(
        state.roles.list_all(),
        AdminHeader::load(&state, &performer, "Список ролей", "roles"),
    )
    .await;
    let context = RolesPage {
        header: header.or_page(&req)?,
        roles: roles.or_page(&req)?,
    };
    templates::render("roles.html", &context)
        .map(html_response)
        .or_page(&req)
}

/// `POST /admin/roles/add`.
///
/// # Errors
/// Renders the error page for invalid input or a repository failure.
pub async fn add_role(
    req: HttpRequest,
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    form: web::Form<RoleForm>,
) -> PageResult<HttpResponse> {
    let form = form.into_inner();
    let id = RoleId::new(form.role_id);
    state
        .roles
        .add(RoleDraft {
            id,
            name: form.name,
            description: form.description,
            created_by: performer.performer_id,
        })
        .await
        .or_page(&req)?;
    info!(role_id = id.get(), created_by = performer.performer_id.get(), "role added from admin page");
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, ROLES_PAGE))
        .finish())
}

/// Check the role exists, then apply `update`.
pub(crate) async fn apply_role_update(state: &HttpState, update: RoleUpdate) -> ApiResult<RoleSaved> {
    let role_id = update.id;
    let actor = update.updated_by;
    if !state.roles.exists(role_id).await? {
        return Err(Error::not_found(format!("role {role_id} not found")));
    }
    state.roles.update(update).await?;
    Ok(RoleSaved {
        success: true,
        message: "Роль успешно обновлена".to_owned(),
        role_id,
        updated_at: mutation_timestamp(state.sessions.now()),
        updated_by: actor,
    })
}

/// `PUT|POST /admin/roles/upd`.
///
/// # Errors
/// `not_found` for an unknown role; validation and repository failures as
/// reported by the service.
pub async fn update_role(
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    payload: web::Json<RoleEditRequest>,
) -> ApiResult<web::Json<RoleSaved>> {
    let body = payload.into_inner();
    apply_role_update(
        &state,
        RoleUpdate {
            id: RoleId::new(body.role_id),
            name: body.name,
            description: body.description,
            updated_by: performer.performer_id,
        },
    )
    .await
    .map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, PerformerId};
    use crate::domain::ports::{MockPerformerService, MockRoleService};
    use crate::inbound::http::error::{form_config, json_config};
    use crate::inbound::http::test_utils::{
        authenticated, mock_state, performer_fixture, role_fixture,
    };
    use actix_web::dev::Service as _;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpMessage, test as actix_test};
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    macro_rules! roles_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($state)
                    .app_data(json_config())
                    .app_data(form_config())
                    .wrap_fn(|req, srv| {
                        req.extensions_mut().insert(authenticated(7, 3));
                        srv.call(req)
                    })
                    .route("/admin/roles", web::get().to(roles_page))
                    .route("/admin/roles/add", web::post().to(add_role))
                    .route("/admin/roles/upd", web::put().to(update_role)),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn roles_page_lists_roles() {
        let mut performers = MockPerformerService::new();
        performers
            .expect_find_by_id()
            .returning(|_| Ok(performer_fixture(7, "Петров П.П.", 3)));
        let mut roles = MockRoleService::new();
        roles
            .expect_find_by_id()
            .returning(|_| Ok(role_fixture(3, "Администратор")));
        roles
            .expect_list_all()
            .returning(|| Ok(vec![role_fixture(1, "Оператор"), role_fixture(4, "Наблюдатель")]));

        let app = roles_app!(mock_state(performers, roles));
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/admin/roles").to_request())
                .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        let body = std::str::from_utf8(&body).expect("utf8");
        assert!(body.contains("Список ролей"));
        assert!(body.contains("Наблюдатель"));
    }

    #[rstest]
    #[actix_web::test]
    async fn add_form_creates_role_and_redirects() {
        let mut roles = MockRoleService::new();
        roles
            .expect_add()
            .withf(|draft| {
                draft.id == RoleId::new(4)
                    && draft.name == "Наблюдатель"
                    && draft.created_by == PerformerId::new(7)
            })
            .times(1)
            .returning(|_| Ok(()));

        let app = roles_app!(mock_state(MockPerformerService::new(), roles));
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/roles/add")
                .set_form([("roleId", "4"), ("name", "Наблюдатель"), ("description", "Только чтение")])
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some(ROLES_PAGE)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn add_form_with_bad_id_renders_error_page() {
        let mut roles = MockRoleService::new();
        roles.expect_add().never();

        let app = roles_app!(mock_state(MockPerformerService::new(), roles));
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/roles/add")
                .set_form([("roleId", "four"), ("name", "x"), ("description", "y")])
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            res.headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/html; charset=utf-8")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn update_reports_role_and_actor() {
        let mut roles = MockRoleService::new();
        roles
            .expect_exists()
            .with(eq(RoleId::new(4)))
            .returning(|_| Ok(true));
        roles
            .expect_update()
            .withf(|update| update.name == "Читатель" && update.updated_by == PerformerId::new(7))
            .times(1)
            .returning(|_| Ok(()));

        let app = roles_app!(mock_state(MockPerformerService::new(), roles));
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/admin/roles/upd")
                .set_json(json!({"roleId": 4, "name": "Читатель", "description": "Только чтение"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let saved: RoleSaved = actix_test::read_body_json(res).await;
        assert!(saved.success);
        assert_eq!(saved.role_id, RoleId::new(4));
        assert_eq!(saved.updated_by, PerformerId::new(7));
    }

    #[rstest]
    #[actix_web::test]
    async fn update_of_unknown_role_is_404() {
        let mut roles = MockRoleService::new();
        roles.expect_exists().returning(|_| Ok(false));
        roles.expect_update().never();

        let app = roles_app!(mock_state(MockPerformerService::new(), roles));
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/admin/roles/upd")
                .set_json(json!({"roleId": 40, "name": "x", "description": "y"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let payload: Error = actix_test::read_body_json(res).await;
        assert_eq!(payload.code(), ErrorCode::NotFound);
    }
}
