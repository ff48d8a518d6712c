//! JSON API for performers and roles.
//!
//! ```text
//! POST /api/fgw/login                         {"id":1042,"password":"secret"}
//! GET  /api/fgw/performers
//! PUT  /api/fgw/performers/upd?performerId=1  {"idRoleAForms":3,"idRoleAFGW":0}
//! GET  /api/fgw/roles
//! POST /api/fgw/roles/add                     {"id":4,"name":"...","description":"..."}
//! PUT  /api/fgw/roles/upd?roleId=4            {"name":"...","description":"..."}
//! ```
//!
//! Every response except login requires a session; changes require the
//! administrator role.

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::info;

use super::ApiResult;
use super::admin_performers::apply_role_assignment;
use super::admin_roles::apply_role_update;
use super::auth_middleware::AuthenticatedPerformer;
use super::dto::{
    LoginRequest, PerformerIdQuery, PerformerList, PerformerRolesUpdated, RoleAssignmentRequest,
    RoleBody, RoleIdQuery, RoleList, RoleSaved, mutation_timestamp,
};
use super::session::{SessionContext, SessionPayload};
use super::state::HttpState;
use crate::domain::{
    AuthOutcome, Error, PerformerId, RoleAssignment, RoleDraft, RoleId, RoleUpdate,
};

/// Authenticate a performer and establish a session.
///
/// A failed attempt answers with the error envelope; its `details` carry the
/// same outcome object a success returns.
///
/// # Errors
/// `invalid_request` for malformed credentials, `unauthorized` for a
/// mismatch, `service_unavailable` when the database is down.
#[utoipa::path(
    post,
    path = "/api/fgw/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthOutcome,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthOutcome>> {
    let request = payload.into_inner();
    let outcome = state
        .performers
        .authenticate(request.id, &request.password)
        .await
        .map_err(|failure| failure.error.with_details(json!(failure.outcome)))?;

    let Some(performer) = outcome.performer.as_ref() else {
        return Err(Error::unauthorized(outcome.message.clone()));
    };
    let role_id = performer.access_role();
    let ticket = state.sessions.create(performer.id);
    session.begin(&SessionPayload::for_login(performer.id, role_id, ticket))?;
    info!(performer_id = performer.id.get(), role_id = role_id.get(), "api login");
    Ok(web::Json(outcome))
}

/// List every performer.
///
/// # Errors
/// Repository failures.
#[utoipa::path(
    get,
    path = "/api/fgw/performers",
    responses(
        (status = 200, description = "Performers", body = PerformerList),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["performers"],
    operation_id = "listPerformers"
)]
pub async fn list_performers(state: web::Data<HttpState>) -> ApiResult<web::Json<PerformerList>> {
    let performers = state.performers.list_all().await?;
    Ok(web::Json(PerformerList { performers }))
}

/// Replace a performer's role assignment.
///
/// # Errors
/// `not_found` for an unknown performer; validation and repository failures.
#[utoipa::path(
    put,
    path = "/api/fgw/performers/upd",
    params(("performerId" = i32, Query, description = "Performer to change")),
    request_body = RoleAssignmentRequest,
    responses(
        (status = 200, description = "Roles updated", body = PerformerRolesUpdated),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Performer not found", body = Error)
    ),
    tags = ["performers"],
    operation_id = "updatePerformerRoles"
)]
pub async fn update_performer(
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    query: web::Query<PerformerIdQuery>,
    payload: web::Json<RoleAssignmentRequest>,
) -> ApiResult<web::Json<PerformerRolesUpdated>> {
    let body = payload.into_inner();
    apply_role_assignment(
        &state,
        PerformerId::new(query.performer_id),
        RoleAssignment {
            forms: RoleId::new(body.id_role_a_forms),
            fgw: RoleId::new(body.id_role_a_fgw),
        },
        performer.performer_id,
    )
    .await
    .map(web::Json)
}

/// List every role.
///
/// # Errors
/// Repository failures.
#[utoipa::path(
    get,
    path = "/api/fgw/roles",
    responses(
        (status = 200, description = "Roles", body = RoleList),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["roles"],
    operation_id = "listRoles"
)]
pub async fn list_roles(state: web::Data<HttpState>) -> ApiResult<web::Json<RoleList>> {
    let roles = state.roles.list_all().await?;
    Ok(web::Json(RoleList { roles }))
}

/// Create a role.
///
/// # Errors
/// Validation and repository failures.
#[utoipa::path(
    post,
    path = "/api/fgw/roles/add",
    request_body = RoleBody,
    responses(
        (status = 201, description = "Role created", body = RoleSaved),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["roles"],
    operation_id = "addRole"
)]
pub async fn add_role(
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    payload: web::Json<RoleBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let role_id = RoleId::new(body.id);
    state
        .roles
        .add(RoleDraft {
            id: role_id,
            name: body.name,
            description: body.description,
            created_by: performer.performer_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(RoleSaved {
        success: true,
        message: "Роль успешно добавлена".to_owned(),
        role_id,
        updated_at: mutation_timestamp(state.sessions.now()),
        updated_by: performer.performer_id,
    }))
}

/// Change a role's name and description.
///
/// # Errors
/// `not_found` for an unknown role; validation and repository failures.
#[utoipa::path(
    put,
    path = "/api/fgw/roles/upd",
    params(("roleId" = i32, Query, description = "Role to change")),
    request_body = RoleBody,
    responses(
        (status = 200, description = "Role updated", body = RoleSaved),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Role not found", body = Error)
    ),
    tags = ["roles"],
    operation_id = "updateRole"
)]
pub async fn update_role(
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    query: web::Query<RoleIdQuery>,
    payload: web::Json<RoleBody>,
) -> ApiResult<web::Json<RoleSaved>> {
    let body = payload.into_inner();
    apply_role_update(
        &state,
        RoleUpdate {
            id: RoleId::new(query.role_id),
            name: body.name,
            description: body.description,
            updated_by: performer.performer_id,
        },
    )
    .await
    .map(web::Json)
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
