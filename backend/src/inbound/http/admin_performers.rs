//! Administrator view of performers.
//!
//! ```text
//! GET      /admin/performers?page=&search=   paginated list, optional id search
//! PUT|POST /admin/performers/upd             {"performerId":1,"idRoleAForms":3,"idRoleAFGW":0}
//! ```

use actix_web::{HttpRequest, HttpResponse, web};
use pagination::{Pagination, calculate_page, offset_for, page_from_query};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ApiResult;
use super::auth_middleware::AuthenticatedPerformer;
use super::dto::{PerformerRolesRequest, PerformerRolesUpdated, mutation_timestamp};
use super::error::{HtmlResultExt, PageResult};
use super::pages::{AdminHeader, html_response};
use super::state::HttpState;
use super::templates;
use crate::domain::{
    Error, Performer, PerformerId, PerformerRoleUpdate, Role, RoleAssignment, RoleId,
};

/// Rows per page.
pub const PAGE_SIZE: i64 = 55;
/// Page links rendered under the table.
pub const PAGE_WINDOW: i64 = 5;
const DEFAULT_PAGE: u32 = 1;

/// Query accepted by the performers page.
#[derive(Debug, Default, Deserialize)]
pub struct PerformersQuery {
    /// Requested page; anything unusable means the first page.
    pub page: Option<String>,
    /// Employee number fragment.
    pub search: Option<String>,
}

#[derive(Serialize)]
struct PerformersPage {
    #[serde(flatten)]
    header: AdminHeader,
    performers: Vec<Performer>,
    roles: Vec<Role>,
    pagination: Pagination,
    search_query: String,
    is_search: bool,
}

fn pagination_error(error: pagination::PaginationError) -> Error {
    Error::internal(format!("pagination failed: {error}"))
}

/// One page of performers, either the full listing or search results.
///
/// Search results come back in one piece and are sliced here.
async fn load_listing(
    state: &HttpState,
    requested_page: i64,
    search: &str,
) -> Result<(Vec<Performer>, Pagination), Error> {
    let (rows, total, page) = if search.is_empty() {
        let total = state.performers.count().await?;
        let calc = calculate_page(total, PAGE_SIZE, requested_page).map_err(pagination_error)?;
        let rows = state
            .performers
            .page(offset_for(calc.page, PAGE_SIZE), PAGE_SIZE)
            .await?;
        (rows, total, calc.page)
    } else {
        let found = state.performers.search_by_id(search).await?;
        let total = i64::try_from(found.len()).unwrap_or(i64::MAX);
        let calc = calculate_page(total, PAGE_SIZE, requested_page).map_err(pagination_error)?;
        let offset = usize::try_from(offset_for(calc.page, PAGE_SIZE)).unwrap_or_default();
        let page_len = usize::try_from(PAGE_SIZE).unwrap_or(usize::MAX);
        let rows = found.into_iter().skip(offset).take(page_len).collect();
        (rows, total, calc.page)
    };

    let count_on_page = i64::try_from(rows.len()).unwrap_or(i64::MAX);
    let pager = Pagination::build(page, PAGE_SIZE, total, count_on_page, PAGE_WINDOW)
        .map_err(pagination_error)?;
    Ok((rows, pager))
}

/// `GET /admin/performers`.
///
/// # Errors
/// Renders the error page when a lookup fails or the search is not numeric.
pub async fn performers_page(
    req: HttpRequest,
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    query: web::Query<PerformersQuery>,
) -> PageResult<HttpResponse> {
    let query = query.into_inner();
    let page = page_from_query(query.page.as_deref(), DEFAULT_PAGE).unwrap_or(DEFAULT_PAGE);
    let search = query.search.unwrap_or_default().trim().to_owned();

    let (listing, roles, header) = futures_util::future::join3(
        load_listing(&state, i64::from(page), &search),
        state.roles.list_all(),
        AdminHeader::load(&state, &performer, "Список сотрудников", "performers"),
    )
    .await;
    let (performers, pagination) = listing.or_page(&req)?;
    debug!(
        page = pagination.page,
        total = pagination.total_count,
        search = %search,
        "performers page"
    );

    let context = PerformersPage {
        header: header.or_page(&req)?,
        performers,
        roles: roles.or_page(&req)?,
        pagination,
        is_search: !search.is_empty(),
        search_query: search,
    };
    templates::render("performers.html", &context)
        .map(html_response)
        .or_page(&req)
}

/// Check the performer exists, then replace its roles on behalf of `actor`.
pub(crate) async fn apply_role_assignment(
    state: &HttpState,
    performer_id: PerformerId,
    roles: RoleAssignment,
    actor: PerformerId,
) -> ApiResult<PerformerRolesUpdated> {
    if !state.performers.exists(performer_id).await? {
        return Err(Error::not_found(format!("performer {performer_id} not found")));
    }
    state
        .performers
        .update_roles(PerformerRoleUpdate {
            performer_id,
            roles,
            updated_by: actor,
        })
        .await?;
    Ok(PerformerRolesUpdated {
        success: true,
        message: "Роли успешно обновлены".to_owned(),
        performer_id,
        updated_at: mutation_timestamp(state.sessions.now()),
        updated_by: actor,
    })
}

/// `PUT|POST /admin/performers/upd`.
///
/// # Errors
/// `not_found` for an unknown performer; validation and repository failures
/// as reported by the service.
pub async fn update_performer_roles(
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
    payload: web::Json<PerformerRolesRequest>,
) -> ApiResult<web::Json<PerformerRolesUpdated>> {
    let body = payload.into_inner();
    apply_role_assignment(
        &state,
        PerformerId::new(body.performer_id),
        RoleAssignment {
            forms: RoleId::new(body.id_role_a_forms),
            fgw: RoleId::new(body.id_role_a_fgw),
        },
        performer.performer_id,
    )
    .await
    .map(web::Json)
}

#[cfg(test)]
#[path = "admin_performers_tests.rs"]
mod tests;
