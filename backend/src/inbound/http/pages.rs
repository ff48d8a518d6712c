//! Browser pages: login, logout and the two landing pages.
//!
//! ```text
//! GET  /            login form, or a redirect page when already logged in
//! GET  /login       login form with an optional ?error= message
//! POST /auth        form login (also POST /login)
//! GET  /logout      revoke the session and show the logout page
//! GET  /fgw         landing page for every authenticated performer
//! GET  /admin       administrator dashboard
//! ```

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::auth_middleware::{AuthenticatedPerformer, logout_response};
use super::error::{HtmlError, HtmlResultExt, NO_STORE, PageResult};
use super::session::{SessionContext, SessionPayload};
use super::state::HttpState;
use super::templates::{self, RedirectPage};
use crate::domain::{AuthOutcome, Error, PerformerId, RoleId};

const ADMIN_HOME: &str = "/admin";
const LANDING: &str = "/fgw";

/// Wrap rendered HTML with the headers every page carries.
pub(crate) fn html_response(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, NO_STORE))
        .insert_header((header::PRAGMA, "no-cache"))
        .insert_header((header::EXPIRES, "0"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((header::X_FRAME_OPTIONS, "DENY"))
        .content_type(ContentType::html())
        .body(body)
}

/// Where a performer lands after login.
#[must_use]
pub const fn home_for(role: RoleId) -> &'static str {
    if role.is_admin() { ADMIN_HOME } else { LANDING }
}

/// Query accepted by the login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Message from a failed login attempt.
    pub error: Option<String>,
}

/// Form posted by the login page.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    performer_id: String,
    #[serde(default)]
    performer_password: String,
}

#[derive(Serialize)]
struct LoginPage<'a> {
    error_message: Option<&'a str>,
}

fn render_login(req: &HttpRequest, error: Option<&str>) -> PageResult<HttpResponse> {
    templates::render(
        "login.html",
        LoginPage {
            error_message: error.filter(|message| !message.is_empty()),
        },
    )
    .map(html_response)
    .or_page(req)
}

fn login_redirect(message: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            header::LOCATION,
            format!("/login?error={}", urlencoding::encode(message)),
        ))
        .finish()
}

/// `GET /`: the login form, or straight on for a logged-in visitor.
///
/// Only a session the registry still honours skips the form; a revoked,
/// idle or expired cookie is dropped and the form is shown.
///
/// # Errors
/// Renders the error page when a template fails.
pub async fn index(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LoginQuery>,
) -> PageResult<HttpResponse> {
    let Some(payload) = session.payload().filter(|payload| payload.authenticated) else {
        return render_login(&req, query.error.as_deref());
    };
    if let Err(rejection) = state.sessions.validate(&payload.token, payload.claims()) {
        info!(performer_id = payload.performer_id.get(), %rejection, "stale session at login form");
        session.purge();
        return render_login(&req, query.error.as_deref());
    }
    RedirectPage::already_authenticated(home_for(payload.role_id), req.path())
        .render()
        .map(html_response)
        .or_page(&req)
}

/// `GET /login`.
///
/// # Errors
/// Renders the error page when the template fails.
pub async fn login_page(req: HttpRequest, query: web::Query<LoginQuery>) -> PageResult<HttpResponse> {
    render_login(&req, query.error.as_deref())
}

/// `POST /auth`: check credentials and start a session.
///
/// Bad credentials send the browser back to the form with the reason in the
/// query string.
///
/// # Errors
/// Renders a 401 page when either field is blank and a 500 page when the
/// session cannot be written.
pub async fn authenticate(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> PageResult<HttpResponse> {
    let form = form.into_inner();
    let raw_id = form.performer_id.trim();
    if raw_id.is_empty() || form.performer_password.is_empty() {
        return Err(HtmlError::new(
            &req,
            Error::unauthorized("Введите табельный номер и пароль"),
        ));
    }
    let performer_id = raw_id.parse::<i32>().unwrap_or(0);

    match state
        .performers
        .authenticate(performer_id, &form.performer_password)
        .await
    {
        Ok(AuthOutcome {
            performer: Some(performer),
            ..
        }) => {
            let role_id = performer.access_role();
            let ticket = state.sessions.create(performer.id);
            session
                .begin(&SessionPayload::for_login(performer.id, role_id, ticket))
                .or_page(&req)?;
            info!(
                performer_id = performer.id.get(),
                role_id = role_id.get(),
                "browser login"
            );
            RedirectPage::login_success(home_for(role_id))
                .render()
                .map(html_response)
                .or_page(&req)
        }
        Ok(outcome) => Ok(login_redirect(&outcome.message)),
        Err(failure) => Ok(login_redirect(&failure.outcome.message)),
    }
}

/// `GET /logout`.
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    if let Some(payload) = session.payload() {
        state.sessions.revoke(&payload.token);
        info!(performer_id = payload.performer_id.get(), "logout");
    }
    session.purge();
    logout_response(&req)
}

#[derive(Serialize)]
struct LandingPage {
    performer_id: PerformerId,
    role_id: RoleId,
}

/// `GET /fgw`.
///
/// # Errors
/// Renders the error page when the template fails.
pub async fn landing(req: HttpRequest, performer: AuthenticatedPerformer) -> PageResult<HttpResponse> {
    templates::render(
        "landing.html",
        LandingPage {
            performer_id: performer.performer_id,
            role_id: performer.role_id,
        },
    )
    .map(html_response)
    .or_page(&req)
}

/// Header shared by the admin pages: who is logged in and which tab is
/// active.
#[derive(Debug, Clone, Serialize)]
pub struct AdminHeader {
    /// Page title.
    pub title: &'static str,
    /// Highlighted navigation entry.
    pub current_page: &'static str,
    /// Full name of the logged-in performer.
    pub performer_fio: String,
    /// Logged-in performer.
    pub performer_id: PerformerId,
    /// Display name of the performer's role.
    pub performer_role: String,
}

impl AdminHeader {
    /// Look up the performer's name and role name.
    ///
    /// # Errors
    /// Propagates lookup failures from either service.
    pub async fn load(
        state: &HttpState,
        performer: &AuthenticatedPerformer,
        title: &'static str,
        current_page: &'static str,
    ) -> Result<Self, Error> {
        let (profile, role) = futures_util::future::join(
            state.performers.find_by_id(performer.performer_id),
            state.roles.find_by_id(performer.role_id),
        )
        .await;
        Ok(Self {
            title,
            current_page,
            performer_fio: profile?.fio,
            performer_id: performer.performer_id,
            performer_role: role?.name,
        })
    }

    fn unnamed(performer: &AuthenticatedPerformer, title: &'static str, current_page: &'static str) -> Self {
        Self {
            title,
            current_page,
            performer_fio: String::new(),
            performer_id: performer.performer_id,
            performer_role: String::new(),
        }
    }
}

/// `GET /admin`.
///
/// The dashboard still renders when the name lookups fail; the header is
/// left blank.
///
/// # Errors
/// Renders the error page when the template fails.
pub async fn admin_home(
    req: HttpRequest,
    state: web::Data<HttpState>,
    performer: AuthenticatedPerformer,
) -> PageResult<HttpResponse> {
    const TITLE: &str = "Панель администратора";
    const TAB: &str = "dashboard";

    let header = match AdminHeader::load(&state, &performer, TITLE, TAB).await {
        Ok(header) => header,
        Err(error) => {
            warn!(%error, performer_id = performer.performer_id.get(), "dashboard header lookup failed");
            AdminHeader::unnamed(&performer, TITLE, TAB)
        }
    };
    templates::render("admin.html", &header)
        .map(html_response)
        .or_page(&req)
}
