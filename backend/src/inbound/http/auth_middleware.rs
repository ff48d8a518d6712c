//! Authentication and role guards for protected routes.
//!
//! [`RequireAuth`] turns the session cookie into an [`AuthenticatedPerformer`]
//! stored in request extensions. [`RequireRole`] reads that value, so it must
//! be wrapped inside `RequireAuth`. Actix runs the last `wrap` first:
//!
//! ```ignore
//! web::resource("/admin")
//!     .wrap(RequireRole::admin(AuthMode::Html))
//!     .wrap(RequireAuth::new(sessions.clone(), AuthMode::Html))
//! ```
//!
//! A session that is missing, unreadable, unauthenticated or refused by the
//! [`SessionManager`] is purged. HTML routes answer with the logout page,
//! JSON routes with a 401 envelope.

use std::future::{Ready, ready};
use std::sync::Arc;

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{self, ContentType, HeaderMap, HeaderValue};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use super::error::{HtmlError, NO_STORE};
use super::session::{SessionContext, SessionPayload};
use super::session_manager::{SessionManager, SessionRejection, SessionToken};
use super::templates::RedirectPage;
use crate::domain::{Error, PerformerId, RoleId};

const LOGOUT_CACHE_CONTROL: &str = "no-cache, no-store, must-revalidate";

/// How a guard reports failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Browser pages: logout page or 403 error page.
    Html,
    /// API calls: JSON error envelope.
    Json,
}

impl AuthMode {
    fn unauthenticated(self, req: &HttpRequest) -> HttpResponse {
        match self {
            Self::Html => logout_response(req),
            Self::Json => Error::unauthorized("authentication required").error_response(),
        }
    }

    fn forbidden(self, req: &HttpRequest) -> HttpResponse {
        let error = Error::forbidden("Доступ запрещен: недостаточно прав");
        match self {
            Self::Html => HtmlError::new(req, error).error_response(),
            Self::Json => error.error_response(),
        }
    }
}

/// The logout interstitial, served after voluntary and forced logout.
///
/// Carries no-cache headers so the browser never replays an authenticated
/// page from history.
#[must_use]
pub fn logout_response(req: &HttpRequest) -> HttpResponse {
    match RedirectPage::logout(req.path()).render() {
        Ok(body) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, LOGOUT_CACHE_CONTROL))
            .insert_header((header::PRAGMA, "no-cache"))
            .insert_header((header::EXPIRES, "0"))
            .content_type(ContentType::html())
            .body(body),
        Err(error) => HtmlError::new(req, error).error_response(),
    }
}

fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("same-origin"),
    );
}

pub(crate) fn apply_no_store(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Identity of the performer behind an accepted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPerformer {
    /// Logged-in performer.
    pub performer_id: PerformerId,
    /// Role used for access decisions.
    pub role_id: RoleId,
    /// Registry token of the session.
    pub token: SessionToken,
    /// Login time.
    pub created_at: DateTime<Utc>,
}

impl From<SessionPayload> for AuthenticatedPerformer {
    fn from(payload: SessionPayload) -> Self {
        Self {
            performer_id: payload.performer_id,
            role_id: payload.role_id,
            token: payload.token,
            created_at: payload.created_at,
        }
    }
}

impl FromRequest for AuthenticatedPerformer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Self>()
                .cloned()
                .ok_or_else(|| Error::unauthorized("authentication required")),
        )
    }
}

#[derive(Debug, thiserror::Error)]
enum Denial {
    #[error("no session")]
    NoSession,
    #[error("session is not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Rejected(#[from] SessionRejection),
    #[error("session could not be refreshed")]
    Unrefreshable,
}

fn authenticate(
    session: &SessionContext,
    sessions: &SessionManager,
) -> Result<AuthenticatedPerformer, Denial> {
    let mut payload = session.payload().ok_or(Denial::NoSession)?;
    if !payload.authenticated {
        return Err(Denial::NotAuthenticated);
    }
    sessions.validate(&payload.token, payload.claims())?;
    payload.last_activity = sessions.touch(&payload.token);
    session
        .persist(&payload)
        .map_err(|_| Denial::Unrefreshable)?;
    Ok(AuthenticatedPerformer::from(payload))
}

fn reject<B>(
    req: ServiceRequest,
    build: impl FnOnce(&HttpRequest) -> HttpResponse,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, actix_web::Error>>
where
    B: 'static,
{
    let (request, _) = req.into_parts();
    let mut response = build(&request);
    apply_security_headers(response.headers_mut());
    let response = ServiceResponse::new(request, response.map_into_right_body());
    Box::pin(async move { Ok(response) })
}

/// Guard admitting only requests with a valid authenticated session.
#[derive(Clone)]
pub struct RequireAuth {
    sessions: Arc<SessionManager>,
    mode: AuthMode,
}

impl RequireAuth {
    /// Guard backed by `sessions`.
    #[must_use]
    pub const fn new(sessions: Arc<SessionManager>, mode: AuthMode) -> Self {
        Self { sessions, mode }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service,
            sessions: Arc::clone(&self.sessions),
            mode: self.mode,
        }))
    }
}

/// Service produced by [`RequireAuth`].
pub struct RequireAuthService<S> {
    service: S,
    sessions: Arc<SessionManager>,
    mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = SessionContext::new(req.get_session());
        match authenticate(&session, &self.sessions) {
            Ok(performer) => {
                debug!(performer_id = performer.performer_id.get(), "session accepted");
                req.extensions_mut().insert(performer);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let mut res = fut.await?;
                    apply_security_headers(res.headers_mut());
                    apply_no_store(res.headers_mut());
                    Ok(res.map_into_left_body())
                })
            }
            Err(denial) => {
                warn!(reason = %denial, path = req.path(), "forcing logout");
                session.purge();
                let mode = self.mode;
                reject(req, |request| mode.unauthenticated(request))
            }
        }
    }
}

/// Guard admitting only performers whose role is in an allow-list.
#[derive(Clone)]
pub struct RequireRole {
    allowed: Arc<[RoleId]>,
    mode: AuthMode,
}

impl RequireRole {
    /// Admit the roles in `allowed`.
    #[must_use]
    pub fn new(allowed: &[RoleId], mode: AuthMode) -> Self {
        Self {
            allowed: Arc::from(allowed),
            mode,
        }
    }

    /// Admit administrators only.
    #[must_use]
    pub fn admin(mode: AuthMode) -> Self {
        Self::new(&[RoleId::ADMIN], mode)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            allowed: Arc::clone(&self.allowed),
            mode: self.mode,
        }))
    }
}

/// Service produced by [`RequireRole`].
pub struct RequireRoleService<S> {
    service: S,
    allowed: Arc<[RoleId]>,
    mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = req
            .extensions()
            .get::<AuthenticatedPerformer>()
            .map(|performer| (performer.performer_id, performer.role_id));
        let mode = self.mode;

        match identity {
            Some((_, role_id)) if self.allowed.contains(&role_id) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Some((performer_id, role_id)) => {
                warn!(
                    performer_id = performer_id.get(),
                    role_id = role_id.get(),
                    path = req.path(),
                    "role not permitted"
                );
                reject(req, |request| mode.forbidden(request))
            }
            None => {
                warn!(path = req.path(), "role check without an authenticated performer");
                SessionContext::new(req.get_session()).purge();
                reject(req, |request| mode.unauthenticated(request))
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_middleware_tests.rs"]
mod tests;
