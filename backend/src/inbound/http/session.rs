//! Cookie session helpers to keep HTTP handlers free of framework details.
//!
//! The whole login state lives in one typed [`SessionPayload`] stored under a
//! single key of an encrypted cookie. A cookie that fails to decrypt, or a
//! payload that fails to deserialize, reads as "no session" so a tampered or
//! outdated cookie never produces a server error.

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::session_manager::{SessionClaims, SessionTicket, SessionToken};
use crate::domain::{Error, PerformerId, RoleId};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "fgw_session";
/// Browser-side lifetime of the session cookie; matches the idle timeout.
pub const SESSION_COOKIE_TTL_SECS: i64 = 1800;

pub(crate) const PAYLOAD_KEY: &str = "login";

/// Login state carried by the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Set once the credentials were accepted.
    pub authenticated: bool,
    /// Logged-in performer.
    pub performer_id: PerformerId,
    /// Role used for access decisions.
    pub role_id: RoleId,
    /// Registry token for this login.
    pub token: SessionToken,
    /// Login time.
    pub created_at: DateTime<Utc>,
    /// Last request that passed the auth check.
    pub last_activity: DateTime<Utc>,
}

impl SessionPayload {
    /// Payload for a fresh login.
    #[must_use]
    pub fn for_login(performer_id: PerformerId, role_id: RoleId, ticket: SessionTicket) -> Self {
        Self {
            authenticated: true,
            performer_id,
            role_id,
            token: ticket.token,
            created_at: ticket.created_at,
            last_activity: ticket.created_at,
        }
    }

    /// Identity and timing the registry checks against.
    #[must_use]
    pub const fn claims(&self) -> SessionClaims {
        SessionClaims {
            performer_id: self.performer_id,
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }
}

/// Build the cookie session middleware.
///
/// The cookie is encrypted (`Private`), `HttpOnly`, scoped to `/` and expires
/// after [`SESSION_COOKIE_TTL_SECS`] unless refreshed.
#[must_use]
pub fn cookie_session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(same_site)
        .cookie_content_security(CookieContentSecurity::Private)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(CookieDuration::seconds(SESSION_COOKIE_TTL_SECS)),
        )
        .build()
}

/// Newtype wrapper that exposes typed session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// The stored payload, if the cookie holds a readable one.
    #[must_use]
    pub fn payload(&self) -> Option<SessionPayload> {
        match self.0.get::<SessionPayload>(PAYLOAD_KEY) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "unreadable session payload; treating as anonymous");
                None
            }
        }
    }

    /// Store `payload`, replacing anything already in the session.
    ///
    /// # Errors
    /// Returns an internal error when the payload cannot be serialized.
    pub fn persist(&self, payload: &SessionPayload) -> Result<(), Error> {
        self.0
            .insert(PAYLOAD_KEY, payload)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Clear the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Start a new session for a successful login.
    ///
    /// The cookie key is renewed so an identifier planted before login is
    /// never reused afterwards.
    ///
    /// # Errors
    /// Returns an internal error when the payload cannot be serialized.
    pub fn begin(&self, payload: &SessionPayload) -> Result<(), Error> {
        self.0.renew();
        self.persist(payload)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};

    fn fixture_payload() -> SessionPayload {
        let now = Utc::now();
        SessionPayload::for_login(
            PerformerId::new(1042),
            RoleId::ADMIN,
            SessionTicket {
                token: SessionToken::generate(),
                created_at: now,
            },
        )
    }

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/set",
                web::get().to(|session: SessionContext| async move {
                    session.begin(&fixture_payload())?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/get",
                web::get().to(|session: SessionContext| async move {
                    match session.payload() {
                        Some(payload) => HttpResponse::Ok().body(payload.performer_id.to_string()),
                        None => HttpResponse::Unauthorized().finish(),
                    }
                }),
            )
            .route(
                "/garbage",
                web::get().to(|session: actix_session::Session| async move {
                    session
                        .insert(PAYLOAD_KEY, "not a payload")
                        .expect("insert raw value");
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/purge",
                web::get().to(|session: SessionContext| async move {
                    session.purge();
                    HttpResponse::Ok()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_payload() {
        let app = actix_test::init_service(session_test_app()).await;

        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let get_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(get_res).await, "1042");
    }

    #[actix_web::test]
    async fn missing_cookie_reads_as_anonymous() {
        let app = actix_test::init_service(session_test_app()).await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/get").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn malformed_payload_reads_as_anonymous() {
        let app = actix_test::init_service(session_test_app()).await;
        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/garbage").to_request()).await;
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn purge_expires_cookie() {
        let app = actix_test::init_service(session_test_app()).await;
        let set_res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/purge").cookie(cookie).to_request(),
        )
        .await;
        let removal = session_cookie(&res).expect("removal cookie");
        assert_eq!(removal.value(), "");
    }

    #[actix_web::test]
    async fn production_cookie_is_private_http_only_and_strict() {
        let app = actix_test::init_service(
            App::new()
                .wrap(cookie_session_middleware(Key::generate(), true, SameSite::Strict))
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.begin(&fixture_payload())?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&res).expect("session cookie set");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.max_age(),
            Some(CookieDuration::seconds(SESSION_COOKIE_TTL_SECS))
        );
        assert!(!cookie.value().contains("1042"));
    }
}
