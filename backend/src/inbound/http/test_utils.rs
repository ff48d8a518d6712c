//! Test helpers for inbound HTTP components.

use std::sync::{Arc, Mutex, MutexGuard};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use super::auth_middleware::AuthenticatedPerformer;
use super::session::{SESSION_COOKIE_NAME, cookie_session_middleware};
use super::session_manager::{SessionManager, SessionToken};
use super::state::HttpState;
use crate::domain::ports::{MockPerformerService, MockRoleService};
use crate::domain::{Audit, Performer, PerformerId, Role, RoleId};

/// Session middleware for tests: fresh key per call, no `Secure` flag so
/// plain-HTTP test requests keep the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    cookie_session_middleware(Key::generate(), false, SameSite::Strict)
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Identity normally placed in request extensions by `RequireAuth`.
pub fn authenticated(performer_id: i32, role_id: i32) -> AuthenticatedPerformer {
    AuthenticatedPerformer {
        performer_id: PerformerId::new(performer_id),
        role_id: RoleId::new(role_id),
        token: SessionToken::generate(),
        created_at: Utc::now(),
    }
}

/// An active performer holding `forms_role`.
pub fn performer_fixture(id: i32, fio: &str, forms_role: i32) -> Performer {
    Performer {
        id: PerformerId::new(id),
        fio: fio.to_owned(),
        bc: format!("{id:06}"),
        archive: false,
        id_role_a_forms: RoleId::new(forms_role),
        id_role_a_fgw: RoleId::new(0),
        audit: Audit::default(),
    }
}

/// A role with an empty audit trail.
pub fn role_fixture(id: i32, name: &str) -> Role {
    Role {
        id: RoleId::new(id),
        name: name.to_owned(),
        description: format!("{name} description"),
        audit: Audit::default(),
        is_editing: false,
    }
}

/// Handler state over mocked services and a fresh session registry.
pub fn mock_state(performers: MockPerformerService, roles: MockRoleService) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(performers),
        Arc::new(roles),
        Arc::new(SessionManager::new(Arc::new(mockable::DefaultClock))),
    ))
}
