//! Session probe used by the browser scripts.
//!
//! ```text
//! HEAD /api/session-check   Session-Status header only
//! GET  /api/session-check   header plus {"status","performerId","roleId","createdAt","sessionAge"}
//! ```
//!
//! Anything other than an active session answers 401. The probe never clears
//! the cookie; the script follows a non-active status to `/logout`.

use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder, web};
use chrono::{DateTime, Local, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use super::auth_middleware::apply_no_store;
use super::session::SessionContext;
use super::session_manager::SessionRejection;
use super::state::HttpState;
use crate::domain::{PerformerId, RoleId};

/// Response header carrying the probe result.
pub const SESSION_STATUS_HEADER: &str = "Session-Status";

/// What the probe found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No readable session cookie.
    NoSession,
    /// A cookie without a valid login.
    NotAuthenticated,
    /// The login outlived its idle or absolute limit.
    Expired,
    /// A usable login.
    Active,
}

impl SessionStatus {
    /// Header value for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoSession => "no-session",
            Self::NotAuthenticated => "not-authenticated",
            Self::Expired => "expired",
            Self::Active => "active",
        }
    }
}

impl From<SessionRejection> for SessionStatus {
    fn from(rejection: SessionRejection) -> Self {
        match rejection {
            SessionRejection::Expired | SessionRejection::Idle => Self::Expired,
            SessionRejection::Revoked
            | SessionRejection::Mismatch
            | SessionRejection::MissingToken => Self::NotAuthenticated,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveSession {
    status: &'static str,
    performer_id: PerformerId,
    role_id: RoleId,
    created_at: String,
    session_age: String,
}

/// Render a duration the way people read it: `1h2m3s`, `4m0s`, `12s`.
pub(crate) fn format_age(age: TimeDelta) -> String {
    let total = age.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn format_created_at(created_at: DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format("%d.%m.%Y %H:%M:%S")
        .to_string()
}

fn status_builder(status: SessionStatus) -> HttpResponseBuilder {
    let code = if status == SessionStatus::Active {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };
    let mut builder = HttpResponse::build(code);
    builder.insert_header((SESSION_STATUS_HEADER, status.as_str()));
    builder
}

fn no_store(mut response: HttpResponse) -> HttpResponse {
    apply_no_store(response.headers_mut());
    response
}

fn status_response(status: SessionStatus) -> HttpResponse {
    no_store(status_builder(status).finish())
}

/// `GET|HEAD /api/session-check`.
///
/// An active session has its activity time refreshed, like any other
/// authenticated request.
pub async fn session_check(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> HttpResponse {
    let Some(mut payload) = session.payload() else {
        return status_response(SessionStatus::NoSession);
    };
    if !payload.authenticated {
        return status_response(SessionStatus::NotAuthenticated);
    }
    if let Err(rejection) = state.sessions.validate(&payload.token, payload.claims()) {
        debug!(performer_id = payload.performer_id.get(), %rejection, "session check refused");
        return status_response(rejection.into());
    }

    payload.last_activity = state.sessions.touch(&payload.token);
    if let Err(error) = session.persist(&payload) {
        debug!(%error, "session check could not refresh activity");
    }

    if req.method() != Method::GET {
        return status_response(SessionStatus::Active);
    }
    no_store(status_builder(SessionStatus::Active).json(ActiveSession {
        status: SessionStatus::Active.as_str(),
        performer_id: payload.performer_id,
        role_id: payload.role_id,
        created_at: format_created_at(payload.created_at),
        session_age: format_age(state.sessions.now() - payload.created_at),
    }))
}
