//! Domain primitives, ports and services.
//!
//! Purpose: define the performer and role model together with the rules
//! applied before anything reaches the database. Nothing here knows about
//! HTTP or SQL Server.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic failure payload.
//! - `Performer`, `Role`, `Audit`: records read from the database.
//! - `LoginCredentials`, `AuthOutcome`, `AuthFailure`: login flow types.
//! - `PerformerServiceImpl`, `RoleServiceImpl`: driving port implementations.

pub mod audit;
pub mod auth;
pub mod error;
pub mod performer;
pub mod performer_service;
pub mod ports;
pub mod role;
pub mod role_service;
pub mod trace_id;

pub use self::audit::Audit;
pub use self::auth::{AuthFailure, AuthOutcome, LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::performer::{Performer, PerformerId, PerformerRoleUpdate, RoleAssignment};
pub use self::performer_service::PerformerServiceImpl;
pub use self::role::{Role, RoleDraft, RoleId, RoleUpdate};
pub use self::role_service::RoleServiceImpl;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
