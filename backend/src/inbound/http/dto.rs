//! Request and response bodies shared by the admin pages and the JSON API.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Performer, PerformerId, Role, RoleId};

const MUTATION_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYY-MM-DD HH:MM:SS` in server local time.
pub(crate) fn mutation_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(MUTATION_TIMESTAMP).to_string()
}

/// Login request body for `POST /api/fgw/login`.
///
/// Example JSON: `{"id":1042,"password":"secret"}`
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Employee number.
    pub id: i32,
    /// Password as typed.
    pub password: String,
}

/// Every performer.
#[derive(Debug, Serialize, ToSchema)]
pub struct PerformerList {
    /// Performers in repository order.
    pub performers: Vec<Performer>,
}

/// Every role.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleList {
    /// Roles in repository order.
    pub roles: Vec<Role>,
}

/// Role assignment posted by the performers page.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformerRolesRequest {
    /// Performer being changed.
    pub performer_id: i32,
    /// Forms subsystem role; zero clears it.
    pub id_role_a_forms: i32,
    /// FGW subsystem role; zero clears it.
    #[serde(rename = "idRoleAFGW")]
    pub id_role_a_fgw: i32,
}

/// Role assignment sent to `PUT /api/fgw/performers/upd?performerId=`.
///
/// Other performer fields may be present and are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleAssignmentRequest {
    /// Forms subsystem role; zero clears it.
    #[serde(rename = "idRoleAForms")]
    pub id_role_a_forms: i32,
    /// FGW subsystem role; zero clears it.
    #[serde(rename = "idRoleAFGW")]
    pub id_role_a_fgw: i32,
}

/// Query selecting the performer to update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformerIdQuery {
    /// Target performer.
    pub performer_id: i32,
}

/// Query selecting the role to update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleIdQuery {
    /// Target role.
    pub role_id: i32,
}

/// Role edit posted by the roles page.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleEditRequest {
    /// Role being changed.
    pub role_id: i32,
    /// New display name.
    pub name: String,
    /// New description.
    pub description: String,
}

/// Role fields sent to the JSON API.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleBody {
    /// Role id; required when creating, ignored when updating.
    #[serde(default)]
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// Form posted by the "add role" dialog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleForm {
    /// Chosen role id.
    pub role_id: i32,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Result of a performer role change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformerRolesUpdated {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Performer that changed.
    pub performer_id: PerformerId,
    /// When the change was applied.
    pub updated_at: String,
    /// Performer who made the change.
    pub updated_by: PerformerId,
}

/// Result of creating or changing a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleSaved {
    /// Always `true`; failures use the error envelope.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Role that was saved.
    pub role_id: RoleId,
    /// When the change was applied.
    pub updated_at: String,
    /// Performer who made the change.
    pub updated_by: PerformerId,
}
