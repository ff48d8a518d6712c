//! Performer (employee) records and role assignments.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Audit, RoleId};

/// Employee number identifying a performer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PerformerId(i32);

impl PerformerId {
    /// Wrap a raw employee number.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw employee number.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether the id can refer to a stored performer.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for PerformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A performer as read from the database.
///
/// The password column never leaves the stored procedures and has no field
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    /// Employee number.
    pub id: PerformerId,
    /// Full name.
    pub fio: String,
    /// Access badge code.
    pub bc: String,
    /// Archived performers keep their row but cannot log in.
    pub archive: bool,
    /// Role in the forms subsystem; drives access control here.
    #[serde(rename = "idRoleAForms")]
    pub id_role_a_forms: RoleId,
    /// Role in the FGW subsystem.
    #[serde(rename = "idRoleAFGW")]
    pub id_role_a_fgw: RoleId,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: Audit,
}

impl Performer {
    /// Role consulted by access control.
    #[must_use]
    pub const fn access_role(&self) -> RoleId {
        self.id_role_a_forms
    }
}

/// The two independent role ids a performer carries.
///
/// Zero means "no role" in either subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Role in the forms subsystem.
    pub forms: RoleId,
    /// Role in the FGW subsystem.
    pub fgw: RoleId,
}

/// Request to replace a performer's role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformerRoleUpdate {
    /// Performer being changed.
    pub performer_id: PerformerId,
    /// New role ids.
    pub roles: RoleAssignment,
    /// Performer making the change.
    pub updated_by: PerformerId,
}
