//! Access roles.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Audit, PerformerId};

/// Role identifier shared by both subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RoleId(i32);

impl RoleId {
    /// Role granting access to the administration pages.
    pub const ADMIN: Self = Self(3);

    /// Wrap a raw role id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw role id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether this is the administrator role.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.0 == Self::ADMIN.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A role as read from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role id.
    pub id: RoleId,
    /// Short display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Audit columns.
    #[serde(flatten)]
    pub audit: Audit,
    /// Set by the roles page for the row being edited; never stored.
    #[serde(default)]
    pub is_editing: bool,
}

/// A role to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    /// Chosen role id.
    pub id: RoleId,
    /// Short display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Performer creating the role.
    pub created_by: PerformerId,
}

/// Replacement name and description for an existing role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleUpdate {
    /// Role being changed.
    pub id: RoleId,
    /// New display name.
    pub name: String,
    /// New description.
    pub description: String,
    /// Performer making the change.
    pub updated_by: PerformerId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, false)]
    #[case(2, false)]
    #[case(3, true)]
    fn only_role_three_is_admin(#[case] raw: i32, #[case] admin: bool) {
        assert_eq!(RoleId::new(raw).is_admin(), admin);
    }

    #[rstest]
    fn editing_flag_defaults_when_absent() {
        let role: Role = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Viewer",
            "description": "Read only",
            "createdBy": null,
            "createdAt": null,
            "updatedBy": null,
            "updatedAt": null
        }))
        .expect("role deserializes");
        assert!(!role.is_editing);
        assert_eq!(role.id, RoleId::new(4));
    }
}
