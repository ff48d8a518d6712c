//! Driving port for role use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Role, RoleDraft, RoleId, RoleUpdate};

/// Domain use-case port for roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Every role.
    async fn list_all(&self) -> Result<Vec<Role>, Error>;

    /// Load a role or fail with `not_found`.
    async fn find_by_id(&self, id: RoleId) -> Result<Role, Error>;

    /// Create a role.
    async fn add(&self, draft: RoleDraft) -> Result<(), Error>;

    /// Change a role's name and description.
    async fn update(&self, update: RoleUpdate) -> Result<(), Error>;

    /// Whether a role exists.
    async fn exists(&self, id: RoleId) -> Result<bool, Error>;

    /// Delete a role.
    async fn delete_by_id(&self, id: RoleId) -> Result<(), Error>;
}
