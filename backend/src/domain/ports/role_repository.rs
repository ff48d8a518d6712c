//! Port for role persistence.

use async_trait::async_trait;

use crate::domain::{Role, RoleDraft, RoleId, RoleUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by role repository adapters.
    pub enum RoleRepositoryError {
        /// The database could not be reached.
        Connection => "role repository connection failed: {message}",
        /// A stored procedure failed while executing.
        Query => "role repository query failed: {message}",
        /// A returned row did not have the expected shape.
        Scan => "role row could not be read: {message}",
        /// An update or delete matched no rows.
        NotFound => "role not found: {message}",
    }
}

/// Port for role CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Every role.
    async fn all(&self) -> Result<Vec<Role>, RoleRepositoryError>;

    /// Insert a new role.
    async fn add(&self, draft: &RoleDraft) -> Result<(), RoleRepositoryError>;

    /// Look a role up by id.
    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError>;

    /// Replace name and description; fails with `NotFound` when no row changed.
    async fn update(&self, update: &RoleUpdate) -> Result<(), RoleRepositoryError>;

    /// Whether a role with `id` exists.
    async fn exists_by_id(&self, id: RoleId) -> Result<bool, RoleRepositoryError>;

    /// Delete a role; fails with `NotFound` when no row was removed.
    async fn delete_by_id(&self, id: RoleId) -> Result<(), RoleRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoleRepository;

#[async_trait]
impl RoleRepository for FixtureRoleRepository {
    async fn all(&self) -> Result<Vec<Role>, RoleRepositoryError> {
        Ok(Vec::new())
    }

    async fn add(&self, _draft: &RoleDraft) -> Result<(), RoleRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: RoleId) -> Result<Option<Role>, RoleRepositoryError> {
        Ok(None)
    }

    async fn update(&self, update: &RoleUpdate) -> Result<(), RoleRepositoryError> {
        Err(RoleRepositoryError::not_found(update.id.to_string()))
    }

    async fn exists_by_id(&self, _id: RoleId) -> Result<bool, RoleRepositoryError> {
        Ok(false)
    }

    async fn delete_by_id(&self, id: RoleId) -> Result<(), RoleRepositoryError> {
        Err(RoleRepositoryError::not_found(id.to_string()))
    }
}
