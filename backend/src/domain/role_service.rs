//! Role domain service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{RoleRepository, RoleRepositoryError, RoleService};
use crate::domain::{Error, PerformerId, Role, RoleDraft, RoleId, RoleUpdate};

fn map_repository_error(error: RoleRepositoryError) -> Error {
    match error {
        RoleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("role repository unavailable: {message}"))
        }
        RoleRepositoryError::Query { message } | RoleRepositoryError::Scan { message } => {
            Error::internal(format!("role repository error: {message}"))
        }
        RoleRepositoryError::NotFound { message } => {
            Error::not_found(format!("role {message} not found"))
        }
    }
}

fn require_role_id(id: RoleId) -> Result<(), Error> {
    if id.get() > 0 {
        Ok(())
    } else {
        Err(Error::invalid_request("roleId must be positive")
            .with_details(json!({ "field": "roleId", "value": id.get() })))
    }
}

fn require_actor(id: PerformerId, field: &str) -> Result<(), Error> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(Error::invalid_request(format!("{field} must be positive"))
            .with_details(json!({ "field": field, "value": id.get() })))
    }
}

fn require_text(value: &str, field: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::invalid_request(format!("{field} must not be empty"))
            .with_details(json!({ "field": field })))
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Role service backed by a [`RoleRepository`].
#[derive(Clone)]
pub struct RoleServiceImpl<R> {
    repo: Arc<R>,
}

impl<R> RoleServiceImpl<R> {
    /// Create a service over `repo`.
    pub const fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> RoleService for RoleServiceImpl<R>
where
    R: RoleRepository,
{
    async fn list_all(&self) -> Result<Vec<Role>, Error> {
        self.repo.all().await.map_err(map_repository_error)
    }

    async fn find_by_id(&self, id: RoleId) -> Result<Role, Error> {
        require_role_id(id)?;
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("role {id} not found")))
    }

    async fn add(&self, draft: RoleDraft) -> Result<(), Error> {
        require_role_id(draft.id)?;
        require_actor(draft.created_by, "createdBy")?;
        let draft = RoleDraft {
            name: require_text(&draft.name, "name")?,
            description: require_text(&draft.description, "description")?,
            ..draft
        };

        self.repo.add(&draft).await.map_err(map_repository_error)?;
        info!(role_id = %draft.id, created_by = %draft.created_by, "role created");
        Ok(())
    }

    async fn update(&self, update: RoleUpdate) -> Result<(), Error> {
        require_role_id(update.id)?;
        require_actor(update.updated_by, "updatedBy")?;
        let update = RoleUpdate {
            name: require_text(&update.name, "name")?,
            description: require_text(&update.description, "description")?,
            ..update
        };

        self.repo
            .update(&update)
            .await
            .map_err(map_repository_error)?;
        info!(role_id = %update.id, updated_by = %update.updated_by, "role updated");
        Ok(())
    }

    async fn exists(&self, id: RoleId) -> Result<bool, Error> {
        require_role_id(id)?;
        self.repo.exists_by_id(id).await.map_err(map_repository_error)
    }

    async fn delete_by_id(&self, id: RoleId) -> Result<(), Error> {
        require_role_id(id)?;
        self.repo
            .delete_by_id(id)
            .await
            .map_err(map_repository_error)?;
        info!(role_id = %id, "role deleted");
        Ok(())
    }
}
