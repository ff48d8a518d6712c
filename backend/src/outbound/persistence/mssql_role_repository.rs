//! SQL Server adapter for the role repository port.

use async_trait::async_trait;

use super::procedures;
use super::rows::{answer_flag, role_from_row};
use super::DbPool;
use crate::domain::ports::{RoleRepository, RoleRepositoryError};
use crate::domain::{Role, RoleDraft, RoleId, RoleUpdate};

/// Role repository calling `svRole*` procedures.
#[derive(Clone)]
pub struct MssqlRoleRepository {
    pool: DbPool,
}

impl MssqlRoleRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for MssqlRoleRepository {
    async fn all(&self) -> Result<Vec<Role>, RoleRepositoryError> {
        let rows = procedures::fetch_all(&self.pool, procedures::ROLE_ALL, &[]).await?;
        Ok(rows
            .iter()
            .map(role_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn add(&self, draft: &RoleDraft) -> Result<(), RoleRepositoryError> {
        let id = draft.id.get();
        let created_by = draft.created_by.get();
        procedures::execute(
            &self.pool,
            procedures::ROLE_ADD,
            &[&id, &draft.name.as_str(), &draft.description.as_str(), &created_by],
        )
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError> {
        let raw = id.get();
        let row = procedures::fetch_one(&self.pool, procedures::ROLE_FIND_BY_ID, &[&raw]).await?;
        Ok(row.as_ref().map(role_from_row).transpose()?)
    }

    async fn update(&self, update: &RoleUpdate) -> Result<(), RoleRepositoryError> {
        let id = update.id.get();
        let updated_by = update.updated_by.get();
        let affected = procedures::execute(
            &self.pool,
            procedures::ROLE_UPDATE_BY_ID,
            &[&id, &update.name.as_str(), &update.description.as_str(), &updated_by],
        )
        .await?;
        if affected == 0 {
            return Err(RoleRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }

    async fn exists_by_id(&self, id: RoleId) -> Result<bool, RoleRepositoryError> {
        let raw = id.get();
        let row =
            procedures::fetch_one(&self.pool, procedures::ROLE_EXISTS_BY_ID, &[&raw]).await?;
        Ok(answer_flag(row.as_ref())?)
    }

    async fn delete_by_id(&self, id: RoleId) -> Result<(), RoleRepositoryError> {
        let raw = id.get();
        let affected =
            procedures::execute(&self.pool, procedures::ROLE_DELETE_BY_ID, &[&raw]).await?;
        if affected == 0 {
            return Err(RoleRepositoryError::not_found(raw.to_string()));
        }
        Ok(())
    }
}
