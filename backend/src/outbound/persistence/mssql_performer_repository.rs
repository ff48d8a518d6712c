//! SQL Server adapter for the performer repository port.

use async_trait::async_trait;
use tracing::debug;

use super::procedures::{self, ProcedureError};
use super::rows::{answer_count, answer_flag, performer_from_row};
use super::DbPool;
use crate::domain::ports::{PerformerRepository, PerformerRepositoryError};
use crate::domain::{LoginCredentials, Performer, PerformerId, PerformerRoleUpdate};

fn to_i32(value: i64, name: &str) -> Result<i32, ProcedureError> {
    i32::try_from(value).map_err(|_| ProcedureError::Query(format!("{name} {value} out of range")))
}

fn map_rows(rows: &[tiberius::Row]) -> Result<Vec<Performer>, PerformerRepositoryError> {
    rows.iter()
        .map(performer_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Into::into)
}

/// Performer repository calling `svPerformer*` procedures.
#[derive(Clone)]
pub struct MssqlPerformerRepository {
    pool: DbPool,
}

impl MssqlPerformerRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PerformerRepository for MssqlPerformerRepository {
    async fn all(&self) -> Result<Vec<Performer>, PerformerRepositoryError> {
        let rows = procedures::fetch_all(&self.pool, procedures::PERFORMER_ALL, &[]).await?;
        map_rows(&rows)
    }

    async fn auth_by_id_and_pass(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<bool, PerformerRepositoryError> {
        let id = credentials.performer_id().get();
        let password = credentials.password();
        let row =
            procedures::fetch_one(&self.pool, procedures::PERFORMER_AUTH, &[&id, &password])
                .await?;
        Ok(answer_flag(row.as_ref())?)
    }

    async fn find_by_id(
        &self,
        id: PerformerId,
    ) -> Result<Option<Performer>, PerformerRepositoryError> {
        let raw = id.get();
        let row = procedures::fetch_one(&self.pool, procedures::PERFORMER_FIND_BY_ID, &[&raw])
            .await?;
        Ok(row.as_ref().map(performer_from_row).transpose()?)
    }

    async fn update_roles(
        &self,
        update: &PerformerRoleUpdate,
    ) -> Result<(), PerformerRepositoryError> {
        let id = update.performer_id.get();
        let forms = update.roles.forms.get();
        let fgw = update.roles.fgw.get();
        let updated_by = update.updated_by.get();
        let affected = procedures::execute(
            &self.pool,
            procedures::PERFORMER_UPDATE_BY_ID,
            &[&id, &forms, &fgw, &updated_by],
        )
        .await?;
        debug!(performer_id = id, affected, "performer update executed");
        if affected == 0 {
            return Err(PerformerRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }

    async fn exists_by_id(&self, id: PerformerId) -> Result<bool, PerformerRepositoryError> {
        let raw = id.get();
        let row = procedures::fetch_one(&self.pool, procedures::PERFORMER_EXISTS_BY_ID, &[&raw])
            .await?;
        Ok(answer_flag(row.as_ref())?)
    }

    async fn count(&self) -> Result<i64, PerformerRepositoryError> {
        let row = procedures::fetch_one(&self.pool, procedures::PERFORMERS_COUNT, &[]).await?;
        Ok(answer_count(row.as_ref())?)
    }

    async fn page(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Performer>, PerformerRepositoryError> {
        let offset = to_i32(offset, "offset")?;
        let limit = to_i32(limit, "limit")?;
        let rows =
            procedures::fetch_all(&self.pool, procedures::PERFORMERS_PAGE, &[&offset, &limit])
                .await?;
        map_rows(&rows)
    }

    async fn filter_by_id(
        &self,
        pattern: &str,
    ) -> Result<Vec<Performer>, PerformerRepositoryError> {
        let rows =
            procedures::fetch_all(&self.pool, procedures::PERFORMER_FILTER_BY_ID, &[&pattern])
                .await?;
        map_rows(&rows)
    }
}
