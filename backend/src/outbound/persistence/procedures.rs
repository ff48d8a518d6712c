//! Stored procedure calls and the plumbing shared by the repositories.
//!
//! The database owns all SQL; adapters only invoke procedures with
//! positional `@Pn` parameters.

use tiberius::{Row, ToSql};

use super::{DbPool, PoolError};
use crate::domain::ports::{PerformerRepositoryError, RoleRepositoryError};

pub(super) const PERFORMER_ALL: &str = "EXEC svPerformerAll";
pub(super) const PERFORMER_AUTH: &str = "EXEC svPerformerAuth @P1, @P2";
pub(super) const PERFORMER_FIND_BY_ID: &str = "EXEC svPerformerFindById @P1";
pub(super) const PERFORMER_UPDATE_BY_ID: &str = "EXEC svPerformerUpdById @P1, @P2, @P3, @P4";
pub(super) const PERFORMER_EXISTS_BY_ID: &str = "EXEC svPerformerExistsById @P1";
pub(super) const PERFORMERS_COUNT: &str = "EXEC svPerformersCount";
pub(super) const PERFORMERS_PAGE: &str = "EXEC svPerformersPagination @P1, @P2";
pub(super) const PERFORMER_FILTER_BY_ID: &str = "EXEC svPerformerFilterById @P1";

pub(super) const ROLE_ALL: &str = "EXEC svRoleAll";
pub(super) const ROLE_ADD: &str = "EXEC svRoleAdd @P1, @P2, @P3, @P4";
pub(super) const ROLE_FIND_BY_ID: &str = "EXEC svRoleFindById @P1";
pub(super) const ROLE_UPDATE_BY_ID: &str = "EXEC svRoleUpdById @P1, @P2, @P3, @P4";
pub(super) const ROLE_EXISTS_BY_ID: &str = "EXEC svRoleExistsById @P1";
pub(super) const ROLE_DELETE_BY_ID: &str = "EXEC svRoleDelById @P1";

/// Failure while calling a procedure, before it is mapped to a port error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ProcedureError {
    Connection(String),
    Query(String),
    Scan(String),
}

impl From<PoolError> for ProcedureError {
    fn from(err: PoolError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<ProcedureError> for PerformerRepositoryError {
    fn from(err: ProcedureError) -> Self {
        match err {
            ProcedureError::Connection(message) => Self::connection(message),
            ProcedureError::Query(message) => Self::query(message),
            ProcedureError::Scan(message) => Self::scan(message),
        }
    }
}

impl From<ProcedureError> for RoleRepositoryError {
    fn from(err: ProcedureError) -> Self {
        match err {
            ProcedureError::Connection(message) => Self::connection(message),
            ProcedureError::Query(message) => Self::query(message),
            ProcedureError::Scan(message) => Self::scan(message),
        }
    }
}

fn query_error(sql: &str, err: &tiberius::error::Error) -> ProcedureError {
    ProcedureError::Query(format!("{sql}: {err}"))
}

/// Rows of the first result set.
pub(super) async fn fetch_all(
    pool: &DbPool,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<Row>, ProcedureError> {
    let mut conn = pool.get().await?;
    conn.query(sql, params)
        .await
        .map_err(|err| query_error(sql, &err))?
        .into_first_result()
        .await
        .map_err(|err| query_error(sql, &err))
}

/// First row of the first result set, if any.
pub(super) async fn fetch_one(
    pool: &DbPool,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Option<Row>, ProcedureError> {
    let mut conn = pool.get().await?;
    conn.query(sql, params)
        .await
        .map_err(|err| query_error(sql, &err))?
        .into_row()
        .await
        .map_err(|err| query_error(sql, &err))
}

/// Total rows affected by a mutating procedure.
pub(super) async fn execute(
    pool: &DbPool,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<u64, ProcedureError> {
    let mut conn = pool.get().await?;
    let result = conn
        .execute(sql, params)
        .await
        .map_err(|err| query_error(sql, &err))?;
    Ok(result.total())
}
