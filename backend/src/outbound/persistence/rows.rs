//! Row mapping from procedure result sets to domain records.
//!
//! Columns are read by position. Performer rows are
//! `id, fio, bc, pass, archive, idRoleAForms, idRoleAFGW, created_by,
//! created_at, updated_by, updated_at`; the `pass` column is skipped. Role
//! rows are `id, name, desc, created_at, created_by, updated_at, updated_by`.

use chrono::NaiveDateTime;
use tiberius::{FromSql, Row};

use super::procedures::ProcedureError;
use crate::domain::{Audit, Performer, PerformerId, Role, RoleId};

mod performer_column {
    pub(super) const ID: usize = 0;
    pub(super) const FIO: usize = 1;
    pub(super) const BC: usize = 2;
    pub(super) const ARCHIVE: usize = 4;
    pub(super) const ROLE_FORMS: usize = 5;
    pub(super) const ROLE_FGW: usize = 6;
    pub(super) const CREATED_BY: usize = 7;
    pub(super) const CREATED_AT: usize = 8;
    pub(super) const UPDATED_BY: usize = 9;
    pub(super) const UPDATED_AT: usize = 10;
}

mod role_column {
    pub(super) const ID: usize = 0;
    pub(super) const NAME: usize = 1;
    pub(super) const DESCRIPTION: usize = 2;
    pub(super) const CREATED_AT: usize = 3;
    pub(super) const CREATED_BY: usize = 4;
    pub(super) const UPDATED_AT: usize = 5;
    pub(super) const UPDATED_BY: usize = 6;
}

fn scan_error(column: &str, detail: impl std::fmt::Display) -> ProcedureError {
    ProcedureError::Scan(format!("column {column}: {detail}"))
}

fn optional<'a, T>(row: &'a Row, idx: usize, column: &str) -> Result<Option<T>, ProcedureError>
where
    T: FromSql<'a>,
{
    row.try_get::<T, _>(idx)
        .map_err(|err| scan_error(column, err))
}

fn required<'a, T>(row: &'a Row, idx: usize, column: &str) -> Result<T, ProcedureError>
where
    T: FromSql<'a>,
{
    optional(row, idx, column)?.ok_or_else(|| scan_error(column, "unexpected NULL"))
}

fn text(row: &Row, idx: usize, column: &str) -> Result<String, ProcedureError> {
    Ok(optional::<&str>(row, idx, column)?
        .map(|value| value.trim().to_owned())
        .unwrap_or_default())
}

/// Bit columns sometimes arrive as `int` or `tinyint` from older procedures.
fn flag(row: &Row, idx: usize, column: &str) -> Result<bool, ProcedureError> {
    if let Ok(value) = row.try_get::<bool, _>(idx) {
        return Ok(value.unwrap_or(false));
    }
    if let Ok(value) = row.try_get::<i32, _>(idx) {
        return Ok(value.is_some_and(|v| v != 0));
    }
    row.try_get::<u8, _>(idx)
        .map(|value| value.is_some_and(|v| v != 0))
        .map_err(|err| scan_error(column, err))
}

/// Actor columns are `int` in current schemas and numeric strings in older
/// ones.
fn actor(row: &Row, idx: usize, column: &str) -> Result<Option<i32>, ProcedureError> {
    if let Ok(value) = row.try_get::<i32, _>(idx) {
        return Ok(value);
    }
    match optional::<&str>(row, idx, column)?.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|err| scan_error(column, err)),
    }
}

fn timestamp(row: &Row, idx: usize, column: &str) -> Result<Option<NaiveDateTime>, ProcedureError> {
    optional::<NaiveDateTime>(row, idx, column)
}

pub(super) fn performer_from_row(row: &Row) -> Result<Performer, ProcedureError> {
    use performer_column as col;

    Ok(Performer {
        id: PerformerId::new(required::<i32>(row, col::ID, "id")?),
        fio: text(row, col::FIO, "fio")?,
        bc: text(row, col::BC, "bc")?,
        archive: flag(row, col::ARCHIVE, "archive")?,
        id_role_a_forms: RoleId::new(
            optional::<i32>(row, col::ROLE_FORMS, "idRoleAForms")?.unwrap_or_default(),
        ),
        id_role_a_fgw: RoleId::new(
            optional::<i32>(row, col::ROLE_FGW, "idRoleAFGW")?.unwrap_or_default(),
        ),
        audit: Audit {
            created_by: actor(row, col::CREATED_BY, "created_by")?,
            created_at: timestamp(row, col::CREATED_AT, "created_at")?,
            updated_by: actor(row, col::UPDATED_BY, "updated_by")?,
            updated_at: timestamp(row, col::UPDATED_AT, "updated_at")?,
        },
    })
}

pub(super) fn role_from_row(row: &Row) -> Result<Role, ProcedureError> {
    use role_column as col;

    Ok(Role {
        id: RoleId::new(required::<i32>(row, col::ID, "id")?),
        name: text(row, col::NAME, "name")?,
        description: text(row, col::DESCRIPTION, "desc")?,
        audit: Audit {
            created_by: actor(row, col::CREATED_BY, "created_by")?,
            created_at: timestamp(row, col::CREATED_AT, "created_at")?,
            updated_by: actor(row, col::UPDATED_BY, "updated_by")?,
            updated_at: timestamp(row, col::UPDATED_AT, "updated_at")?,
        },
        is_editing: false,
    })
}

/// Single boolean answer from an auth or existence procedure.
pub(super) fn answer_flag(row: Option<&Row>) -> Result<bool, ProcedureError> {
    row.map_or(Ok(false), |row| flag(row, 0, "result"))
}

/// Single count answer.
pub(super) fn answer_count(row: Option<&Row>) -> Result<i64, ProcedureError> {
    let Some(row) = row else {
        return Ok(0);
    };
    if let Ok(value) = row.try_get::<i32, _>(0) {
        return Ok(value.map(i64::from).unwrap_or_default());
    }
    Ok(optional::<i64>(row, 0, "count")?.unwrap_or_default())
}
