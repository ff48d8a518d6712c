//! Audit columns embedded in performer and role records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Who created or last changed a record, and when.
///
/// Actor ids refer to performers. Every field is optional because legacy
/// rows predate the audit columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Performer id of the creator.
    pub created_by: Option<i32>,
    /// Creation timestamp in server local time.
    pub created_at: Option<NaiveDateTime>,
    /// Performer id of the last editor.
    pub updated_by: Option<i32>,
    /// Last update timestamp in server local time.
    pub updated_at: Option<NaiveDateTime>,
}
