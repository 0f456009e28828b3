use collection_core_db::models::record::change_log::ChangeLogEntryModel;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::error::Error;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};

/// Repository for the append-only record_change_log table.
pub struct ChangeLogRepositoryImpl {
    pub executor: Executor,
}

impl ChangeLogRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for ChangeLogEntryModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(ChangeLogEntryModel {
            id: row.get("id"),
            record_id: row.get("record_id"),
            record_uid: get_heapless_string(row, "record_uid")?,
            field: get_heapless_string(row, "field")?,
            old_value: row.try_get("old_value")?,
            new_value: row.try_get("new_value")?,
            changed_by: get_heapless_string(row, "changed_by")?,
            changed_at: row.get("changed_at"),
        })
    }
}
