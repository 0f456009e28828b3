use collection_core_db::models::record::staged_upload::StagedUploadModel;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::error::Error;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, TryFromRow};

/// Repository for the durable bulk-upload staging table.
pub struct StagingRepositoryImpl {
    pub executor: Executor,
}

impl StagingRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

impl TryFromRow<PgRow> for StagedUploadModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(StagedUploadModel {
            upload_id: row.get("upload_id"),
            prefix: get_heapless_string(row, "prefix")?,
            payload: row.try_get("payload")?,
            staged_by: get_heapless_string(row, "staged_by")?,
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
        })
    }
}
