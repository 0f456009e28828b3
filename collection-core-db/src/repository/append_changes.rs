use async_trait::async_trait;
use sqlx::Database;

use crate::models::record::change_log::ChangeLogEntryModel;
use collection_core_api::domain::changelog::FieldChange;

/// Generic repository trait for persisting the audit trail of one mutation
///
/// One row per changed field, appended inside the same transaction as the
/// record mutation itself; a partially written trail must never be
/// observable. Entries are immutable once written.
#[async_trait]
pub trait AppendChangeLog<DB: Database>: Send + Sync {
    async fn append_changes(
        &self,
        record_id: i64,
        record_uid: &str,
        changes: &[FieldChange],
        changed_by: &str,
    ) -> Result<Vec<ChangeLogEntryModel>, Box<dyn std::error::Error + Send + Sync>>;
}
