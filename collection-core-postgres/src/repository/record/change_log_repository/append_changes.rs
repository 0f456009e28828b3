use async_trait::async_trait;
use chrono::Utc;
use collection_core_api::domain::changelog::FieldChange;
use collection_core_db::models::record::change_log::ChangeLogEntryModel;
use collection_core_db::repository::append_changes::AppendChangeLog;
use heapless::String as HeaplessString;
use sqlx::{Postgres, Row};
use std::error::Error;

use super::repo_impl::ChangeLogRepositoryImpl;

impl ChangeLogRepositoryImpl {
    pub(super) async fn append_changes_impl(
        &self,
        record_id: i64,
        record_uid: &str,
        changes: &[FieldChange],
        changed_by: &str,
    ) -> Result<Vec<ChangeLogEntryModel>, Box<dyn Error + Send + Sync>> {
        if changes.is_empty() {
            return Ok(Vec::new());
        }
        if changed_by.trim().is_empty() {
            return Err("changed_by is required for change log entries".into());
        }

        // One timestamp for the whole mutation event.
        let changed_at = Utc::now();
        let mut entries = Vec::with_capacity(changes.len());

        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        for change in changes {
            let row = sqlx::query(
                r#"
                INSERT INTO record_change_log
                (record_id, record_uid, field, old_value, new_value, changed_by, changed_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(record_id)
            .bind(record_uid)
            .bind(&change.field)
            .bind(change.old_value.as_deref())
            .bind(change.new_value.as_deref())
            .bind(changed_by)
            .bind(changed_at)
            .fetch_one(&mut **transaction)
            .await?;

            entries.push(ChangeLogEntryModel {
                id: row.get("id"),
                record_id,
                record_uid: HeaplessString::try_from(record_uid)
                    .map_err(|_| "record_uid is too long for a change log entry")?,
                field: HeaplessString::try_from(change.field.as_str())
                    .map_err(|_| "field name is too long for a change log entry")?,
                old_value: change.old_value.clone(),
                new_value: change.new_value.clone(),
                changed_by: HeaplessString::try_from(changed_by)
                    .map_err(|_| "changed_by is too long for a change log entry")?,
                changed_at,
            });
        }

        Ok(entries)
    }
}

#[async_trait]
impl AppendChangeLog<Postgres> for ChangeLogRepositoryImpl {
    async fn append_changes(
        &self,
        record_id: i64,
        record_uid: &str,
        changes: &[FieldChange],
        changed_by: &str,
    ) -> Result<Vec<ChangeLogEntryModel>, Box<dyn Error + Send + Sync>> {
        Self::append_changes_impl(self, record_id, record_uid, changes, changed_by).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::{test_change, test_record};
    use crate::test_helper::setup_test_context;
    use collection_core_db::repository::append_changes::AppendChangeLog;
    use collection_core_db::repository::create::CreateRecord;

    #[tokio::test]
    #[ignore]
    async fn test_one_row_per_changed_field() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let session = ctx.session();

        let saved = session.record_repository.create(test_record("DF_9050", "911110003030")).await?;
        let entries = session
            .change_log_repository
            .append_changes(
                saved.id,
                "DF_9050",
                &[
                    test_change("disposition", Some("interested"), Some("converted")),
                    test_change("comment", None, Some("paid emi")),
                ],
                "priya",
            )
            .await?;

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.id > 0));
        assert_eq!(entries[0].changed_at, entries[1].changed_at);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_blank_actor_is_refused() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let session = ctx.session();

        let saved = session.record_repository.create(test_record("DF_9051", "911110004040")).await?;
        let result = session
            .change_log_repository
            .append_changes(
                saved.id,
                "DF_9051",
                &[test_change("comment", None, Some("x"))],
                "  ",
            )
            .await;
        assert!(result.is_err());

        Ok(())
    }
}
