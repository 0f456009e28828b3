use async_trait::async_trait;
use collection_core_db::repository::delete::DeleteRecord;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    pub(super) async fn delete_impl(&self, id: i64) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        // Change-log rows cascade with the record.
        let rows_affected = sqlx::query("DELETE FROM customer_record WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }
}

#[async_trait]
impl DeleteRecord<Postgres> for RecordRepositoryImpl {
    async fn delete(&self, id: i64) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Self::delete_impl(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::test_record;
    use crate::test_helper::setup_test_context;
    use collection_core_api::domain::changelog::FieldChange;
    use collection_core_db::repository::append_changes::AppendChangeLog;
    use collection_core_db::repository::create::CreateRecord;
    use collection_core_db::repository::delete::DeleteRecord;
    use collection_core_db::repository::load_history::LoadHistory;
    use collection_core_db::repository::pagination::PageRequest;

    #[tokio::test]
    #[ignore]
    async fn test_delete_cascades_to_change_log() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let session = ctx.session();

        let saved = session.record_repository.create(test_record("DF_9020", "911110007777")).await?;
        session
            .change_log_repository
            .append_changes(
                saved.id,
                "DF_9020",
                &[FieldChange {
                    field: "disposition".to_string(),
                    old_value: Some("interested".to_string()),
                    new_value: Some("converted".to_string()),
                }],
                "priya",
            )
            .await?;

        assert!(session.record_repository.delete(saved.id).await?);
        assert!(!session.record_repository.delete(saved.id).await?);

        let history = session
            .change_log_repository
            .load_history(saved.id, PageRequest::default())
            .await?;
        assert_eq!(history.total, 0);

        Ok(())
    }
}
