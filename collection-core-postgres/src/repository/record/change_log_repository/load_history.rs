use async_trait::async_trait;
use collection_core_db::models::record::change_log::ChangeLogEntryModel;
use collection_core_db::repository::load_history::LoadHistory;
use collection_core_db::repository::pagination::{Page, PageRequest};
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::ChangeLogRepositoryImpl;
use crate::utils::TryFromRow;

impl ChangeLogRepositoryImpl {
    pub(super) async fn load_history_impl(
        &self,
        record_id: i64,
        page: PageRequest,
    ) -> Result<Page<ChangeLogEntryModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM record_change_log WHERE record_id = $1",
        )
        .bind(record_id)
        .fetch_one(&mut **transaction)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT id, record_id, record_uid, field, old_value, new_value, changed_by, changed_at
            FROM record_change_log
            WHERE record_id = $1
            ORDER BY changed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(record_id)
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&mut **transaction)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(ChangeLogEntryModel::try_from_row(row)?);
        }

        Ok(Page::new(items, total as usize, page))
    }
}

#[async_trait]
impl LoadHistory<Postgres> for ChangeLogRepositoryImpl {
    async fn load_history(
        &self,
        record_id: i64,
        page: PageRequest,
    ) -> Result<Page<ChangeLogEntryModel>, Box<dyn Error + Send + Sync>> {
        Self::load_history_impl(self, record_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::{test_change, test_record};
    use crate::test_helper::setup_test_context;
    use collection_core_db::repository::append_changes::AppendChangeLog;
    use collection_core_db::repository::create::CreateRecord;
    use collection_core_db::repository::load_history::LoadHistory;
    use collection_core_db::repository::pagination::PageRequest;

    #[tokio::test]
    #[ignore]
    async fn test_history_pages_newest_first() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let session = ctx.session();

        let saved = session.record_repository.create(test_record("DF_9060", "911110005050")).await?;
        for n in 0..5 {
            session
                .change_log_repository
                .append_changes(
                    saved.id,
                    "DF_9060",
                    &[test_change("comment", None, Some(&format!("note {n}")))],
                    "priya",
                )
                .await?;
        }

        let page = session
            .change_log_repository
            .load_history(saved.id, PageRequest::new(2, 0))
            .await?;
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(page.items[0].new_value.as_deref(), Some("note 4"));
        assert!(page.has_more());

        Ok(())
    }
}
