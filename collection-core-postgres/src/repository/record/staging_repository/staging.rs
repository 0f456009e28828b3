use async_trait::async_trait;
use chrono::{DateTime, Utc};
use collection_core_db::models::record::staged_upload::StagedUploadModel;
use collection_core_db::repository::staging::StagingRepository;
use sqlx::Postgres;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::StagingRepositoryImpl;
use crate::utils::TryFromRow;

#[async_trait]
impl StagingRepository<Postgres> for StagingRepositoryImpl {
    async fn stage(
        &self,
        staged: &StagedUploadModel,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        sqlx::query(
            r#"
            INSERT INTO staged_upload (upload_id, prefix, payload, staged_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(staged.upload_id)
        .bind(staged.prefix.as_str())
        .bind(&staged.payload)
        .bind(staged.staged_by.as_str())
        .bind(staged.created_at)
        .bind(staged.expires_at)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    async fn take(
        &self,
        upload_id: Uuid,
    ) -> Result<Option<StagedUploadModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        // DELETE .. RETURNING claims the row: of two racing confirmations,
        // exactly one sees it. Expired rows are left to the purge.
        let row = sqlx::query(
            r#"
            DELETE FROM staged_upload
            WHERE upload_id = $1 AND expires_at > $2
            RETURNING upload_id, prefix, payload, staged_by, created_at, expires_at
            "#,
        )
        .bind(upload_id)
        .bind(Utc::now())
        .fetch_optional(&mut **transaction)
        .await?;

        row.as_ref().map(StagedUploadModel::try_from_row).transpose()
    }

    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let reclaimed = sqlx::query("DELETE FROM staged_upload WHERE expires_at <= $1")
            .bind(now)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

        Ok(reclaimed)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use chrono::{Duration, Utc};
    use collection_core_db::models::record::staged_upload::{StagedRecord, StagedUploadModel};
    use collection_core_db::repository::staging::StagingRepository;
    use heapless::String as HeaplessString;

    fn staged_row() -> StagedUploadModel {
        let mut record = StagedRecord::new();
        record.insert("mobile".to_string(), "911110006060".to_string());
        StagedUploadModel::new(
            HeaplessString::try_from("FF").unwrap(),
            &[record],
            HeaplessString::try_from("priya").unwrap(),
            Utc::now(),
            Duration::hours(24),
        )
    }

    #[tokio::test]
    #[ignore]
    async fn test_take_claims_exactly_once() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let staging_repo = &ctx.session().staging_repository;

        let staged = staged_row();
        staging_repo.stage(&staged).await?;

        let claimed = staging_repo.take(staged.upload_id).await?.unwrap();
        assert_eq!(claimed.records()?, staged.records()?);
        assert!(staging_repo.take(staged.upload_id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_expired_rows_are_purged_not_taken(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let staging_repo = &ctx.session().staging_repository;

        let mut staged = staged_row();
        staged.expires_at = Utc::now() - Duration::minutes(1);
        staging_repo.stage(&staged).await?;

        assert!(staging_repo.take(staged.upload_id).await?.is_none());
        assert_eq!(staging_repo.purge_expired(Utc::now()).await?, 1);

        Ok(())
    }
}
