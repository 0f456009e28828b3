use async_trait::async_trait;
use collection_core_db::models::record::customer_record::IDENTITY_FIELDS;
use collection_core_db::repository::scan_identity_values::ScanIdentityValues;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    pub(super) async fn scan_identity_values_impl(
        &self,
        field: &'static str,
        base: &str,
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        if !IDENTITY_FIELDS.contains(&field) {
            return Err(format!("'{field}' is not an identity column").into());
        }

        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        // LIKE wildcards in the base value itself must match literally.
        let escaped = base.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let values: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT {field} FROM customer_record WHERE {field} LIKE $1 ESCAPE '\\'"
        ))
        .bind(format!("{escaped}%"))
        .fetch_all(&mut **transaction)
        .await?;

        Ok(values)
    }
}

#[async_trait]
impl ScanIdentityValues<Postgres> for RecordRepositoryImpl {
    async fn scan_identity_values(
        &self,
        field: &'static str,
        base: &str,
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        Self::scan_identity_values_impl(self, field, base).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::test_record;
    use crate::test_helper::setup_test_context;
    use collection_core_api::domain::resolution::append_suffix;
    use collection_core_db::repository::create::CreateRecord;
    use collection_core_db::repository::scan_identity_values::ScanIdentityValues;

    #[tokio::test]
    #[ignore]
    async fn test_scan_feeds_the_suffix_computation(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        record_repo.create(test_record("DF_9040", "911110002020")).await?;
        record_repo.create(test_record("DF_9041", "911110002020__1")).await?;

        let values = record_repo.scan_identity_values("mobile", "911110002020").await?;
        assert_eq!(append_suffix("911110002020", &values), "911110002020__2");

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_non_identity_column_is_refused() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        assert!(record_repo.scan_identity_values("comment", "x").await.is_err());

        Ok(())
    }
}
