use async_trait::async_trait;
use collection_core_db::models::record::customer_record::CustomerRecordModel;
use collection_core_db::repository::find_by_id::FindById;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::{RecordRepositoryImpl, RECORD_COLUMNS};
use crate::utils::TryFromRow;

#[async_trait]
impl FindById<Postgres, CustomerRecordModel> for RecordRepositoryImpl {
    async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<CustomerRecordModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM customer_record WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut **transaction)
        .await?;

        row.as_ref().map(CustomerRecordModel::try_from_row).transpose()
    }
}
