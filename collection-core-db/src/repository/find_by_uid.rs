use async_trait::async_trait;
use sqlx::Database;

use crate::models::record::customer_record::CustomerRecordModel;

/// Generic repository trait for loading a record by its external identifier
#[async_trait]
pub trait FindByUid<DB: Database>: Send + Sync {
    async fn find_by_uid(
        &self,
        record_uid: &str,
    ) -> Result<Option<CustomerRecordModel>, Box<dyn std::error::Error + Send + Sync>>;
}
