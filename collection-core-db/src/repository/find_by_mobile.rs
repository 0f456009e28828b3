use async_trait::async_trait;
use sqlx::Database;

use crate::models::record::customer_record::CustomerRecordModel;

/// Generic repository trait for looking a record up by its primary phone
/// number, the dialer integration's natural key.
#[async_trait]
pub trait FindByMobile<DB: Database>: Send + Sync {
    async fn find_by_mobile(
        &self,
        mobile: &str,
    ) -> Result<Option<CustomerRecordModel>, Box<dyn std::error::Error + Send + Sync>>;
}
