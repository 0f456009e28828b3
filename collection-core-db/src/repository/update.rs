use async_trait::async_trait;
use sqlx::Database;

use crate::models::record::customer_record::CustomerRecordModel;

/// Generic repository trait for overwriting one customer record
///
/// `record_uid` is immutable and is never written by this operation. The
/// caller is responsible for having re-checked identity-field duplication
/// against all other records first.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
#[async_trait]
pub trait UpdateRecord<DB: Database>: Send + Sync {
    /// Overwrite the stored record identified by `record.id`.
    ///
    /// # Returns
    /// * `Ok(record)` - The updated record
    /// * `Err` - When the record does not exist or the store failed
    async fn update(
        &self,
        record: CustomerRecordModel,
    ) -> Result<CustomerRecordModel, Box<dyn std::error::Error + Send + Sync>>;
}
