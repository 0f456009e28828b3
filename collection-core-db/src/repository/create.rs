use async_trait::async_trait;
use sqlx::Database;

use crate::models::record::customer_record::CustomerRecordModel;

/// Generic repository trait for inserting one customer record
///
/// The record must already be normalized and carry its allocated
/// `record_uid`; the store assigns the row id. Runs inside the caller's
/// transaction: nothing is visible until the enclosing scope commits.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
#[async_trait]
pub trait CreateRecord<DB: Database>: Send + Sync {
    /// Insert the record and return it with the generated row id populated.
    async fn create(
        &self,
        record: CustomerRecordModel,
    ) -> Result<CustomerRecordModel, Box<dyn std::error::Error + Send + Sync>>;
}
