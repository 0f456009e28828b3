use async_trait::async_trait;
use sqlx::Database;

/// Generic repository trait for deleting one customer record
///
/// The record's change-log entries go with it (cascade); they have no
/// standalone lifecycle.
#[async_trait]
pub trait DeleteRecord<DB: Database>: Send + Sync {
    /// Delete by row id. Returns whether a record was actually removed.
    async fn delete(&self, id: i64) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
