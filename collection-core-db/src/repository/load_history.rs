use async_trait::async_trait;
use sqlx::Database;

use crate::models::record::change_log::ChangeLogEntryModel;
use crate::repository::pagination::{Page, PageRequest};

/// Generic repository trait for reading a record's change history with
/// pagination, newest change first.
#[async_trait]
pub trait LoadHistory<DB: Database>: Send + Sync {
    async fn load_history(
        &self,
        record_id: i64,
        page: PageRequest,
    ) -> Result<Page<ChangeLogEntryModel>, Box<dyn std::error::Error + Send + Sync>>;
}
