use async_trait::async_trait;
use sqlx::Database;

use collection_core_api::domain::duplicate::IdentityRow;

/// Generic repository trait for the storage half of duplicate detection
///
/// Issues a single query selecting the identity projection of every record
/// where *any* identity column equals the candidate's value for that same
/// column. Empty candidate values are not queried; `exclude_id` keeps a
/// record from colliding with itself on update.
///
/// Purely a read; the pure matcher turns the returned rows into hits.
#[async_trait]
pub trait FindDuplicates<DB: Database>: Send + Sync {
    async fn find_duplicates(
        &self,
        candidate: &[(&'static str, Option<String>)],
        exclude_id: Option<i64>,
    ) -> Result<Vec<IdentityRow>, Box<dyn std::error::Error + Send + Sync>>;
}
