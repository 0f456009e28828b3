use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for loading an entity by its row id
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement the Identifiable trait
#[async_trait]
pub trait FindById<DB: Database, T: Identifiable>: Send + Sync {
    async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<T>, Box<dyn std::error::Error + Send + Sync>>;
}
