use async_trait::async_trait;
use sqlx::Database;

/// Generic repository trait for reserving the next record identifier
///
/// Allocation must be safe under concurrent creations: two simultaneous
/// calls for the same prefix must never observe the same value. The
/// PostgreSQL implementation uses an atomic counter row seeded from the
/// current stored maximum; the unique constraint on the identifier column
/// is the backstop.
#[async_trait]
pub trait AllocateUid<DB: Database>: Send + Sync {
    /// Reserve and return the next `PREFIX_<n>` identifier.
    async fn allocate_uid(
        &self,
        prefix: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}
