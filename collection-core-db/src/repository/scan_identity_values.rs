use async_trait::async_trait;
use sqlx::Database;

/// Generic repository trait for the append policy's suffix scan
///
/// Returns every stored value of one identity column that starts with
/// `base`, so the resolver can compute the next free `__<n>` suffix.
#[async_trait]
pub trait ScanIdentityValues<DB: Database>: Send + Sync {
    async fn scan_identity_values(
        &self,
        field: &'static str,
        base: &str,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}
