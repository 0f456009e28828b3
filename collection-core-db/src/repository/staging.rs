use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Database;
use uuid::Uuid;

use crate::models::record::staged_upload::StagedUploadModel;

/// Generic repository trait for the durable bulk-upload staging area
///
/// Staged uploads are addressed by an opaque id so any instance can confirm
/// them; `take` must atomically claim-and-remove so exactly one confirmation
/// wins. Rows past their expiry are reclaimed by `purge_expired`.
#[async_trait]
pub trait StagingRepository<DB: Database>: Send + Sync {
    /// Persist a staged upload.
    async fn stage(
        &self,
        staged: &StagedUploadModel,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Claim and remove a staged upload. Returns `None` when the id is
    /// unknown, already claimed, or expired.
    async fn take(
        &self,
        upload_id: Uuid,
    ) -> Result<Option<StagedUploadModel>, Box<dyn std::error::Error + Send + Sync>>;

    /// Remove every staged upload whose expiry lies before `now`; returns
    /// the number reclaimed.
    async fn purge_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}
