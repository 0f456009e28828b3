use sqlx::PgPool;
use std::sync::Arc;

use crate::executor::Executor;
use crate::repository::record::{
    ChangeLogRepositoryImpl, RecordRepositoryImpl, StagingRepositoryImpl,
};

/// Factory handing out per-operation repository sessions over one pool.
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<PgPool> {
        &self.pool
    }

    /// Begin a transaction and build all record repositories on top of it.
    /// Everything done through the session is one atomic unit of work.
    pub async fn create_session(&self) -> Result<RecordSession, sqlx::Error> {
        let tx = self.pool.begin().await?;
        let executor = Executor::new(tx);

        Ok(RecordSession {
            record_repository: Arc::new(RecordRepositoryImpl::new(executor.clone())),
            change_log_repository: Arc::new(ChangeLogRepositoryImpl::new(executor.clone())),
            staging_repository: Arc::new(StagingRepositoryImpl::new(executor.clone())),
            executor,
        })
    }
}

/// One transaction's worth of repositories sharing a single executor.
///
/// Dropping the session without committing rolls the transaction back.
pub struct RecordSession {
    pub executor: Executor,
    pub record_repository: Arc<RecordRepositoryImpl>,
    pub change_log_repository: Arc<ChangeLogRepositoryImpl>,
    pub staging_repository: Arc<StagingRepositoryImpl>,
}

impl RecordSession {
    pub async fn commit(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.executor.commit().await
    }

    pub async fn rollback(self) {
        self.executor.rollback().await
    }
}
