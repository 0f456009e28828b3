use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to one database transaction.
///
/// Every repository participating in an operation clones the same Executor,
/// so all of the operation's reads and writes land in a single transactional
/// scope. The transaction commits or rolls back exactly once, through
/// [`commit`](Executor::commit) / [`rollback`](Executor::rollback); if the
/// handle is dropped without either (caller abort, panic, early return), the
/// underlying sqlx transaction rolls back on drop, so a disconnected caller
/// can never leave a half-applied mutation behind.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Commit the transaction. Fails if it was already consumed.
    pub async fn commit(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.take().ok_or("Transaction has been consumed")?;
        tx.commit().await?;
        Ok(())
    }

    /// Roll the transaction back. A no-op if it was already consumed.
    pub async fn rollback(&self) {
        let mut guard = self.tx.lock().await;
        if let Some(tx) = guard.take() {
            if let Err(err) = tx.rollback().await {
                tracing::warn!(%err, "transaction rollback failed");
            }
        }
    }
}
