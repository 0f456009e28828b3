use async_trait::async_trait;
use collection_core_api::domain::identifier::{next_record_uid, parse_uid_suffix};
use collection_core_db::repository::allocate_uid::AllocateUid;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    /// Reserve the next identifier from the shared counter row.
    ///
    /// The counter is global across prefixes, matching the historical
    /// numbering where `DF_` and `FF_` records share one sequence. The
    /// `UPDATE .. RETURNING` takes a row lock, so concurrent allocations
    /// serialize on the counter and can never observe the same value; the
    /// unique constraint on `customer_record.record_uid` is the backstop.
    ///
    /// On first use the counter is seeded from the stored maximum, ordered
    /// by numeric suffix rather than insertion order; a stored identifier
    /// with a non-numeric suffix fails the allocation rather than silently
    /// restarting the sequence.
    pub(super) async fn allocate_uid_impl(
        &self,
        prefix: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let bumped: Option<i64> = sqlx::query_scalar(
            "UPDATE record_uid_counter SET last_value = last_value + 1 \
             WHERE counter_name = 'record_uid' RETURNING last_value",
        )
        .fetch_optional(&mut **transaction)
        .await?;

        let next = match bumped {
            Some(value) => value,
            None => {
                let current_max: Option<String> = sqlx::query_scalar(
                    "SELECT record_uid FROM customer_record \
                     ORDER BY length(split_part(record_uid, '_', 2)) DESC, \
                              split_part(record_uid, '_', 2) DESC \
                     LIMIT 1",
                )
                .fetch_optional(&mut **transaction)
                .await?;

                let seeded = next_record_uid(prefix, current_max.as_deref())?;
                let seed = parse_uid_suffix(&seeded)? as i64;

                // A concurrent seeder may have won the insert; the conflict
                // arm then behaves like the plain bump above.
                sqlx::query_scalar(
                    "INSERT INTO record_uid_counter (counter_name, last_value) \
                     VALUES ('record_uid', $1) \
                     ON CONFLICT (counter_name) \
                     DO UPDATE SET last_value = record_uid_counter.last_value + 1 \
                     RETURNING last_value",
                )
                .bind(seed)
                .fetch_one(&mut **transaction)
                .await?
            }
        };

        Ok(format!("{prefix}_{next}"))
    }
}

#[async_trait]
impl AllocateUid<Postgres> for RecordRepositoryImpl {
    async fn allocate_uid(&self, prefix: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        Self::allocate_uid_impl(self, prefix).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::test_record;
    use crate::test_helper::setup_test_context;
    use collection_core_db::repository::allocate_uid::AllocateUid;
    use collection_core_db::repository::create::CreateRecord;

    #[tokio::test]
    #[ignore]
    async fn test_allocation_is_sequential() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        let first = record_repo.allocate_uid("DF").await?;
        let second = record_repo.allocate_uid("DF").await?;

        let first_n: u64 = first.split_once('_').unwrap().1.parse()?;
        let second_n: u64 = second.split_once('_').unwrap().1.parse()?;
        assert_eq!(second_n, first_n + 1);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_seed_continues_past_stored_maximum(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let session = ctx.session();

        // No counter row yet in this transaction's view: wipe it, store a
        // record with a high suffix and let allocation seed itself.
        {
            let mut tx = session.executor.tx.lock().await;
            let transaction = tx.as_mut().unwrap();
            sqlx::query("DELETE FROM record_uid_counter")
                .execute(&mut **transaction)
                .await?;
        }
        session.record_repository.create(test_record("FF_500000", "911110001010")).await?;

        let allocated = session.record_repository.allocate_uid("DF").await?;
        assert_eq!(allocated, "DF_500001");

        Ok(())
    }
}
