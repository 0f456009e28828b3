use async_trait::async_trait;
use collection_core_db::models::record::customer_record::CustomerRecordModel;
use collection_core_db::repository::create::CreateRecord;
use sqlx::{Postgres, Row};
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    pub(super) async fn create_impl(
        &self,
        mut record: CustomerRecordModel,
    ) -> Result<CustomerRecordModel, Box<dyn Error + Send + Sync>> {
        if record.record_uid.is_empty() {
            return Err("record_uid must be allocated before insert".into());
        }

        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let row = sqlx::query(
            r#"
            INSERT INTO customer_record
            (record_uid, customer_name, product, bank_name, banker_name, agent_name, tl_name, fl_supervisor, mobile, alt_mobile1, alt_mobile2, alt_mobile3, alt_mobile4, alt_mobile5, alt_mobile6, alt_mobile7, email, crn, loan_card_no, emi_amount, loan_amount, paid_amount, settlement_amount, paid_date, office_address, resi_address, pincode, disposition, calling_code, field_code, followup_stage, comment, scheduled_at, created_at, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33, $34, $35)
            RETURNING id
            "#,
        )
        .bind(record.record_uid.as_str())
        .bind(record.customer_name.as_deref())
        .bind(record.product.as_deref())
        .bind(record.bank_name.as_deref())
        .bind(record.banker_name.as_deref())
        .bind(record.agent_name.as_str())
        .bind(record.tl_name.as_deref())
        .bind(record.fl_supervisor.as_deref())
        .bind(record.mobile.as_str())
        .bind(record.alt_mobile1.as_deref())
        .bind(record.alt_mobile2.as_deref())
        .bind(record.alt_mobile3.as_deref())
        .bind(record.alt_mobile4.as_deref())
        .bind(record.alt_mobile5.as_deref())
        .bind(record.alt_mobile6.as_deref())
        .bind(record.alt_mobile7.as_deref())
        .bind(record.email.as_deref())
        .bind(record.crn.as_deref())
        .bind(record.loan_card_no.as_deref())
        .bind(record.emi_amount)
        .bind(record.loan_amount)
        .bind(record.paid_amount)
        .bind(record.settlement_amount)
        .bind(record.paid_date)
        .bind(record.office_address.as_deref())
        .bind(record.resi_address.as_deref())
        .bind(record.pincode.as_deref())
        .bind(record.disposition)
        .bind(record.calling_code)
        .bind(record.field_code)
        .bind(record.followup_stage)
        .bind(record.comment.as_deref())
        .bind(record.scheduled_at)
        .bind(record.created_at)
        .bind(record.last_updated)
        .fetch_one(&mut **transaction)
        .await?;

        record.id = row.get("id");
        Ok(record)
    }
}

#[async_trait]
impl CreateRecord<Postgres> for RecordRepositoryImpl {
    async fn create(
        &self,
        record: CustomerRecordModel,
    ) -> Result<CustomerRecordModel, Box<dyn Error + Send + Sync>> {
        Self::create_impl(self, record).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::test_record;
    use crate::test_helper::setup_test_context;
    use collection_core_db::repository::create::CreateRecord;
    use collection_core_db::repository::find_by_uid::FindByUid;

    #[tokio::test]
    #[ignore]
    async fn test_create_assigns_row_id() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        let record = test_record("DF_9001", "911110001111");
        let saved = record_repo.create(record.clone()).await?;

        assert!(saved.id > 0);
        assert_eq!(saved.record_uid, record.record_uid);

        let loaded = record_repo.find_by_uid("DF_9001").await?.unwrap();
        assert_eq!(loaded.id, saved.id);
        assert_eq!(loaded.mobile.as_str(), "911110001111");

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_rejects_missing_uid() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        let mut record = test_record("DF_9002", "911110002222");
        record.record_uid = heapless::String::new();
        assert!(record_repo.create(record).await.is_err());

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_duplicate_uid_violates_unique_constraint(
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        record_repo.create(test_record("DF_9003", "911110003333")).await?;
        let second = record_repo.create(test_record("DF_9003", "911110004444")).await;
        assert!(second.is_err());

        Ok(())
    }
}
