use async_trait::async_trait;
use collection_core_db::models::record::customer_record::CustomerRecordModel;
use collection_core_db::repository::update::UpdateRecord;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::RecordRepositoryImpl;

impl RecordRepositoryImpl {
    pub(super) async fn update_impl(
        &self,
        record: CustomerRecordModel,
    ) -> Result<CustomerRecordModel, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        // record_uid is immutable and deliberately absent from the SET list.
        let rows_affected = sqlx::query(
            r#"
            UPDATE customer_record SET
            customer_name = $2, product = $3, bank_name = $4, banker_name = $5,
            agent_name = $6, tl_name = $7, fl_supervisor = $8,
            mobile = $9, alt_mobile1 = $10, alt_mobile2 = $11, alt_mobile3 = $12,
            alt_mobile4 = $13, alt_mobile5 = $14, alt_mobile6 = $15, alt_mobile7 = $16,
            email = $17, crn = $18, loan_card_no = $19,
            emi_amount = $20, loan_amount = $21, paid_amount = $22, settlement_amount = $23,
            paid_date = $24, office_address = $25, resi_address = $26, pincode = $27,
            disposition = $28, calling_code = $29, field_code = $30, followup_stage = $31,
            comment = $32, scheduled_at = $33, last_updated = $34
            WHERE id = $1
            "#,
        )
        .bind(record.id)
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
        .bind(record.last_updated)
        .execute(&mut **transaction)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(format!("customer record {} does not exist", record.id).into());
        }

        Ok(record)
    }
}

#[async_trait]
impl UpdateRecord<Postgres> for RecordRepositoryImpl {
    async fn update(
        &self,
        record: CustomerRecordModel,
    ) -> Result<CustomerRecordModel, Box<dyn Error + Send + Sync>> {
        Self::update_impl(self, record).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::record::test_utils::test_record;
    use crate::test_helper::setup_test_context;
    use collection_core_db::models::record::common_enums::Disposition;
    use collection_core_db::repository::create::CreateRecord;
    use collection_core_db::repository::find_by_id::FindById;
    use collection_core_db::repository::update::UpdateRecord;

    #[tokio::test]
    #[ignore]
    async fn test_update_overwrites_fields() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        let saved = record_repo.create(test_record("DF_9010", "911110005555")).await?;

        let mut changed = saved.clone();
        changed.disposition = Some(Disposition::Converted);
        changed.comment = Some(heapless::String::try_from("settled in full").unwrap());
        record_repo.update(changed).await?;

        let loaded: collection_core_db::models::record::customer_record::CustomerRecordModel =
            record_repo.find_by_id(saved.id).await?.unwrap();
        assert_eq!(loaded.disposition, Some(Disposition::Converted));
        assert_eq!(loaded.comment.as_ref().unwrap().as_str(), "settled in full");
        assert_eq!(loaded.record_uid, saved.record_uid);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_update_of_unknown_record_fails() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let record_repo = &ctx.session().record_repository;

        let mut record = test_record("DF_9011", "911110006666");
        record.id = 999_999_999;
        assert!(record_repo.update(record).await.is_err());

        Ok(())
    }
}
