use collection_core_db::models::record::customer_record::CustomerRecordModel;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::error::Error;

use crate::executor::Executor;
use crate::utils::{get_heapless_string, get_optional_heapless_string, TryFromRow};

/// Repository for the customer_record table and its uid counter.
pub struct RecordRepositoryImpl {
    pub executor: Executor,
}

impl RecordRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

/// Column list shared by every SELECT that materializes a full record.
pub(super) const RECORD_COLUMNS: &str = "id, record_uid, customer_name, product, bank_name, \
     banker_name, agent_name, tl_name, fl_supervisor, mobile, alt_mobile1, alt_mobile2, \
     alt_mobile3, alt_mobile4, alt_mobile5, alt_mobile6, alt_mobile7, email, crn, loan_card_no, \
     emi_amount, loan_amount, paid_amount, settlement_amount, paid_date, office_address, \
     resi_address, pincode, disposition, calling_code, field_code, followup_stage, comment, \
     scheduled_at, created_at, last_updated";

impl TryFromRow<PgRow> for CustomerRecordModel {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(CustomerRecordModel {
            id: row.get("id"),
            record_uid: get_heapless_string(row, "record_uid")?,
            customer_name: get_optional_heapless_string(row, "customer_name")?,
            product: get_optional_heapless_string(row, "product")?,
            bank_name: get_optional_heapless_string(row, "bank_name")?,
            banker_name: get_optional_heapless_string(row, "banker_name")?,
            agent_name: get_heapless_string(row, "agent_name")?,
            tl_name: get_optional_heapless_string(row, "tl_name")?,
            fl_supervisor: get_optional_heapless_string(row, "fl_supervisor")?,
            mobile: get_heapless_string(row, "mobile")?,
            alt_mobile1: get_optional_heapless_string(row, "alt_mobile1")?,
            alt_mobile2: get_optional_heapless_string(row, "alt_mobile2")?,
            alt_mobile3: get_optional_heapless_string(row, "alt_mobile3")?,
            alt_mobile4: get_optional_heapless_string(row, "alt_mobile4")?,
            alt_mobile5: get_optional_heapless_string(row, "alt_mobile5")?,
            alt_mobile6: get_optional_heapless_string(row, "alt_mobile6")?,
            alt_mobile7: get_optional_heapless_string(row, "alt_mobile7")?,
            email: get_optional_heapless_string(row, "email")?,
            crn: get_optional_heapless_string(row, "crn")?,
            loan_card_no: get_optional_heapless_string(row, "loan_card_no")?,
            emi_amount: row.try_get("emi_amount")?,
            loan_amount: row.try_get("loan_amount")?,
            paid_amount: row.try_get("paid_amount")?,
            settlement_amount: row.try_get("settlement_amount")?,
            paid_date: row.try_get("paid_date")?,
            office_address: get_optional_heapless_string(row, "office_address")?,
            resi_address: get_optional_heapless_string(row, "resi_address")?,
            pincode: get_optional_heapless_string(row, "pincode")?,
            disposition: row.try_get("disposition")?,
            calling_code: row.get("calling_code"),
            field_code: row.get("field_code"),
            followup_stage: row.try_get("followup_stage")?,
            comment: get_optional_heapless_string(row, "comment")?,
            scheduled_at: row.try_get("scheduled_at")?,
            created_at: row.get("created_at"),
            last_updated: row.get("last_updated"),
        })
    }
}
