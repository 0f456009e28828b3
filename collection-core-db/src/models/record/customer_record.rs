use chrono::{DateTime, NaiveDate, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::identifiable::Identifiable;
use crate::models::record::common_enums::{CallingCode, Disposition, FieldCode, FollowupStage};
use collection_core_api::domain::changelog::FieldSnapshot;

/// Identity-bearing columns, in detection order. A non-empty value in any of
/// these must be unique across all records (field-for-field).
pub const IDENTITY_FIELDS: &[&str] = &[
    "mobile",
    "alt_mobile1",
    "alt_mobile2",
    "alt_mobile3",
    "alt_mobile4",
    "alt_mobile5",
    "alt_mobile6",
    "alt_mobile7",
    "email",
    "crn",
    "loan_card_no",
];

/// Columns the free-form field-patch path may touch. Descriptive fields
/// only: identity-bearing fields go through the full update pipeline so
/// duplicate detection cannot be bypassed.
pub const PATCHABLE_FIELDS: &[&str] = &[
    "customer_name",
    "product",
    "bank_name",
    "banker_name",
    "agent_name",
    "tl_name",
    "fl_supervisor",
    "emi_amount",
    "loan_amount",
    "paid_amount",
    "settlement_amount",
    "paid_date",
    "office_address",
    "resi_address",
    "pincode",
    "disposition",
    "calling_code",
    "field_code",
    "followup_stage",
    "comment",
    "scheduled_at",
];

/// Database model for one customer/loan collection record.
///
/// `record_uid` is the externally visible `PREFIX_<n>` identifier, immutable
/// once assigned; `id` is the storage row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecordModel {
    pub id: i64,
    pub record_uid: HeaplessString<20>,

    pub customer_name: Option<HeaplessString<100>>,
    pub product: Option<HeaplessString<50>>,
    pub bank_name: Option<HeaplessString<100>>,
    pub banker_name: Option<HeaplessString<100>>,
    pub agent_name: HeaplessString<100>,
    pub tl_name: Option<HeaplessString<100>>,
    pub fl_supervisor: Option<HeaplessString<100>>,

    /// Primary phone, required, at most 12 digits after normalization. The
    /// column leaves room for an appended `__<n>` suffix.
    pub mobile: HeaplessString<20>,
    pub alt_mobile1: Option<HeaplessString<20>>,
    pub alt_mobile2: Option<HeaplessString<20>>,
    pub alt_mobile3: Option<HeaplessString<20>>,
    pub alt_mobile4: Option<HeaplessString<20>>,
    pub alt_mobile5: Option<HeaplessString<20>>,
    pub alt_mobile6: Option<HeaplessString<20>>,
    pub alt_mobile7: Option<HeaplessString<20>>,
    pub email: Option<HeaplessString<120>>,
    /// Loan reference code.
    pub crn: Option<HeaplessString<32>>,
    pub loan_card_no: Option<HeaplessString<32>>,

    pub emi_amount: Option<Decimal>,
    pub loan_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub settlement_amount: Option<Decimal>,
    pub paid_date: Option<NaiveDate>,

    pub office_address: Option<HeaplessString<200>>,
    pub resi_address: Option<HeaplessString<200>>,
    pub pincode: Option<HeaplessString<10>>,

    pub disposition: Option<Disposition>,
    pub calling_code: CallingCode,
    pub field_code: FieldCode,
    pub followup_stage: Option<FollowupStage>,
    pub comment: Option<HeaplessString<500>>,
    pub scheduled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Identifiable for CustomerRecordModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}

impl CustomerRecordModel {
    /// Empty record shell a draft is applied onto for creation. The
    /// `record_uid` stays empty until the allocator assigns one.
    pub fn blank(agent_name: HeaplessString<100>, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            record_uid: HeaplessString::new(),
            customer_name: None,
            product: None,
            bank_name: None,
            banker_name: None,
            agent_name,
            tl_name: None,
            fl_supervisor: None,
            mobile: HeaplessString::new(),
            alt_mobile1: None,
            alt_mobile2: None,
            alt_mobile3: None,
            alt_mobile4: None,
            alt_mobile5: None,
            alt_mobile6: None,
            alt_mobile7: None,
            email: None,
            crn: None,
            loan_card_no: None,
            emi_amount: None,
            loan_amount: None,
            paid_amount: None,
            settlement_amount: None,
            paid_date: None,
            office_address: None,
            resi_address: None,
            pincode: None,
            disposition: None,
            calling_code: CallingCode::Wn,
            field_code: FieldCode::Anf,
            followup_stage: None,
            comment: None,
            scheduled_at: None,
            created_at: now,
            last_updated: now,
        }
    }

    /// Identity-bearing values in [`IDENTITY_FIELDS`] order, for the
    /// duplicate detector.
    pub fn identity_values(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("mobile", Some(self.mobile.to_string())),
            ("alt_mobile1", self.alt_mobile1.as_ref().map(|v| v.to_string())),
            ("alt_mobile2", self.alt_mobile2.as_ref().map(|v| v.to_string())),
            ("alt_mobile3", self.alt_mobile3.as_ref().map(|v| v.to_string())),
            ("alt_mobile4", self.alt_mobile4.as_ref().map(|v| v.to_string())),
            ("alt_mobile5", self.alt_mobile5.as_ref().map(|v| v.to_string())),
            ("alt_mobile6", self.alt_mobile6.as_ref().map(|v| v.to_string())),
            ("alt_mobile7", self.alt_mobile7.as_ref().map(|v| v.to_string())),
            ("email", self.email.as_ref().map(|v| v.to_string())),
            ("crn", self.crn.as_ref().map(|v| v.to_string())),
            ("loan_card_no", self.loan_card_no.as_ref().map(|v| v.to_string())),
        ]
    }

    /// Current value of one identity field by column name.
    pub fn identity_value(&self, field: &str) -> Option<String> {
        self.identity_values()
            .into_iter()
            .find(|(name, _)| *name == field)
            .and_then(|(_, value)| value)
    }

    /// Overwrite one identity field by column name; used when the append
    /// policy manufactures a suffixed value. Returns false for a name that
    /// is not identity-bearing or a value that does not fit the column.
    pub fn set_identity_value(&mut self, field: &str, value: &str) -> bool {
        match field {
            "mobile" => match HeaplessString::try_from(value) {
                Ok(v) => {
                    self.mobile = v;
                    true
                }
                Err(_) => false,
            },
            "alt_mobile1" => set_opt(&mut self.alt_mobile1, value),
            "alt_mobile2" => set_opt(&mut self.alt_mobile2, value),
            "alt_mobile3" => set_opt(&mut self.alt_mobile3, value),
            "alt_mobile4" => set_opt(&mut self.alt_mobile4, value),
            "alt_mobile5" => set_opt(&mut self.alt_mobile5, value),
            "alt_mobile6" => set_opt(&mut self.alt_mobile6, value),
            "alt_mobile7" => set_opt(&mut self.alt_mobile7, value),
            "email" => set_opt(&mut self.email, value),
            "crn" => set_opt(&mut self.crn, value),
            "loan_card_no" => set_opt(&mut self.loan_card_no, value),
            _ => false,
        }
    }

    /// Normalized field-to-value view of every tracked mutable field, in the
    /// canonical string form the store round-trips. The change recorder
    /// diffs two of these; `record_uid` is immutable and `last_updated` is
    /// bookkeeping, so neither is tracked.
    pub fn snapshot(&self) -> FieldSnapshot {
        let mut snapshot = FieldSnapshot::new();
        snapshot.insert("customer_name", self.customer_name.as_ref().map(|v| v.to_string()));
        snapshot.insert("product", self.product.as_ref().map(|v| v.to_string()));
        snapshot.insert("bank_name", self.bank_name.as_ref().map(|v| v.to_string()));
        snapshot.insert("banker_name", self.banker_name.as_ref().map(|v| v.to_string()));
        snapshot.insert("agent_name", Some(self.agent_name.to_string()));
        snapshot.insert("tl_name", self.tl_name.as_ref().map(|v| v.to_string()));
        snapshot.insert("fl_supervisor", self.fl_supervisor.as_ref().map(|v| v.to_string()));
        for (field, value) in self.identity_values() {
            snapshot.insert(field, value);
        }
        snapshot.insert("emi_amount", self.emi_amount.map(|v| v.to_string()));
        snapshot.insert("loan_amount", self.loan_amount.map(|v| v.to_string()));
        snapshot.insert("paid_amount", self.paid_amount.map(|v| v.to_string()));
        snapshot.insert("settlement_amount", self.settlement_amount.map(|v| v.to_string()));
        snapshot.insert("paid_date", self.paid_date.map(|v| v.format("%Y-%m-%d").to_string()));
        snapshot.insert("office_address", self.office_address.as_ref().map(|v| v.to_string()));
        snapshot.insert("resi_address", self.resi_address.as_ref().map(|v| v.to_string()));
        snapshot.insert("pincode", self.pincode.as_ref().map(|v| v.to_string()));
        snapshot.insert("disposition", self.disposition.map(|v| v.to_string()));
        snapshot.insert("calling_code", Some(self.calling_code.to_string()));
        snapshot.insert("field_code", Some(self.field_code.to_string()));
        snapshot.insert("followup_stage", self.followup_stage.map(|v| v.to_string()));
        snapshot.insert("comment", self.comment.as_ref().map(|v| v.to_string()));
        snapshot.insert(
            "scheduled_at",
            self.scheduled_at.map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        snapshot
    }
}

fn set_opt<const N: usize>(slot: &mut Option<HeaplessString<N>>, value: &str) -> bool {
    match HeaplessString::try_from(value) {
        Ok(v) => {
            *slot = Some(v);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_core_api::domain::changelog::diff_snapshots;

    fn minimal_record() -> CustomerRecordModel {
        CustomerRecordModel {
            id: 1,
            record_uid: HeaplessString::try_from("DF_1").unwrap(),
            customer_name: Some(HeaplessString::try_from("Asha Rao").unwrap()),
            product: None,
            bank_name: None,
            banker_name: None,
            agent_name: HeaplessString::try_from("priya").unwrap(),
            tl_name: None,
            fl_supervisor: None,
            mobile: HeaplessString::try_from("9998887777").unwrap(),
            alt_mobile1: None,
            alt_mobile2: None,
            alt_mobile3: None,
            alt_mobile4: None,
            alt_mobile5: None,
            alt_mobile6: None,
            alt_mobile7: None,
            email: None,
            crn: None,
            loan_card_no: None,
            emi_amount: None,
            loan_amount: None,
            paid_amount: None,
            settlement_amount: None,
            paid_date: None,
            office_address: None,
            resi_address: None,
            pincode: None,
            disposition: Some(Disposition::Interested),
            calling_code: CallingCode::Wn,
            field_code: FieldCode::Anf,
            followup_stage: None,
            comment: None,
            scheduled_at: None,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn disposition_change_diffs_to_one_entry() {
        let before = minimal_record();
        let mut after = before.clone();
        after.disposition = Some(Disposition::Converted);
        let changes = diff_snapshots(&before.snapshot(), &after.snapshot());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "disposition");
        assert_eq!(changes[0].old_value.as_deref(), Some("interested"));
        assert_eq!(changes[0].new_value.as_deref(), Some("converted"));
    }

    #[test]
    fn identical_records_diff_to_nothing() {
        let record = minimal_record();
        assert!(diff_snapshots(&record.snapshot(), &record.snapshot()).is_empty());
    }

    #[test]
    fn record_uid_is_not_a_tracked_field() {
        let record = minimal_record();
        assert!(!record.snapshot().contains_key("record_uid"));
    }

    #[test]
    fn identity_values_cover_every_identity_field() {
        let record = minimal_record();
        let values = record.identity_values();
        assert_eq!(values.len(), IDENTITY_FIELDS.len());
        for ((name, _), expected) in values.iter().zip(IDENTITY_FIELDS) {
            assert_eq!(name, expected);
        }
    }

    #[test]
    fn suffixed_identity_value_lands_on_the_right_field() {
        let mut record = minimal_record();
        assert!(record.set_identity_value("mobile", "9998887777__1"));
        assert_eq!(record.identity_value("mobile").as_deref(), Some("9998887777__1"));
        assert!(!record.set_identity_value("customer_name", "x"));
    }
}
