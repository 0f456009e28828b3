use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;

use crate::models::record::common_enums::{CallingCode, Disposition, FieldCode, FollowupStage};
use crate::models::record::customer_record::CustomerRecordModel;
use crate::models::record::staged_upload::StagedRecord;
use collection_core_api::domain::validation::{
    coerce_enum, normalize_phone, parse_amount, parse_flexible_date, parse_flexible_datetime,
    truncate_text, valid_email, ValidationReport,
};

/// Maximum number of secondary phone numbers per record.
pub const MAX_ALT_MOBILES: usize = 7;

/// Canonical column names accepted from an upload header mapping. Anything
/// else in the mapped file is dropped.
pub const UPLOAD_COLUMNS: &[&str] = &[
    "customer_name",
    "product",
    "bank_name",
    "banker_name",
    "agent_name",
    "tl_name",
    "fl_supervisor",
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

/// Raw, untyped field values of a create or update request.
///
/// `None` means the field was not submitted and keeps its stored value; an
/// empty string clears the field (where clearing is legal).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordDraft {
    pub customer_name: Option<String>,
    pub product: Option<String>,
    pub bank_name: Option<String>,
    pub banker_name: Option<String>,
    pub agent_name: Option<String>,
    pub tl_name: Option<String>,
    pub fl_supervisor: Option<String>,
    pub mobile: Option<String>,
    /// Replaces the full set of secondary numbers when submitted.
    pub alt_mobiles: Option<Vec<String>>,
    pub email: Option<String>,
    pub crn: Option<String>,
    pub loan_card_no: Option<String>,
    pub emi_amount: Option<String>,
    pub loan_amount: Option<String>,
    pub paid_amount: Option<String>,
    pub settlement_amount: Option<String>,
    pub paid_date: Option<String>,
    pub office_address: Option<String>,
    pub resi_address: Option<String>,
    pub pincode: Option<String>,
    pub disposition: Option<String>,
    pub calling_code: Option<String>,
    pub field_code: Option<String>,
    pub followup_stage: Option<String>,
    pub comment: Option<String>,
    pub scheduled_at: Option<String>,
}

impl RecordDraft {
    /// Build a draft from a header-mapped upload row. Unknown keys were
    /// already dropped by the mapping step.
    pub fn from_staged(record: &StagedRecord) -> Self {
        let get = |key: &str| record.get(key).cloned();
        let mut alt_mobiles = Vec::new();
        let mut any_alt = false;
        for n in 1..=MAX_ALT_MOBILES {
            if let Some(value) = record.get(&format!("alt_mobile{n}")) {
                any_alt = true;
                alt_mobiles.push(value.clone());
            }
        }
        Self {
            customer_name: get("customer_name"),
            product: get("product"),
            bank_name: get("bank_name"),
            banker_name: get("banker_name"),
            agent_name: get("agent_name"),
            tl_name: get("tl_name"),
            fl_supervisor: get("fl_supervisor"),
            mobile: get("mobile"),
            alt_mobiles: any_alt.then_some(alt_mobiles),
            email: get("email"),
            crn: get("crn"),
            loan_card_no: get("loan_card_no"),
            emi_amount: get("emi_amount"),
            loan_amount: get("loan_amount"),
            paid_amount: get("paid_amount"),
            settlement_amount: get("settlement_amount"),
            paid_date: get("paid_date"),
            office_address: get("office_address"),
            resi_address: get("resi_address"),
            pincode: get("pincode"),
            disposition: get("disposition"),
            calling_code: get("calling_code"),
            field_code: get("field_code"),
            followup_stage: get("followup_stage"),
            comment: get("comment"),
            scheduled_at: get("scheduled_at"),
        }
    }

    /// Set one patchable field by column name. Returns false for any name
    /// outside [`crate::models::record::customer_record::PATCHABLE_FIELDS`];
    /// identity-bearing columns are deliberately not reachable here.
    pub fn set_field(&mut self, field: &str, value: &str) -> bool {
        let slot = match field {
            "customer_name" => &mut self.customer_name,
            "product" => &mut self.product,
            "bank_name" => &mut self.bank_name,
            "banker_name" => &mut self.banker_name,
            "agent_name" => &mut self.agent_name,
            "tl_name" => &mut self.tl_name,
            "fl_supervisor" => &mut self.fl_supervisor,
            "emi_amount" => &mut self.emi_amount,
            "loan_amount" => &mut self.loan_amount,
            "paid_amount" => &mut self.paid_amount,
            "settlement_amount" => &mut self.settlement_amount,
            "paid_date" => &mut self.paid_date,
            "office_address" => &mut self.office_address,
            "resi_address" => &mut self.resi_address,
            "pincode" => &mut self.pincode,
            "disposition" => &mut self.disposition,
            "calling_code" => &mut self.calling_code,
            "field_code" => &mut self.field_code,
            "followup_stage" => &mut self.followup_stage,
            "comment" => &mut self.comment,
            "scheduled_at" => &mut self.scheduled_at,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }

    /// Apply every submitted field onto `base`, collecting all validation
    /// issues instead of stopping at the first. For creation `base` is
    /// [`CustomerRecordModel::blank`]; for update it is the stored record,
    /// so unsubmitted fields keep their values.
    ///
    /// Enum and date fields degrade softly; phone and email problems (and a
    /// missing primary number) are collected as blocking issues.
    pub fn apply_to(
        &self,
        base: &CustomerRecordModel,
        report: &mut ValidationReport,
    ) -> CustomerRecordModel {
        let mut record = base.clone();

        if let Some(raw) = self.customer_name.as_deref() {
            record.customer_name = truncate_text::<100>(Some(raw));
        }
        if let Some(raw) = self.product.as_deref() {
            record.product = truncate_text::<50>(Some(raw));
        }
        if let Some(raw) = self.bank_name.as_deref() {
            record.bank_name = truncate_text::<100>(Some(raw));
        }
        if let Some(raw) = self.banker_name.as_deref() {
            record.banker_name = truncate_text::<100>(Some(raw));
        }
        if let Some(raw) = self.agent_name.as_deref() {
            // The assigned agent can change but never become empty.
            if let Some(agent) = truncate_text::<100>(Some(raw)) {
                record.agent_name = agent;
            }
        }
        if let Some(raw) = self.tl_name.as_deref() {
            record.tl_name = truncate_text::<100>(Some(raw));
        }
        if let Some(raw) = self.fl_supervisor.as_deref() {
            record.fl_supervisor = truncate_text::<100>(Some(raw));
        }

        match self.mobile.as_deref() {
            Some(raw) => match normalize_phone(Some(raw)) {
                Ok(Some(digits)) => record.mobile = digits,
                Ok(None) => report.push("mobile", "Mobile number is required."),
                Err(err) => report.push("mobile", err.to_string()),
            },
            None => {
                if record.mobile.is_empty() {
                    report.push("mobile", "Mobile number is required.");
                }
            }
        }

        if let Some(raw_alts) = &self.alt_mobiles {
            if raw_alts.len() > MAX_ALT_MOBILES {
                report.push(
                    "alt_mobiles",
                    format!("At most {MAX_ALT_MOBILES} alternate numbers are allowed."),
                );
            }
            let mut normalized: Vec<Option<HeaplessString<20>>> = Vec::new();
            for (n, raw) in raw_alts.iter().take(MAX_ALT_MOBILES).enumerate() {
                match normalize_phone(Some(raw.as_str())) {
                    Ok(value) => normalized.push(value),
                    Err(err) => {
                        report.push(&format!("alt_mobile{}", n + 1), err.to_string());
                        normalized.push(None);
                    }
                }
            }
            normalized.resize(MAX_ALT_MOBILES, None);
            record.alt_mobile1 = normalized[0].clone();
            record.alt_mobile2 = normalized[1].clone();
            record.alt_mobile3 = normalized[2].clone();
            record.alt_mobile4 = normalized[3].clone();
            record.alt_mobile5 = normalized[4].clone();
            record.alt_mobile6 = normalized[5].clone();
            record.alt_mobile7 = normalized[6].clone();
        }

        if let Some(raw) = self.email.as_deref() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                record.email = None;
            } else if !valid_email(trimmed) {
                report.push("email", "Invalid email format");
            } else {
                record.email = truncate_text::<120>(Some(trimmed));
            }
        }
        if let Some(raw) = self.crn.as_deref() {
            record.crn = truncate_text::<32>(Some(raw));
        }
        if let Some(raw) = self.loan_card_no.as_deref() {
            record.loan_card_no = truncate_text::<32>(Some(raw));
        }

        if let Some(raw) = self.emi_amount.as_deref() {
            record.emi_amount = parse_amount("emi_amount", raw);
        }
        if let Some(raw) = self.loan_amount.as_deref() {
            record.loan_amount = parse_amount("loan_amount", raw);
        }
        if let Some(raw) = self.paid_amount.as_deref() {
            record.paid_amount = parse_amount("paid_amount", raw);
        }
        if let Some(raw) = self.settlement_amount.as_deref() {
            record.settlement_amount = parse_amount("settlement_amount", raw);
        }
        if let Some(raw) = self.paid_date.as_deref() {
            record.paid_date = parse_flexible_date("paid_date", raw);
        }

        if let Some(raw) = self.office_address.as_deref() {
            record.office_address = truncate_text::<200>(Some(raw));
        }
        if let Some(raw) = self.resi_address.as_deref() {
            record.resi_address = truncate_text::<200>(Some(raw));
        }
        if let Some(raw) = self.pincode.as_deref() {
            record.pincode = truncate_text::<10>(Some(raw));
        }

        if let Some(raw) = self.disposition.as_deref() {
            record.disposition = coerce_enum::<Disposition>(Some(raw), None);
        }
        if let Some(raw) = self.calling_code.as_deref() {
            record.calling_code =
                coerce_enum::<CallingCode>(Some(raw), Some(base.calling_code)).unwrap_or(base.calling_code);
        }
        if let Some(raw) = self.field_code.as_deref() {
            record.field_code =
                coerce_enum::<FieldCode>(Some(raw), Some(base.field_code)).unwrap_or(base.field_code);
        }
        if let Some(raw) = self.followup_stage.as_deref() {
            record.followup_stage = coerce_enum::<FollowupStage>(Some(raw), None);
        }
        if let Some(raw) = self.comment.as_deref() {
            record.comment = truncate_text::<500>(Some(raw));
        }
        if let Some(raw) = self.scheduled_at.as_deref() {
            record.scheduled_at = parse_flexible_datetime("scheduled_at", raw).map(|dt| dt.and_utc());
        }

        record
    }

    /// Normalize a creation request against an empty shell.
    pub fn into_new_record(
        &self,
        default_agent: &str,
        now: DateTime<Utc>,
    ) -> Result<CustomerRecordModel, ValidationReport> {
        let agent = truncate_text::<100>(Some(default_agent))
            .unwrap_or_else(|| HeaplessString::try_from("unassigned").expect("fits"));
        let mut report = ValidationReport::new();
        let record = self.apply_to(&CustomerRecordModel::blank(agent, now), &mut report);
        if report.is_clean() {
            Ok(record)
        } else {
            Err(report)
        }
    }
}
