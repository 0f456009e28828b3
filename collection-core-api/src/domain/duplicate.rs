use serde::{Deserialize, Serialize};

/// One identity-field collision between a candidate and a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateHit {
    /// The colliding identity field, e.g. `mobile` or `crn`.
    pub field: String,
    /// Storage id of the conflicting record.
    pub record_id: i64,
    /// External identifier of the conflicting record.
    pub record_uid: String,
    /// Name of the conflicting customer, when known, so the caller can
    /// present an informed choice instead of a bare "duplicate".
    pub customer_name: Option<String>,
    /// The shared value.
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub hits: Vec<DuplicateHit>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Ids of every conflicting record, deduplicated, in first-seen order.
    pub fn conflicting_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for hit in &self.hits {
            if !ids.contains(&hit.record_id) {
                ids.push(hit.record_id);
            }
        }
        ids
    }

    /// Fields that collided, deduplicated, in first-seen order.
    pub fn colliding_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for hit in &self.hits {
            if !fields.contains(&hit.field.as_str()) {
                fields.push(&hit.field);
            }
        }
        fields
    }

    /// Human-readable message per hit, naming the field, the value and the
    /// conflicting customer.
    pub fn messages(&self) -> Vec<String> {
        self.hits
            .iter()
            .map(|hit| {
                let owner = hit
                    .customer_name
                    .as_deref()
                    .unwrap_or(hit.record_uid.as_str());
                format!(
                    "{} {} is already registered with customer {}",
                    field_label(&hit.field),
                    hit.value,
                    owner
                )
            })
            .collect()
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "mobile" => "Phone number",
        "email" => "Email address",
        "crn" => "CRN",
        "loan_card_no" => "Loan card number",
        f if f.starts_with("alt_mobile") => "Alternate phone number",
        other => other,
    }
}

/// Identity projection of one stored record, as returned by the storage
/// duplicate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRow {
    pub record_id: i64,
    pub record_uid: String,
    pub customer_name: Option<String>,
    pub values: Vec<(&'static str, Option<String>)>,
}

/// Pure half of the duplicate detector: compare a candidate's identity
/// values against the rows the storage query returned.
///
/// Equality is field-for-field: a candidate's `mobile` only collides with a
/// stored `mobile`, never with a stored `email`. Empty values on either side
/// never collide.
pub fn match_identity(
    candidate: &[(&'static str, Option<String>)],
    rows: &[IdentityRow],
) -> DuplicateReport {
    let mut report = DuplicateReport::default();
    for row in rows {
        for (field, candidate_value) in candidate {
            let candidate_value = match non_empty(candidate_value) {
                Some(v) => v,
                None => continue,
            };
            let row_value = row
                .values
                .iter()
                .find(|(name, _)| name == field)
                .and_then(|(_, v)| non_empty(v));
            if row_value == Some(candidate_value) {
                report.hits.push(DuplicateHit {
                    field: field.to_string(),
                    record_id: row.record_id,
                    record_uid: row.record_uid.clone(),
                    customer_name: row.customer_name.clone(),
                    value: candidate_value.to_string(),
                });
            }
        }
    }
    report
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
