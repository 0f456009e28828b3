use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Raw field-name to value map of one uploaded row, already passed through
/// the header mapping. Kept as strings; normalization happens at confirm.
pub type StagedRecord = BTreeMap<String, String>;

/// Durable staging row for a pending bulk upload.
///
/// Any instance can confirm the upload by its id; rows that outlive
/// `expires_at` without confirmation are reclaimed by the purge job. This
/// replaces keeping pending uploads in process memory, which cannot survive
/// a restart and is invisible to other instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedUploadModel {
    pub upload_id: Uuid,
    /// Identifier prefix the confirmed records will be allocated under.
    pub prefix: HeaplessString<8>,
    /// The stageable rows, serialized as a JSON array of field maps.
    pub payload: serde_json::Value,
    pub staged_by: HeaplessString<100>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StagedUploadModel {
    pub fn new(
        prefix: HeaplessString<8>,
        records: &[StagedRecord],
        staged_by: HeaplessString<100>,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            upload_id: Uuid::new_v4(),
            prefix,
            payload: serde_json::to_value(records).expect("string maps serialize"),
            staged_by,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn records(&self) -> Result<Vec<StagedRecord>, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips() {
        let mut row = StagedRecord::new();
        row.insert("mobile".to_string(), "9998887777".to_string());
        row.insert("customer_name".to_string(), "Asha Rao".to_string());
        let staged = StagedUploadModel::new(
            HeaplessString::try_from("FF").unwrap(),
            &[row.clone()],
            HeaplessString::try_from("priya").unwrap(),
            Utc::now(),
            chrono::Duration::hours(24),
        );
        assert_eq!(staged.records().unwrap(), vec![row]);
        assert!(staged.expires_at > staged.created_at);
    }
}
