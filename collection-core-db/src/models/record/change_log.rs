use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use serde::{Deserialize, Serialize};

use crate::models::identifiable::Identifiable;

/// One immutable row of the record audit trail: a single field's mutation,
/// who made it and when. Written only inside the mutating transaction, never
/// updated, deleted only by cascade with the owning record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntryModel {
    pub id: i64,
    /// Storage id of the owning record.
    pub record_id: i64,
    /// External identifier of the owning record at the time of the change.
    pub record_uid: HeaplessString<20>,
    pub field: HeaplessString<50>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: HeaplessString<100>,
    pub changed_at: DateTime<Utc>,
}

impl Identifiable for ChangeLogEntryModel {
    fn get_id(&self) -> i64 {
        self.id
    }
}
