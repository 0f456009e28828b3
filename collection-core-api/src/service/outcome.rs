use serde::{Deserialize, Serialize};

use crate::domain::changelog::FieldChange;
use crate::domain::duplicate::DuplicateReport;
use crate::domain::validation::ValidationIssue;

/// Result of a create operation. Validation failures and duplicate
/// conflicts are expected outcomes the caller branches on, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateOutcome {
    Created { id: i64, record_uid: String },
    Rejected { issues: Vec<ValidationIssue> },
    Duplicate { report: DuplicateReport },
}

/// Result of an update or field-patch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
    Updated { record_uid: String, changes: Vec<FieldChange> },
    Rejected { issues: Vec<ValidationIssue> },
    Duplicate { report: DuplicateReport },
}

/// Result of resolving a detected duplicate under a caller-chosen policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// `skip`: nothing was written.
    Skipped,
    /// `prompt`: the report goes back upstream; nothing was written.
    Deferred { report: DuplicateReport },
    /// The candidate was inserted (plain or with suffixed identity fields).
    Created { id: i64, record_uid: String },
    /// `replace`: the conflicting records were deleted and the candidate
    /// inserted under the retained identifier.
    Replaced { id: i64, record_uid: String, replaced_ids: Vec<i64> },
    Rejected { issues: Vec<ValidationIssue> },
}

/// One staged-upload row that collided with an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedDuplicate {
    /// 1-based row number within the uploaded file.
    pub row: usize,
    pub report: DuplicateReport,
}

/// Summary returned when an upload is staged for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Absent when no row survived validation and duplicate screening, in
    /// which case there is nothing to confirm.
    pub upload_id: Option<uuid::Uuid>,
    pub total_rows: usize,
    pub staged_rows: usize,
    pub duplicates: Vec<StagedDuplicate>,
    pub rejected: Vec<(usize, Vec<ValidationIssue>)>,
}

/// Summary returned by bulk-upload confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmSummary {
    /// Records inserted; zero when the upload was discarded.
    pub inserted: Vec<String>,
    /// Rows skipped because they began colliding after staging.
    pub skipped: usize,
}
