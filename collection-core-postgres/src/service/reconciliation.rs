use chrono::Utc;
use heapless::String as HeaplessString;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use collection_core_api::domain::actor::Actor;
use collection_core_api::domain::changelog::diff_snapshots;
use collection_core_api::domain::duplicate::{match_identity, DuplicateHit};
use collection_core_api::domain::resolution::{
    append_suffix, plan_resolution, DuplicatePolicy, ResolutionPlan,
};
use collection_core_api::domain::validation::{truncate_text, ValidationIssue, ValidationReport};
use collection_core_api::error::{EngineError, EngineResult};
use collection_core_api::service::notification::{NoopNotifier, RecordNotifier};
use collection_core_api::service::outcome::{
    ConfirmSummary, CreateOutcome, ResolutionOutcome, StagedDuplicate, UpdateOutcome, UploadSummary,
};
use collection_core_db::models::record::change_log::ChangeLogEntryModel;
use collection_core_db::models::record::customer_record::{CustomerRecordModel, IDENTITY_FIELDS};
use collection_core_db::models::record::draft::{RecordDraft, UPLOAD_COLUMNS};
use collection_core_db::models::record::staged_upload::{StagedRecord, StagedUploadModel};
use collection_core_db::repository::allocate_uid::AllocateUid;
use collection_core_db::repository::append_changes::AppendChangeLog;
use collection_core_db::repository::create::CreateRecord;
use collection_core_db::repository::delete::DeleteRecord;
use collection_core_db::repository::find_by_id::FindById;
use collection_core_db::repository::find_by_mobile::FindByMobile;
use collection_core_db::repository::find_by_uid::FindByUid;
use collection_core_db::repository::find_duplicates::FindDuplicates;
use collection_core_db::repository::load_history::LoadHistory;
use collection_core_db::repository::pagination::{Page, PageRequest};
use collection_core_db::repository::scan_identity_values::ScanIdentityValues;
use collection_core_db::repository::staging::StagingRepository;
use collection_core_db::repository::update::UpdateRecord;

use crate::postgres_repositories::{PostgresRepositories, RecordSession};

/// How long a confirmed bulk upload may run before it is aborted with
/// nothing committed.
pub const DEFAULT_BULK_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a staged upload stays claimable before the purge reclaims it.
pub const DEFAULT_STAGING_TTL_HOURS: i64 = 24;

/// Orchestrates the reconciliation pipeline over PostgreSQL: validate,
/// detect duplicates, resolve, mutate, record the change log. Every public
/// operation runs as one transaction; on any error after the transaction
/// has begun, all of its effects are rolled back before the error is
/// surfaced.
pub struct ReconciliationService {
    repos: PostgresRepositories,
    notifier: Arc<dyn RecordNotifier>,
    bulk_timeout: Duration,
    staging_ttl: chrono::Duration,
}

impl ReconciliationService {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            repos: PostgresRepositories::new(pool),
            notifier: Arc::new(NoopNotifier),
            bulk_timeout: DEFAULT_BULK_TIMEOUT,
            staging_ttl: chrono::Duration::hours(DEFAULT_STAGING_TTL_HOURS),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn RecordNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_bulk_timeout(mut self, timeout: Duration) -> Self {
        self.bulk_timeout = timeout;
        self
    }

    pub fn with_staging_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.staging_ttl = ttl;
        self
    }

    /// Create one record: validate, detect duplicates, allocate the next
    /// identifier, insert. Duplicates and validation failures come back as
    /// outcomes for the caller to branch on.
    pub async fn create_record(
        &self,
        prefix: &str,
        draft: &RecordDraft,
        actor: &Actor,
    ) -> EngineResult<CreateOutcome> {
        let actor_name = actor.require()?.to_string();
        let session = self.begin().await?;
        let result = self.create_record_in(&session, prefix, draft, &actor_name).await;
        self.finish(session, result).await
    }

    /// Update one record: re-validate, re-check identity fields against all
    /// *other* records, write the new state and its field-level audit trail
    /// in one transaction.
    pub async fn update_record(
        &self,
        id: i64,
        draft: &RecordDraft,
        actor: &Actor,
    ) -> EngineResult<UpdateOutcome> {
        let actor_name = actor.require()?.to_string();
        let session = self.begin().await?;
        let result = async {
            let existing = session
                .record_repository
                .find_by_id(id)
                .await
                .map_err(storage_err("record load"))?
                .ok_or_else(|| EngineError::NotFound(format!("customer record {id}")))?;
            self.apply_draft(&session, existing, draft, &actor_name).await
        }
        .await;
        self.finish(session, result).await
    }

    /// Resolve a detected duplicate under a caller-chosen policy.
    pub async fn resolve_duplicate(
        &self,
        prefix: &str,
        draft: &RecordDraft,
        policy: DuplicatePolicy,
        actor: &Actor,
    ) -> EngineResult<ResolutionOutcome> {
        let actor_name = actor.require()?.to_string();
        let session = self.begin().await?;
        let result = self
            .resolve_duplicate_in(&session, prefix, draft, policy, &actor_name)
            .await;
        self.finish(session, result).await
    }

    /// Patch named descriptive fields of one record. Only allow-listed
    /// columns can be touched; identity-bearing fields must go through
    /// [`update_record`](Self::update_record).
    pub async fn patch_record_fields(
        &self,
        record_uid: &str,
        updates: &BTreeMap<String, String>,
        actor: &Actor,
    ) -> EngineResult<UpdateOutcome> {
        let actor_name = actor.require()?.to_string();
        let mut issues: Vec<ValidationIssue> = Vec::new();
        let mut draft = RecordDraft::default();
        for (field, value) in updates {
            if !draft.set_field(field, value) {
                issues.push(ValidationIssue {
                    field: field.clone(),
                    message: "Field cannot be patched.".to_string(),
                });
            }
        }
        if !issues.is_empty() {
            return Ok(UpdateOutcome::Rejected { issues });
        }

        let session = self.begin().await?;
        let result = async {
            let existing = session
                .record_repository
                .find_by_uid(record_uid)
                .await
                .map_err(storage_err("record load"))?
                .ok_or_else(|| EngineError::NotFound(format!("customer record {record_uid}")))?;
            self.apply_draft(&session, existing, &draft, &actor_name).await
        }
        .await;
        self.finish(session, result).await
    }

    /// Reassign the record to another agent, logging the handover only when
    /// the agent actually changes.
    pub async fn reassign_agent(
        &self,
        record_uid: &str,
        new_agent: &str,
        actor: &Actor,
    ) -> EngineResult<UpdateOutcome> {
        let mut updates = BTreeMap::new();
        updates.insert("agent_name".to_string(), new_agent.to_string());
        self.patch_record_fields(record_uid, &updates, actor).await
    }

    /// Screen an uploaded batch and stage the clean rows durably for a
    /// later confirmation. Identifiers are not assigned here; abandoned
    /// stages must never consume sequence values.
    pub async fn stage_upload(
        &self,
        prefix: &str,
        header_mapping: &BTreeMap<String, String>,
        rows: &[BTreeMap<String, String>],
        actor: &Actor,
    ) -> EngineResult<UploadSummary> {
        let actor_name = actor.require()?.to_string();
        let session = self.begin().await?;
        let result = self
            .stage_upload_in(&session, prefix, header_mapping, rows, &actor_name)
            .await;
        self.finish(session, result).await
    }

    /// Confirm (or discard) a staged upload. The whole batch commits as one
    /// transaction under [`bulk_timeout`](Self::with_bulk_timeout); rows
    /// that began colliding after staging are skipped and counted. On
    /// timeout nothing at all is committed.
    pub async fn confirm_upload(
        &self,
        upload_id: Uuid,
        proceed: bool,
        actor: &Actor,
    ) -> EngineResult<ConfirmSummary> {
        let actor_name = actor.require()?.to_string();
        let session = self.begin().await?;
        let result = async {
            let staged = session
                .staging_repository
                .take(upload_id)
                .await
                .map_err(storage_err("staging claim"))?
                .ok_or_else(|| EngineError::NotFound(format!("staged upload {upload_id}")))?;

            if !proceed {
                return Ok(ConfirmSummary { inserted: Vec::new(), skipped: 0 });
            }

            let records = staged
                .records()
                .map_err(|err| EngineError::storage("staged payload decode", err))?;
            let prefix = staged.prefix.to_string();

            let work = self.insert_staged_records(&session, &prefix, &records, &actor_name);
            match tokio::time::timeout(self.bulk_timeout, work).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::BulkTimeout),
            }
        }
        .await;

        let summary = self.finish(session, result).await?;
        if !summary.inserted.is_empty() {
            self.notify_created(summary.inserted.clone());
        }
        Ok(summary)
    }

    /// Read one record's change history, newest first.
    pub async fn fetch_history(
        &self,
        record_id: i64,
        page: PageRequest,
    ) -> EngineResult<Page<ChangeLogEntryModel>> {
        let session = self.begin().await?;
        let result = async {
            session
                .record_repository
                .find_by_id(record_id)
                .await
                .map_err(storage_err("record load"))?
                .ok_or_else(|| EngineError::NotFound(format!("customer record {record_id}")))?;
            session
                .change_log_repository
                .load_history(record_id, page)
                .await
                .map_err(storage_err("history load"))
        }
        .await;
        self.finish(session, result).await
    }

    /// Delete one record; its change log cascades.
    pub async fn delete_record(&self, id: i64, actor: &Actor) -> EngineResult<bool> {
        actor.require()?;
        let session = self.begin().await?;
        let result = session
            .record_repository
            .delete(id)
            .await
            .map_err(storage_err("record delete"));
        self.finish(session, result).await
    }

    pub async fn find_by_uid(&self, record_uid: &str) -> EngineResult<Option<CustomerRecordModel>> {
        let session = self.begin().await?;
        let result = session
            .record_repository
            .find_by_uid(record_uid)
            .await
            .map_err(storage_err("record load"));
        self.finish(session, result).await
    }

    pub async fn find_by_mobile(&self, mobile: &str) -> EngineResult<Option<CustomerRecordModel>> {
        let session = self.begin().await?;
        let result = session
            .record_repository
            .find_by_mobile(mobile)
            .await
            .map_err(storage_err("record load"));
        self.finish(session, result).await
    }

    /// Reclaim staged uploads that were never confirmed.
    pub async fn purge_expired_uploads(&self) -> EngineResult<u64> {
        let session = self.begin().await?;
        let result = session
            .staging_repository
            .purge_expired(Utc::now())
            .await
            .map_err(storage_err("staging purge"));
        self.finish(session, result).await
    }

    async fn begin(&self) -> EngineResult<RecordSession> {
        self.repos
            .create_session()
            .await
            .map_err(|err| EngineError::storage("transaction begin", err))
    }

    /// Commit on success, roll back on error. Every operation funnels
    /// through here so no path can leave a half-applied mutation.
    async fn finish<T>(&self, session: RecordSession, result: EngineResult<T>) -> EngineResult<T> {
        match result {
            Ok(value) => {
                session
                    .commit()
                    .await
                    .map_err(|err| EngineError::storage("transaction commit", err))?;
                Ok(value)
            }
            Err(err) => {
                session.rollback().await;
                Err(err)
            }
        }
    }

    async fn create_record_in(
        &self,
        session: &RecordSession,
        prefix: &str,
        draft: &RecordDraft,
        actor_name: &str,
    ) -> EngineResult<CreateOutcome> {
        let mut record = match draft.into_new_record(actor_name, Utc::now()) {
            Ok(record) => record,
            Err(report) => {
                return Ok(CreateOutcome::Rejected { issues: report.into_issues() });
            }
        };

        let identity = record.identity_values();
        let rows = session
            .record_repository
            .find_duplicates(&identity, None)
            .await
            .map_err(storage_err("duplicate detection"))?;
        let report = match_identity(&identity, &rows);
        if !report.is_empty() {
            return Ok(CreateOutcome::Duplicate { report });
        }

        let uid = session
            .record_repository
            .allocate_uid(prefix)
            .await
            .map_err(storage_err("identifier allocation"))?;
        record.record_uid = HeaplessString::try_from(uid.as_str())
            .map_err(|_| EngineError::MalformedIdentifier(uid.clone()))?;

        let saved = session
            .record_repository
            .create(record)
            .await
            .map_err(storage_err("record insert"))?;

        tracing::info!(record_uid = %saved.record_uid, "customer record created");
        Ok(CreateOutcome::Created { id: saved.id, record_uid: saved.record_uid.to_string() })
    }

    /// Shared tail of update and patch: validate the draft against the
    /// stored record, re-check duplicates excluding it, persist the new
    /// state together with its change-log entries.
    async fn apply_draft(
        &self,
        session: &RecordSession,
        existing: CustomerRecordModel,
        draft: &RecordDraft,
        actor_name: &str,
    ) -> EngineResult<UpdateOutcome> {
        let mut report = ValidationReport::new();
        let mut updated = draft.apply_to(&existing, &mut report);
        if !report.is_clean() {
            return Ok(UpdateOutcome::Rejected { issues: report.into_issues() });
        }

        let identity = updated.identity_values();
        let rows = session
            .record_repository
            .find_duplicates(&identity, Some(existing.id))
            .await
            .map_err(storage_err("duplicate detection"))?;
        let duplicate = match_identity(&identity, &rows);
        if !duplicate.is_empty() {
            return Ok(UpdateOutcome::Duplicate { report: duplicate });
        }

        let changes = diff_snapshots(&existing.snapshot(), &updated.snapshot());
        let record_uid = existing.record_uid.to_string();
        if changes.is_empty() {
            return Ok(UpdateOutcome::Updated { record_uid, changes });
        }

        updated.last_updated = Utc::now();
        session
            .record_repository
            .update(updated)
            .await
            .map_err(storage_err("record update"))?;
        session
            .change_log_repository
            .append_changes(existing.id, &record_uid, &changes, actor_name)
            .await
            .map_err(storage_err("change log append"))?;

        tracing::info!(%record_uid, changed_fields = changes.len(), "customer record updated");
        Ok(UpdateOutcome::Updated { record_uid, changes })
    }

    async fn resolve_duplicate_in(
        &self,
        session: &RecordSession,
        prefix: &str,
        draft: &RecordDraft,
        policy: DuplicatePolicy,
        actor_name: &str,
    ) -> EngineResult<ResolutionOutcome> {
        let mut record = match draft.into_new_record(actor_name, Utc::now()) {
            Ok(record) => record,
            Err(report) => {
                return Ok(ResolutionOutcome::Rejected { issues: report.into_issues() });
            }
        };

        let identity = record.identity_values();
        let rows = session
            .record_repository
            .find_duplicates(&identity, None)
            .await
            .map_err(storage_err("duplicate detection"))?;
        let report = match_identity(&identity, &rows);

        match plan_resolution(policy, &report)? {
            ResolutionPlan::NoOp => Ok(ResolutionOutcome::Skipped),
            ResolutionPlan::Defer(report) => Ok(ResolutionOutcome::Deferred { report }),
            ResolutionPlan::InsertSuffixed { fields } => {
                for field in &fields {
                    let field_name = identity_field(field)?;
                    let base = record.identity_value(field_name).ok_or_else(|| {
                        EngineError::Storage(format!("colliding field {field_name} has no value"))
                    })?;
                    let existing_values = session
                        .record_repository
                        .scan_identity_values(field_name, &base)
                        .await
                        .map_err(storage_err("suffix scan"))?;
                    let suffixed = append_suffix(&base, &existing_values);
                    if !record.set_identity_value(field_name, &suffixed) {
                        return Err(EngineError::Storage(format!(
                            "suffixed value for {field_name} exceeds column width"
                        )));
                    }
                }

                let uid = session
                    .record_repository
                    .allocate_uid(prefix)
                    .await
                    .map_err(storage_err("identifier allocation"))?;
                record.record_uid = HeaplessString::try_from(uid.as_str())
                    .map_err(|_| EngineError::MalformedIdentifier(uid.clone()))?;
                let saved = session
                    .record_repository
                    .create(record)
                    .await
                    .map_err(storage_err("record insert"))?;
                Ok(ResolutionOutcome::Created {
                    id: saved.id,
                    record_uid: saved.record_uid.to_string(),
                })
            }
            ResolutionPlan::ReplaceExisting { delete_ids, reuse_uid } => {
                for id in &delete_ids {
                    session
                        .record_repository
                        .delete(*id)
                        .await
                        .map_err(storage_err("record delete"))?;
                }
                record.record_uid = HeaplessString::try_from(reuse_uid.as_str())
                    .map_err(|_| EngineError::MalformedIdentifier(reuse_uid.clone()))?;
                let saved = session
                    .record_repository
                    .create(record)
                    .await
                    .map_err(storage_err("record insert"))?;
                tracing::info!(record_uid = %saved.record_uid, replaced = delete_ids.len(), "record replaced");
                Ok(ResolutionOutcome::Replaced {
                    id: saved.id,
                    record_uid: saved.record_uid.to_string(),
                    replaced_ids: delete_ids,
                })
            }
        }
    }

    async fn stage_upload_in(
        &self,
        session: &RecordSession,
        prefix: &str,
        header_mapping: &BTreeMap<String, String>,
        rows: &[BTreeMap<String, String>],
        actor_name: &str,
    ) -> EngineResult<UploadSummary> {
        let prefix: HeaplessString<8> = HeaplessString::try_from(prefix)
            .map_err(|_| EngineError::MalformedIdentifier(prefix.to_string()))?;

        let now = Utc::now();
        let mut duplicates = Vec::new();
        let mut rejected = Vec::new();
        let mut stageable: Vec<StagedRecord> = Vec::new();
        // Identity values already accepted earlier in this batch.
        let mut seen: HashMap<(&'static str, String), usize> = HashMap::new();

        for (idx, raw_row) in rows.iter().enumerate() {
            let row_no = idx + 1;

            let mut staged = StagedRecord::new();
            for (canonical, file_header) in header_mapping {
                if !UPLOAD_COLUMNS.contains(&canonical.as_str()) {
                    continue;
                }
                if let Some(value) = raw_row.get(file_header) {
                    let value = value.trim();
                    if !value.is_empty() {
                        staged.insert(canonical.clone(), value.to_string());
                    }
                }
            }

            let draft = RecordDraft::from_staged(&staged);
            let record = match draft.into_new_record(actor_name, now) {
                Ok(record) => record,
                Err(report) => {
                    rejected.push((row_no, report.into_issues()));
                    continue;
                }
            };

            let identity = record.identity_values();
            let db_rows = session
                .record_repository
                .find_duplicates(&identity, None)
                .await
                .map_err(storage_err("duplicate detection"))?;
            let mut report = match_identity(&identity, &db_rows);
            for (field, value) in &identity {
                let value = match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                    Some(value) => value,
                    None => continue,
                };
                if let Some(earlier) = seen.get(&(*field, value.to_string())) {
                    report.hits.push(DuplicateHit {
                        field: field.to_string(),
                        record_id: 0,
                        record_uid: String::new(),
                        customer_name: Some(format!("uploaded row {earlier}")),
                        value: value.to_string(),
                    });
                }
            }

            if !report.is_empty() {
                duplicates.push(StagedDuplicate { row: row_no, report });
                continue;
            }

            for (field, value) in &identity {
                if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                    seen.insert((*field, value.to_string()), row_no);
                }
            }
            stageable.push(staged);
        }

        let upload_id = if stageable.is_empty() {
            None
        } else {
            let staged_by = truncate_text::<100>(Some(actor_name))
                .ok_or(EngineError::MissingActor)?;
            let model = StagedUploadModel::new(prefix, &stageable, staged_by, now, self.staging_ttl);
            session
                .staging_repository
                .stage(&model)
                .await
                .map_err(storage_err("staging write"))?;
            Some(model.upload_id)
        };

        Ok(UploadSummary {
            upload_id,
            total_rows: rows.len(),
            staged_rows: stageable.len(),
            duplicates,
            rejected,
        })
    }

    /// Insert every staged row that still passes screening. Runs inside the
    /// confirmation transaction, so earlier inserts of the same batch are
    /// visible to the duplicate query.
    async fn insert_staged_records(
        &self,
        session: &RecordSession,
        prefix: &str,
        records: &[StagedRecord],
        actor_name: &str,
    ) -> EngineResult<ConfirmSummary> {
        let mut inserted = Vec::new();
        let mut skipped = 0usize;

        for staged_record in records {
            let draft = RecordDraft::from_staged(staged_record);
            let mut record = match draft.into_new_record(actor_name, Utc::now()) {
                Ok(record) => record,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            let identity = record.identity_values();
            let rows = session
                .record_repository
                .find_duplicates(&identity, None)
                .await
                .map_err(storage_err("duplicate detection"))?;
            if !match_identity(&identity, &rows).is_empty() {
                skipped += 1;
                continue;
            }

            let uid = session
                .record_repository
                .allocate_uid(prefix)
                .await
                .map_err(storage_err("identifier allocation"))?;
            record.record_uid = HeaplessString::try_from(uid.as_str())
                .map_err(|_| EngineError::MalformedIdentifier(uid.clone()))?;
            let saved = session
                .record_repository
                .create(record)
                .await
                .map_err(storage_err("record insert"))?;
            inserted.push(saved.record_uid.to_string());
        }

        Ok(ConfirmSummary { inserted, skipped })
    }

    fn notify_created(&self, record_uids: Vec<String>) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.records_created(record_uids).await {
                tracing::warn!(%err, "records-created notification failed");
            }
        });
    }
}

/// Map a repository failure to the surfaced error, letting engine errors
/// raised below the repository boundary (malformed stored identifiers)
/// propagate with their own identity.
fn storage_err(context: &'static str) -> impl FnOnce(Box<dyn Error + Send + Sync>) -> EngineError {
    move |err| match err.downcast::<EngineError>() {
        Ok(engine) => *engine,
        Err(err) => EngineError::storage(context, err),
    }
}

fn identity_field(field: &str) -> EngineResult<&'static str> {
    IDENTITY_FIELDS
        .iter()
        .copied()
        .find(|candidate| *candidate == field)
        .ok_or_else(|| EngineError::Storage(format!("'{field}' is not an identity column")))
}
