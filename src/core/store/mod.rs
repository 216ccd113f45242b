//! The document registry - durable system of record
//!
//! Every mutating operation runs inside a single immediate transaction, so
//! readers only ever observe committed state and concurrent writers are
//! serialized by SQLite itself. Approval uses a guarded UPDATE on the
//! expected status; the write that loses a race affects zero rows and
//! surfaces as a conflict instead of double-approving.

mod queries;
mod schema;
mod types;

pub use types::{AuditEvent, DocumentFilter, DocumentUpdate, DueBucket, NewDocument};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::Path;

use crate::core::actor::Actor;
use crate::core::document::Document;
use crate::core::error::{RegistryError, Result};
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::lifecycle;
use crate::core::review;
use crate::core::version::{ContentRef, Status, Version};

/// Registry backed by `.fdc/registry.db`
pub struct Registry {
    conn: Connection,
}

fn format_ts(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Registry {
    /// Open (creating if necessary) the registry at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::prepare(conn)
    }

    /// In-memory registry, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        match schema::stored_version(&conn)? {
            None => schema::create_schema(&conn)?,
            Some(v) if v == schema::SCHEMA_VERSION => {}
            Some(v) => {
                return Err(RegistryError::Validation(format!(
                    "registry schema version {} is not supported by this build (expected {})",
                    v,
                    schema::SCHEMA_VERSION
                )));
            }
        }

        Ok(Self { conn })
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Register a new controlled document with its initial draft version
    pub fn create_document(
        &mut self,
        new: NewDocument,
        content: ContentRef,
        actor: &Actor,
    ) -> Result<(Document, Version)> {
        let reference = new.reference.trim().to_string();
        if reference.is_empty() {
            return Err(RegistryError::Validation(
                "a document reference code is required".to_string(),
            ));
        }
        if new.title.trim().is_empty() {
            return Err(RegistryError::Validation(
                "a document title is required".to_string(),
            ));
        }
        if new.review_frequency_months == 0 {
            return Err(RegistryError::Validation(
                "review frequency must be at least one month".to_string(),
            ));
        }
        if content.url.is_empty() {
            return Err(RegistryError::Validation(
                "the initial version needs stored content".to_string(),
            ));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE reference = ?1 COLLATE NOCASE)",
            [&reference],
            |row| row.get(0),
        )?;
        if taken {
            return Err(RegistryError::Conflict(format!(
                "reference '{}' is already registered",
                reference
            )));
        }

        let now = Utc::now();
        let document_id = RecordId::new(RecordPrefix::Doc);
        let version_id = RecordId::new(RecordPrefix::Ver);

        tx.execute(
            "INSERT INTO documents (id, reference, title, description, category, process, tags, \
             owner, author, review_frequency_months, next_review, status, current_version_id, \
             created_at, updated_at, archived, archived_at, archived_by) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL, ?11, ?12, ?13, ?13, 0, NULL, NULL)",
            params![
                document_id.to_string(),
                reference,
                new.title.trim(),
                new.description,
                new.category.as_str(),
                new.process,
                queries::join_tags(&new.tags),
                new.owner,
                new.author,
                new.review_frequency_months,
                Status::Draft.to_string(),
                version_id.to_string(),
                format_ts(now),
            ],
        )?;

        tx.execute(
            "INSERT INTO versions (id, document_id, number, status, file_name, file_size, \
             media_type, file_url, created_by, created_at, approved_by, approved_at, \
             change_description) \
             VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, NULL, ?10)",
            params![
                version_id.to_string(),
                document_id.to_string(),
                Status::Draft.to_string(),
                content.file_name,
                content.file_size,
                content.media_type,
                content.url,
                actor.id,
                format_ts(now),
                "Initial version",
            ],
        )?;

        Self::record_event(&tx, &document_id, &version_id, "created", actor, now, None)?;

        let document = queries::get_document(&tx, &document_id)?;
        let version = queries::get_version(&tx, &document_id, &version_id)?;
        tx.commit()?;
        Ok((document, version))
    }

    /// Append a new version to an existing document
    ///
    /// Starts as Draft until the document has approval history, after which
    /// new versions enter review directly.
    pub fn create_version(
        &mut self,
        document_id: &RecordId,
        content: ContentRef,
        change_description: &str,
        actor: &Actor,
    ) -> Result<Version> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let document = queries::get_document(&tx, document_id)?;
        let version = Self::insert_version(&tx, &document, content, change_description, actor)?;
        tx.commit()?;
        Ok(version)
    }

    /// Move a draft version into review
    pub fn submit_version(
        &mut self,
        document_id: &RecordId,
        version_id: &RecordId,
        actor: &Actor,
    ) -> Result<Version> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let document = queries::get_document(&tx, document_id)?;
        Self::ensure_not_archived(&document)?;
        let version = queries::get_version(&tx, document_id, version_id)?;
        lifecycle::check_transition(&version, Status::PendingReview, actor)?;

        let now = Utc::now();
        let changed = tx.execute(
            "UPDATE versions SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![
                Status::PendingReview.to_string(),
                version_id.to_string(),
                Status::Draft.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RegistryError::Conflict(format!(
                "version {} changed state concurrently",
                version_id
            )));
        }

        Self::sync_document_mirror(&tx, document_id, now)?;
        Self::record_event(&tx, document_id, version_id, "submitted", actor, now, None)?;

        let version = queries::get_version(&tx, document_id, version_id)?;
        tx.commit()?;
        Ok(version)
    }

    /// Approve a pending version
    ///
    /// In one transaction: the version becomes Approved, any previously
    /// approved version is demoted to Obsolete, the document repoints its
    /// current version, mirrors the status, and gets its next review date.
    pub fn approve_version(
        &mut self,
        document_id: &RecordId,
        version_id: &RecordId,
        actor: &Actor,
        note: Option<&str>,
    ) -> Result<Version> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let document = queries::get_document(&tx, document_id)?;
        Self::ensure_not_archived(&document)?;
        let version = queries::get_version(&tx, document_id, version_id)?;
        lifecycle::check_transition(&version, Status::Approved, actor)?;

        let now = Utc::now();
        let changed = tx.execute(
            "UPDATE versions SET status = ?1, approved_by = ?2, approved_at = ?3 \
             WHERE id = ?4 AND status = ?5",
            params![
                Status::Approved.to_string(),
                actor.id,
                format_ts(now),
                version_id.to_string(),
                Status::PendingReview.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RegistryError::Conflict(format!(
                "version {} was approved or rejected concurrently",
                version_id
            )));
        }

        tx.execute(
            "UPDATE versions SET status = ?1 WHERE document_id = ?2 AND status = ?3 AND id != ?4",
            params![
                Status::Obsolete.to_string(),
                document_id.to_string(),
                Status::Approved.to_string(),
                version_id.to_string(),
            ],
        )?;

        let next_review =
            review::next_review_date(now.date_naive(), document.review_frequency_months);
        tx.execute(
            "UPDATE documents SET status = ?1, current_version_id = ?2, next_review = ?3, \
             updated_at = ?4 WHERE id = ?5",
            params![
                Status::Approved.to_string(),
                version_id.to_string(),
                format_date(next_review),
                format_ts(now),
                document_id.to_string(),
            ],
        )?;

        Self::record_event(&tx, document_id, version_id, "approved", actor, now, note)?;

        let version = queries::get_version(&tx, document_id, version_id)?;
        tx.commit()?;
        Ok(version)
    }

    /// Reject a pending version back to draft, recording who and why
    pub fn reject_version(
        &mut self,
        document_id: &RecordId,
        version_id: &RecordId,
        actor: &Actor,
        reason: &str,
    ) -> Result<Version> {
        if reason.trim().is_empty() {
            return Err(RegistryError::Validation(
                "a rejection reason is required".to_string(),
            ));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let document = queries::get_document(&tx, document_id)?;
        Self::ensure_not_archived(&document)?;
        let version = queries::get_version(&tx, document_id, version_id)?;
        lifecycle::check_transition(&version, Status::Draft, actor)?;

        let now = Utc::now();
        let changed = tx.execute(
            "UPDATE versions SET status = ?1, approved_by = ?2, approved_at = ?3 \
             WHERE id = ?4 AND status = ?5",
            params![
                Status::Draft.to_string(),
                actor.id,
                format_ts(now),
                version_id.to_string(),
                Status::PendingReview.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RegistryError::Conflict(format!(
                "version {} was approved or rejected concurrently",
                version_id
            )));
        }

        Self::sync_document_mirror(&tx, document_id, now)?;
        Self::record_event(
            &tx,
            document_id,
            version_id,
            "rejected",
            actor,
            now,
            Some(reason),
        )?;

        let version = queries::get_version(&tx, document_id, version_id)?;
        tx.commit()?;
        Ok(version)
    }

    /// Start a revision of an approved document
    ///
    /// The new version enters review immediately; the approved version keeps
    /// serving until its replacement is approved. Nothing is visible if any
    /// step fails.
    pub fn revise_document(
        &mut self,
        document_id: &RecordId,
        content: ContentRef,
        change_description: &str,
        actor: &Actor,
    ) -> Result<Version> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let document = queries::get_document(&tx, document_id)?;
        Self::ensure_not_archived(&document)?;

        let serving = match document.current_version_id {
            Some(ref current_id) => Some(queries::get_version(&tx, document_id, current_id)?),
            None => None,
        };
        match serving {
            Some(v) if v.status == Status::Approved => {}
            _ => {
                return Err(RegistryError::Validation(format!(
                    "document {} has no approved version to revise",
                    document.reference
                )));
            }
        }

        let version = Self::insert_version(&tx, &document, content, change_description, actor)?;
        tx.commit()?;
        Ok(version)
    }

    /// Retire a document; it stays readable but leaves default listings.
    /// Archival is an explicit control decision, so it carries the same
    /// authority requirement as approval.
    pub fn archive_document(&mut self, document_id: &RecordId, actor: &Actor) -> Result<Document> {
        if !actor.can_approve {
            return Err(RegistryError::Unauthorized {
                actor: actor.display_name.clone(),
            });
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let document = queries::get_document(&tx, document_id)?;
        if document.archived {
            return Err(RegistryError::Validation(format!(
                "document {} is already archived",
                document.reference
            )));
        }

        let now = Utc::now();
        tx.execute(
            "UPDATE documents SET archived = 1, archived_at = ?1, archived_by = ?2, \
             status = ?3, updated_at = ?1 WHERE id = ?4",
            params![
                format_ts(now),
                actor.id,
                Status::Archived.to_string(),
                document_id.to_string(),
            ],
        )?;

        let version_id = document
            .current_version_id
            .clone()
            .unwrap_or_else(|| document_id.clone());
        Self::record_event(&tx, document_id, &version_id, "archived", actor, now, None)?;

        let document = queries::get_document(&tx, document_id)?;
        tx.commit()?;
        Ok(document)
    }

    /// Edit document metadata; lifecycle state and history are untouchable
    pub fn update_document(
        &mut self,
        document_id: &RecordId,
        update: DocumentUpdate,
    ) -> Result<Document> {
        if update.is_empty() {
            return Err(RegistryError::Validation(
                "no fields to update".to_string(),
            ));
        }
        if matches!(update.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(RegistryError::Validation(
                "title cannot be empty".to_string(),
            ));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        queries::get_document(&tx, document_id)?;

        let mut assignments: Vec<String> = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = update.title {
            assignments.push(format!("title = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(title.trim().to_string()));
        }
        if let Some(description) = update.description {
            assignments.push(format!("description = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(description));
        }
        if let Some(process) = update.process {
            assignments.push(format!("process = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(process));
        }
        if let Some(owner) = update.owner {
            assignments.push(format!("owner = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(owner));
        }
        if let Some(tags) = update.tags {
            assignments.push(format!("tags = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(queries::join_tags(&tags)));
        }

        assignments.push(format!("updated_at = ?{}", params_vec.len() + 1));
        params_vec.push(Box::new(format_ts(Utc::now())));
        params_vec.push(Box::new(document_id.to_string()));

        let sql = format!(
            "UPDATE documents SET {} WHERE id = ?{}",
            assignments.join(", "),
            params_vec.len()
        );
        tx.execute(&sql, rusqlite::params_from_iter(params_vec.iter()))?;

        let document = queries::get_document(&tx, document_id)?;
        tx.commit()?;
        Ok(document)
    }

    /// Change the review policy. The stored next-review date is left alone;
    /// the new frequency takes effect at the next approval.
    pub fn set_review_frequency(
        &mut self,
        document_id: &RecordId,
        months: u32,
    ) -> Result<Document> {
        if months == 0 {
            return Err(RegistryError::Validation(
                "review frequency must be at least one month".to_string(),
            ));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        queries::get_document(&tx, document_id)?;
        tx.execute(
            "UPDATE documents SET review_frequency_months = ?1, updated_at = ?2 WHERE id = ?3",
            params![months, format_ts(Utc::now()), document_id.to_string()],
        )?;
        let document = queries::get_document(&tx, document_id)?;
        tx.commit()?;
        Ok(document)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn get_document(&self, id: &RecordId) -> Result<Document> {
        queries::get_document(&self.conn, id)
    }

    /// Resolve a document by full id, reference code, or unique id prefix
    pub fn find_document(&self, key: &str) -> Result<Document> {
        queries::find_document(&self.conn, key)
    }

    pub fn get_version(&self, document_id: &RecordId, version_id: &RecordId) -> Result<Version> {
        queries::get_version(&self.conn, document_id, version_id)
    }

    /// Version history, newest first
    pub fn list_versions(&self, document_id: &RecordId) -> Result<Vec<Version>> {
        queries::list_versions(&self.conn, document_id)
    }

    /// The draft or pending version awaiting action, if any
    pub fn open_version(&self, document_id: &RecordId) -> Result<Option<Version>> {
        queries::open_version(&self.conn, document_id)
    }

    pub fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        self.list_documents_as_of(filter, Utc::now().date_naive())
    }

    /// Like `list_documents` with an explicit anchor date for the due buckets
    pub fn list_documents_as_of(
        &self,
        filter: &DocumentFilter,
        today: NaiveDate,
    ) -> Result<Vec<Document>> {
        queries::list_documents(&self.conn, filter, today)
    }

    /// Audit trail for one document, oldest first
    pub fn list_events(&self, document_id: &RecordId) -> Result<Vec<AuditEvent>> {
        queries::list_events(&self.conn, document_id)
    }

    /// Every version with its document reference, for integrity audits
    pub fn list_all_versions(&self) -> Result<Vec<(String, Version)>> {
        queries::list_all_versions(&self.conn)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_not_archived(document: &Document) -> Result<()> {
        if document.archived {
            return Err(RegistryError::Validation(format!(
                "document {} is archived",
                document.reference
            )));
        }
        Ok(())
    }

    fn insert_version(
        tx: &Connection,
        document: &Document,
        content: ContentRef,
        change_description: &str,
        actor: &Actor,
    ) -> Result<Version> {
        if change_description.trim().is_empty() {
            return Err(RegistryError::Validation(
                "a change description is required".to_string(),
            ));
        }
        if content.url.is_empty() {
            return Err(RegistryError::Validation(
                "a new version needs stored content".to_string(),
            ));
        }
        if let Some(open) = queries::open_version(tx, &document.id)? {
            return Err(RegistryError::Validation(format!(
                "document {} already has version {} in {}; resolve it first",
                document.reference, open.number, open.status
            )));
        }

        let number = queries::max_version_number(tx, &document.id)? + 1;
        let status = if queries::has_approved_history(tx, &document.id)? {
            Status::PendingReview
        } else {
            Status::Draft
        };

        let now = Utc::now();
        let version_id = RecordId::new(RecordPrefix::Ver);
        tx.execute(
            "INSERT INTO versions (id, document_id, number, status, file_name, file_size, \
             media_type, file_url, created_by, created_at, approved_by, approved_at, \
             change_description) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL, NULL, ?11)",
            params![
                version_id.to_string(),
                document.id.to_string(),
                number,
                status.to_string(),
                content.file_name,
                content.file_size,
                content.media_type,
                content.url,
                actor.id,
                format_ts(now),
                change_description.trim(),
            ],
        )?;

        // An approved version keeps serving through a revision; otherwise the
        // new row becomes current and the document mirrors its status.
        if status == Status::Draft {
            tx.execute(
                "UPDATE documents SET current_version_id = ?1 WHERE id = ?2",
                params![version_id.to_string(), document.id.to_string()],
            )?;
        }
        Self::sync_document_mirror(tx, &document.id, now)?;

        Self::record_event(
            tx,
            &document.id,
            &version_id,
            "version_created",
            actor,
            now,
            Some(change_description.trim()),
        )?;
        if status == Status::PendingReview {
            Self::record_event(tx, &document.id, &version_id, "submitted", actor, now, None)?;
        }

        queries::get_version(tx, &document.id, &version_id)
    }

    /// Re-mirror the document status from its current version and touch
    /// `updated_at`
    fn sync_document_mirror(
        tx: &Connection,
        document_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        tx.execute(
            "UPDATE documents SET \
             status = COALESCE((SELECT status FROM versions \
                                WHERE versions.id = documents.current_version_id), status), \
             updated_at = ?1 \
             WHERE id = ?2",
            params![format_ts(now), document_id.to_string()],
        )?;
        Ok(())
    }

    fn record_event(
        tx: &Connection,
        document_id: &RecordId,
        version_id: &RecordId,
        event: &str,
        actor: &Actor,
        at: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<()> {
        tx.execute(
            "INSERT INTO events (document_id, version_id, event, actor, at, note) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                document_id.to_string(),
                version_id.to_string(),
                event,
                actor.id,
                format_ts(at),
                note,
            ],
        )?;
        Ok(())
    }
}
