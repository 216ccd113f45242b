//! Registry input, filter, and audit types

use chrono::{DateTime, Utc};

use crate::core::document::Category;
use crate::core::review::DEFAULT_DUE_SOON_DAYS;
use crate::core::version::Status;

/// Input for registering a new controlled document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub reference: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub process: Option<String>,
    pub tags: Vec<String>,
    pub owner: String,
    /// Original author when distinct from the owner
    pub author: Option<String>,
    pub review_frequency_months: u32,
}

/// Review-due bucket for filtered listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBucket {
    Overdue,
    DueSoon,
}

/// Filter for listing documents
///
/// Predicates combine independently; every field defaults to "no filter".
/// Results are ordered newest-updated-first with a stable id tie-break.
#[derive(Debug)]
pub struct DocumentFilter {
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub owner: Option<String>,
    pub process: Option<String>,
    /// Free-text search over title and reference
    pub search: Option<String>,
    pub due: Option<DueBucket>,
    /// Horizon in days for the due-soon bucket
    pub due_horizon_days: u32,
    /// Include archived documents (excluded by default)
    pub include_archived: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self {
            category: None,
            status: None,
            owner: None,
            process: None,
            search: None,
            due: None,
            due_horizon_days: DEFAULT_DUE_SOON_DAYS,
            include_archived: false,
            limit: None,
            offset: None,
        }
    }
}

/// Metadata fields that may be edited on an existing document
///
/// Lifecycle state, version history, and the stored review date are out of
/// reach here; `None` leaves a field unchanged.
#[derive(Debug, Default, Clone)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub process: Option<String>,
    pub owner: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl DocumentUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.process.is_none()
            && self.owner.is_none()
            && self.tags.is_none()
    }
}

/// One row of the append-only audit trail
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub document_id: String,
    pub version_id: String,
    pub event: String,
    pub actor: String,
    pub at: DateTime<Utc>,
    pub note: Option<String>,
}
