//! Read-side queries and row mapping for the registry

use chrono::{DateTime, Days, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::core::document::{Category, Document};
use crate::core::error::{RegistryError, Result};
use crate::core::identity::RecordId;
use crate::core::store::types::{AuditEvent, DocumentFilter, DueBucket};
use crate::core::version::{ContentRef, Status, Version};

pub(crate) const DOCUMENT_COLUMNS: &str = "id, reference, title, description, category, process, \
     tags, owner, author, review_frequency_months, next_review, status, current_version_id, \
     created_at, updated_at, archived, archived_at, archived_by";

pub(crate) const VERSION_COLUMNS: &str = "id, document_id, number, status, file_name, file_size, \
     media_type, file_url, created_by, created_at, approved_by, approved_at, change_description";

fn conversion_failure(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

fn parse_id(idx: usize, raw: String) -> rusqlite::Result<RecordId> {
    RecordId::parse(&raw).map_err(|e| conversion_failure(idx, e))
}

/// Tags are stored as a comma-joined string; empty means no tags
fn split_tags(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

pub(crate) fn document_from_row(row: &Row) -> rusqlite::Result<Document> {
    let status: String = row.get(11)?;
    let category: String = row.get(4)?;
    let next_review: Option<String> = row.get(10)?;
    let current_version_id: Option<String> = row.get(12)?;
    let archived_at: Option<String> = row.get(16)?;

    Ok(Document {
        id: parse_id(0, row.get(0)?)?,
        reference: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: category
            .parse::<Category>()
            .map_err(|e| conversion_failure(4, e))?,
        process: row.get(5)?,
        tags: split_tags(row.get(6)?),
        owner: row.get(7)?,
        author: row.get(8)?,
        review_frequency_months: row.get(9)?,
        next_review: next_review
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_failure(10, e))
            })
            .transpose()?,
        status: status
            .parse::<Status>()
            .map_err(|e| conversion_failure(11, e))?,
        current_version_id: current_version_id.map(|s| parse_id(12, s)).transpose()?,
        created_at: parse_timestamp(13, row.get(13)?)?,
        updated_at: parse_timestamp(14, row.get(14)?)?,
        archived: row.get(15)?,
        archived_at: archived_at.map(|s| parse_timestamp(16, s)).transpose()?,
        archived_by: row.get(17)?,
    })
}

pub(crate) fn version_from_row(row: &Row) -> rusqlite::Result<Version> {
    let status: String = row.get(3)?;
    let approved_at: Option<String> = row.get(11)?;

    Ok(Version {
        id: parse_id(0, row.get(0)?)?,
        document_id: parse_id(1, row.get(1)?)?,
        number: row.get(2)?,
        status: status
            .parse::<Status>()
            .map_err(|e| conversion_failure(3, e))?,
        content: ContentRef {
            file_name: row.get(4)?,
            file_size: row.get(5)?,
            media_type: row.get(6)?,
            url: row.get(7)?,
        },
        created_by: row.get(8)?,
        created_at: parse_timestamp(9, row.get(9)?)?,
        approved_by: row.get(10)?,
        approved_at: approved_at.map(|s| parse_timestamp(11, s)).transpose()?,
        change_description: row.get(12)?,
    })
}

fn event_from_row(row: &Row) -> rusqlite::Result<AuditEvent> {
    Ok(AuditEvent {
        document_id: row.get(0)?,
        version_id: row.get(1)?,
        event: row.get(2)?,
        actor: row.get(3)?,
        at: parse_timestamp(4, row.get(4)?)?,
        note: row.get(5)?,
    })
}

/// Fetch a document by exact id
pub(crate) fn get_document(conn: &Connection, id: &RecordId) -> Result<Document> {
    let sql = format!("SELECT {} FROM documents WHERE id = ?1", DOCUMENT_COLUMNS);
    conn.query_row(&sql, [id.to_string()], document_from_row)
        .optional()?
        .ok_or_else(|| RegistryError::NotFound(format!("document {}", id)))
}

/// Resolve a document by id, reference code, or unique id prefix
pub(crate) fn find_document(conn: &Connection, key: &str) -> Result<Document> {
    if let Ok(id) = RecordId::parse(key) {
        return get_document(conn, &id);
    }

    let by_reference = format!(
        "SELECT {} FROM documents WHERE reference = ?1 COLLATE NOCASE",
        DOCUMENT_COLUMNS
    );
    if let Some(doc) = conn
        .query_row(&by_reference, [key], document_from_row)
        .optional()?
    {
        return Ok(doc);
    }

    // Partial ULID match, handy on the command line
    let by_prefix = format!(
        "SELECT {} FROM documents WHERE id LIKE ?1 LIMIT 2",
        DOCUMENT_COLUMNS
    );
    let pattern = format!("DOC-{}%", key.to_uppercase());
    let mut stmt = conn.prepare(&by_prefix)?;
    let matches: Vec<Document> = stmt
        .query_map([pattern], document_from_row)?
        .collect::<rusqlite::Result<_>>()?;

    let mut matches = matches.into_iter();
    match (matches.next(), matches.next()) {
        (Some(doc), None) => Ok(doc),
        (None, _) => Err(RegistryError::NotFound(format!("document '{}'", key))),
        _ => Err(RegistryError::Validation(format!(
            "'{}' matches more than one document; use the full id",
            key
        ))),
    }
}

/// Fetch one version of a document
pub(crate) fn get_version(
    conn: &Connection,
    document_id: &RecordId,
    version_id: &RecordId,
) -> Result<Version> {
    let sql = format!(
        "SELECT {} FROM versions WHERE id = ?1 AND document_id = ?2",
        VERSION_COLUMNS
    );
    conn.query_row(
        &sql,
        [version_id.to_string(), document_id.to_string()],
        version_from_row,
    )
    .optional()?
    .ok_or_else(|| {
        RegistryError::NotFound(format!("version {} of document {}", version_id, document_id))
    })
}

/// All versions of a document, newest first
pub(crate) fn list_versions(conn: &Connection, document_id: &RecordId) -> Result<Vec<Version>> {
    let sql = format!(
        "SELECT {} FROM versions WHERE document_id = ?1 ORDER BY number DESC",
        VERSION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let versions = stmt
        .query_map([document_id.to_string()], version_from_row)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(versions)
}

/// The unresolved (draft or pending) version of a document, if one exists
pub(crate) fn open_version(conn: &Connection, document_id: &RecordId) -> Result<Option<Version>> {
    let sql = format!(
        "SELECT {} FROM versions WHERE document_id = ?1 \
         AND status IN ('draft', 'pending_review') ORDER BY number DESC LIMIT 1",
        VERSION_COLUMNS
    );
    Ok(conn
        .query_row(&sql, [document_id.to_string()], version_from_row)
        .optional()?)
}

/// Highest version number used so far (0 when the document has none)
pub(crate) fn max_version_number(conn: &Connection, document_id: &RecordId) -> Result<u32> {
    let number: u32 = conn.query_row(
        "SELECT COALESCE(MAX(number), 0) FROM versions WHERE document_id = ?1",
        [document_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(number)
}

/// Whether any version of this document has ever been approved
///
/// Obsolete counts: a version only becomes obsolete by being superseded
/// after approval.
pub(crate) fn has_approved_history(conn: &Connection, document_id: &RecordId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM versions WHERE document_id = ?1 \
         AND status IN ('approved', 'obsolete')",
        [document_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Filtered, paginated document listing
///
/// Ordered by `updated_at DESC, id ASC` so pages stay stable over a static
/// data set. `today` anchors the due-bucket predicates; reads never touch
/// the stored review dates.
pub(crate) fn list_documents(
    conn: &Connection,
    filter: &DocumentFilter,
    today: NaiveDate,
) -> Result<Vec<Document>> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if !filter.include_archived {
        conditions.push("archived = 0".to_string());
    }

    if let Some(category) = filter.category {
        conditions.push(format!("category = ?{}", params.len() + 1));
        params.push(Box::new(category.as_str().to_string()));
    }

    if let Some(status) = filter.status {
        conditions.push(format!("status = ?{}", params.len() + 1));
        params.push(Box::new(status.to_string()));
    }

    if let Some(ref owner) = filter.owner {
        conditions.push(format!("owner = ?{} COLLATE NOCASE", params.len() + 1));
        params.push(Box::new(owner.clone()));
    }

    if let Some(ref process) = filter.process {
        conditions.push(format!("process = ?{} COLLATE NOCASE", params.len() + 1));
        params.push(Box::new(process.clone()));
    }

    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        conditions.push(format!(
            "(title LIKE ?{} OR reference LIKE ?{})",
            params.len() + 1,
            params.len() + 2
        ));
        params.push(Box::new(pattern.clone()));
        params.push(Box::new(pattern));
    }

    match filter.due {
        Some(DueBucket::Overdue) => {
            conditions.push(format!(
                "next_review IS NOT NULL AND next_review < ?{} \
                 AND status NOT IN ('obsolete', 'archived')",
                params.len() + 1
            ));
            params.push(Box::new(today.format("%Y-%m-%d").to_string()));
        }
        Some(DueBucket::DueSoon) => {
            let horizon = today
                .checked_add_days(Days::new(filter.due_horizon_days as u64))
                .unwrap_or(NaiveDate::MAX);
            conditions.push(format!(
                "next_review IS NOT NULL AND next_review >= ?{} AND next_review <= ?{} \
                 AND status NOT IN ('obsolete', 'archived')",
                params.len() + 1,
                params.len() + 2
            ));
            params.push(Box::new(today.format("%Y-%m-%d").to_string()));
            params.push(Box::new(horizon.format("%Y-%m-%d").to_string()));
        }
        None => {}
    }

    let mut sql = format!("SELECT {} FROM documents", DOCUMENT_COLUMNS);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY updated_at DESC, id ASC");

    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
        if let Some(offset) = filter.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
    } else if let Some(offset) = filter.offset {
        sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset));
    }

    let mut stmt = conn.prepare(&sql)?;
    let documents = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), document_from_row)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(documents)
}

/// Audit trail for one document, oldest first
pub(crate) fn list_events(conn: &Connection, document_id: &RecordId) -> Result<Vec<AuditEvent>> {
    let mut stmt = conn.prepare(
        "SELECT document_id, version_id, event, actor, at, note \
         FROM events WHERE document_id = ?1 ORDER BY id ASC",
    )?;
    let events = stmt
        .query_map([document_id.to_string()], event_from_row)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(events)
}

/// Every version in the registry joined with its document reference, for
/// blob integrity audits
pub(crate) fn list_all_versions(conn: &Connection) -> Result<Vec<(String, Version)>> {
    let sql = format!(
        "SELECT d.reference, {} FROM versions v \
         JOIN documents d ON d.id = v.document_id ORDER BY d.reference, v.number",
        VERSION_COLUMNS
            .split(", ")
            .map(|c| format!("v.{}", c))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            let reference: String = row.get(0)?;
            let version = Version {
                id: parse_id(1, row.get(1)?)?,
                document_id: parse_id(2, row.get(2)?)?,
                number: row.get(3)?,
                status: row
                    .get::<_, String>(4)?
                    .parse::<Status>()
                    .map_err(|e| conversion_failure(4, e))?,
                content: ContentRef {
                    file_name: row.get(5)?,
                    file_size: row.get(6)?,
                    media_type: row.get(7)?,
                    url: row.get(8)?,
                },
                created_by: row.get(9)?,
                created_at: parse_timestamp(10, row.get(10)?)?,
                approved_by: row.get(11)?,
                approved_at: row
                    .get::<_, Option<String>>(12)?
                    .map(|s| parse_timestamp(12, s))
                    .transpose()?,
                change_description: row.get(13)?,
            };
            Ok((reference, version))
        })?
        .collect::<rusqlite::Result<_>>()?;
    Ok(rows)
}
