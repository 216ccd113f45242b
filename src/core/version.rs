//! Version records - immutable snapshots of a controlled document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::RecordId;

/// Lifecycle status shared by versions and their parent document
///
/// The document status is always a mirror of its current version's status;
/// it is never set independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Draft,
    PendingReview,
    Approved,
    Obsolete,
    Archived,
}

impl Status {
    /// Whether this status still participates in the active workflow
    pub fn is_active(&self) -> bool {
        !matches!(self, Status::Obsolete | Status::Archived)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Draft => write!(f, "draft"),
            Status::PendingReview => write!(f, "pending_review"),
            Status::Approved => write!(f, "approved"),
            Status::Obsolete => write!(f, "obsolete"),
            Status::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Status::Draft),
            "pending_review" | "pending" => Ok(Status::PendingReview),
            "approved" => Ok(Status::Approved),
            "obsolete" => Ok(Status::Obsolete),
            "archived" => Ok(Status::Archived),
            _ => Err(format!("Unknown status: {}", s)),
        }
    }
}

/// Opaque reference to stored binary content
///
/// The core never inspects the bytes behind `url`; upload and download are
/// delegated to the blob store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub file_name: String,
    pub file_size: u64,
    pub media_type: String,
    pub url: String,
}

/// An immutable version snapshot belonging to exactly one document
///
/// Content fields never change after insertion; only status and the
/// approval/rejection metadata are updated by lifecycle transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    /// Unique identifier
    pub id: RecordId,

    /// Parent document
    pub document_id: RecordId,

    /// Per-document version number (1, 2, 3, ... - monotonic, no gaps)
    pub number: u32,

    /// Current lifecycle status
    #[serde(default)]
    pub status: Status,

    /// Content reference
    #[serde(flatten)]
    pub content: ContentRef,

    /// Who created this version
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Who approved or rejected this version (recorded on both outcomes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    /// Approval or rejection timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,

    /// What changed relative to the previous version (mandatory after v1)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub change_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordPrefix;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            Status::Draft,
            Status::PendingReview,
            Status::Approved,
            Status::Obsolete,
            Status::Archived,
        ] {
            let parsed: Status = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!("released".parse::<Status>().is_err());
        assert!("".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_active() {
        assert!(Status::Draft.is_active());
        assert!(Status::PendingReview.is_active());
        assert!(Status::Approved.is_active());
        assert!(!Status::Obsolete.is_active());
        assert!(!Status::Archived.is_active());
    }

    #[test]
    fn test_version_serde_roundtrip() {
        let version = Version {
            id: RecordId::new(RecordPrefix::Ver),
            document_id: RecordId::new(RecordPrefix::Doc),
            number: 2,
            status: Status::PendingReview,
            content: ContentRef {
                file_name: "welding-procedure.pdf".to_string(),
                file_size: 48_213,
                media_type: "application/pdf".to_string(),
                url: "blob://ab/cdef0123".to_string(),
            },
            created_by: "jsmith".to_string(),
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            change_description: "Updated torch settings".to_string(),
        };

        let json = serde_json::to_string(&version).unwrap();
        let parsed: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, version.id);
        assert_eq!(parsed.number, 2);
        assert_eq!(parsed.status, Status::PendingReview);
        assert_eq!(parsed.content, version.content);
    }
}
