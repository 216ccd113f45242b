//! Controlled document records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::RecordId;
use crate::core::version::Status;

/// Document category per the quality manual's classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Procedure,
    Manual,
    Standard,
    Record,
    Instruction,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Procedure => "procedure",
            Category::Manual => "manual",
            Category::Standard => "standard",
            Category::Record => "record",
            Category::Instruction => "instruction",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Procedure,
            Category::Manual,
            Category::Standard,
            Category::Record,
            Category::Instruction,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "procedure" => Ok(Category::Procedure),
            "manual" => Ok(Category::Manual),
            "standard" => Ok(Category::Standard),
            "record" => Ok(Category::Record),
            "instruction" => Ok(Category::Instruction),
            _ => Err(format!(
                "Unknown category: {} (valid: procedure, manual, standard, record, instruction)",
                s
            )),
        }
    }
}

/// A logical controlled record with immutable version history
///
/// Documents are never physically deleted; retirement happens through
/// archival, which keeps the record and its versions readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: RecordId,

    /// Human reference code, unique within the registry (e.g. "QP-7.5-01")
    pub reference: String,

    /// Short title
    pub title: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Classification
    pub category: Category,

    /// Owning organizational unit or process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,

    /// Tags for filtering (order-irrelevant)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Document owner (exactly one)
    pub owner: String,

    /// Original author when distinct from the owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Mandated re-approval interval in months (positive)
    pub review_frequency_months: u32,

    /// Next mandatory review date; set when a version is approved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<NaiveDate>,

    /// Mirror of the current version's status
    #[serde(default)]
    pub status: Status,

    /// Explicit pointer to the current (latest) version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version_id: Option<RecordId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Updated on every successful version write or transition
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; archived documents are excluded from default queries
    #[serde(default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in Category::all() {
            let parsed: Category = category.to_string().parse().unwrap();
            assert_eq!(parsed, *category);
        }
    }

    #[test]
    fn test_category_rejects_unknown() {
        assert!("blueprint".parse::<Category>().is_err());
        // Unknown enum values must fail at the boundary, not propagate
        assert!(serde_json::from_str::<Category>("\"blueprint\"").is_err());
    }

    #[test]
    fn test_category_case_insensitive_parse() {
        assert_eq!("PROCEDURE".parse::<Category>().unwrap(), Category::Procedure);
        assert_eq!("Manual".parse::<Category>().unwrap(), Category::Manual);
    }
}
