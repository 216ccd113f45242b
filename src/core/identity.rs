//! Record identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordPrefix {
    /// Controlled document
    Doc,
    /// Document version (immutable snapshot)
    Ver,
}

impl RecordPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordPrefix::Doc => "DOC",
            RecordPrefix::Ver => "VER",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [RecordPrefix] {
        &[RecordPrefix::Doc, RecordPrefix::Ver]
    }
}

impl fmt::Display for RecordPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DOC" => Ok(RecordPrefix::Doc),
            "VER" => Ok(RecordPrefix::Ver),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique record identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    prefix: RecordPrefix,
    ulid: Ulid,
}

impl RecordId {
    /// Create a new RecordId with the given prefix
    pub fn new(prefix: RecordPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Create a RecordId from a prefix and existing ULID
    pub fn from_parts(prefix: RecordPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    /// Get the record prefix
    pub fn prefix(&self) -> RecordPrefix {
        self.prefix
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse a RecordId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: DOC, VER)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_generation() {
        let id = RecordId::new(RecordPrefix::Doc);
        assert!(id.to_string().starts_with("DOC-"));
        assert_eq!(id.to_string().len(), 30); // DOC- (4) + ULID (26) = 30
    }

    #[test]
    fn test_record_id_parsing() {
        let original = RecordId::new(RecordPrefix::Doc);
        let id_str = original.to_string();
        let parsed = RecordId::parse(&id_str).unwrap();
        assert_eq!(parsed.prefix(), RecordPrefix::Doc);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_record_id_roundtrip() {
        let original = RecordId::new(RecordPrefix::Ver);
        let serialized = original.to_string();
        let parsed = RecordId::parse(&serialized).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_record_id_invalid_prefix() {
        let err = RecordId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_record_id_missing_delimiter() {
        let err = RecordId::parse("DOC01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_record_id_invalid_ulid() {
        let err = RecordId::parse("DOC-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_record_ids_sort_by_prefix() {
        let ver = RecordId::new(RecordPrefix::Ver);
        let doc = RecordId::new(RecordPrefix::Doc);

        let mut ids = vec![ver.clone(), doc.clone()];
        ids.sort();
        assert_eq!(ids[0], doc);
        assert_eq!(ids[1], ver);
        assert!(RecordPrefix::Doc < RecordPrefix::Ver);
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in RecordPrefix::all() {
            let id = RecordId::new(*prefix);
            let parsed = RecordId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }
}
