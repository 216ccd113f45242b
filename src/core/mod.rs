//! Core module - records, lifecycle rules, and the registry

pub mod actor;
pub mod blob;
pub mod config;
pub mod document;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod notify;
pub mod project;
pub mod review;
pub mod store;
pub mod version;

pub use actor::{Actor, Roster, RosterMember};
pub use blob::{BlobStore, FsBlobStore, StoredBlob};
pub use config::Config;
pub use document::{Category, Document};
pub use error::{RegistryError, Result};
pub use identity::{IdParseError, RecordId, RecordPrefix};
pub use notify::{Event, FileNotifier, Notification, Notifier, NullNotifier};
pub use project::{Vault, VaultError};
pub use store::{
    AuditEvent, DocumentFilter, DocumentUpdate, DueBucket, NewDocument, Registry,
};
pub use version::{ContentRef, Status, Version};
