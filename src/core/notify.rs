//! Notification collaborator - fire-and-forget, best-effort
//!
//! Notifications go out on submit, approve, reject, and overdue detection.
//! A notifier failure is logged to stderr and suppressed; it never blocks or
//! fails a document transition.

use chrono::Utc;
use std::io::Write;
use std::path::PathBuf;

use crate::core::error::Result;

/// Workflow events worth telling people about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Submitted,
    Approved,
    Rejected,
    OverdueDetected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Submitted => "submitted",
            Event::Approved => "approved",
            Event::Rejected => "rejected",
            Event::OverdueDetected => "overdue_detected",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification payload
#[derive(Debug, Clone)]
pub struct Notification {
    pub event: Event,
    pub document_id: String,
    pub reference: String,
    pub actor: String,
    pub detail: String,
}

pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Deliver a notification, swallowing any collaborator failure
pub fn notify_best_effort(notifier: &dyn Notifier, notification: &Notification) {
    if let Err(e) = notifier.notify(notification) {
        eprintln!(
            "warning: notification delivery failed for {} ({}): {}",
            notification.reference, notification.event, e
        );
    }
}

/// Appends one line per notification to `.fdc/notifications.log`
pub struct FileNotifier {
    path: PathBuf,
}

impl FileNotifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Notifier for FileNotifier {
    fn notify(&self, n: &Notification) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{}\t{}",
            Utc::now().to_rfc3339(),
            n.event,
            n.document_id,
            n.reference,
            n.actor,
            n.detail
        )?;
        Ok(())
    }
}

/// Discards everything; used in tests
#[derive(Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RegistryError;
    use tempfile::tempdir;

    fn sample(event: Event) -> Notification {
        Notification {
            event,
            document_id: "DOC-01TEST".to_string(),
            reference: "QP-7.5-01".to_string(),
            actor: "jsmith".to_string(),
            detail: "v2".to_string(),
        }
    }

    #[test]
    fn test_file_notifier_appends_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notifications.log");
        let notifier = FileNotifier::new(&path);

        notifier.notify(&sample(Event::Submitted)).unwrap();
        notifier.notify(&sample(Event::Approved)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("submitted"));
        assert!(contents.contains("approved"));
        assert!(contents.contains("QP-7.5-01"));
    }

    #[test]
    fn test_best_effort_swallows_failures() {
        struct FailingNotifier;
        impl Notifier for FailingNotifier {
            fn notify(&self, _n: &Notification) -> Result<()> {
                Err(RegistryError::Dependency("mail relay down".to_string()))
            }
        }

        // Must not panic or propagate
        notify_best_effort(&FailingNotifier, &sample(Event::Rejected));
    }
}
