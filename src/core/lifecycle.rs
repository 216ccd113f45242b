//! Lifecycle state machine for document versions
//!
//! Pure transition rules and guards; persistence lives in the registry store.
//! The workflow is DRAFT -> PENDING_REVIEW -> APPROVED -> OBSOLETE, with
//! ARCHIVED as an independent terminal reachable from any active state.

use crate::core::actor::Actor;
use crate::core::error::RegistryError;
use crate::core::version::{Status, Version};

/// Check if a status transition is legal, ignoring who requests it
pub fn is_valid_transition(from: Status, to: Status) -> bool {
    matches!(
        (from, to),
        // Normal forward transitions
        (Status::Draft, Status::PendingReview)
            | (Status::PendingReview, Status::Approved)
            // Rejection (back to draft for correction and resubmission)
            | (Status::PendingReview, Status::Draft)
            // Supersession when a newer version is approved
            | (Status::Approved, Status::Obsolete)
    ) || (to == Status::Archived && from.is_active())
}

/// Get allowed transitions from the current status
pub fn allowed_transitions(current: Status) -> Vec<Status> {
    match current {
        Status::Draft => vec![Status::PendingReview, Status::Archived],
        Status::PendingReview => vec![Status::Approved, Status::Draft, Status::Archived],
        Status::Approved => vec![Status::Obsolete, Status::Archived],
        Status::Obsolete => vec![],
        Status::Archived => vec![],
    }
}

/// Validate a transition request against the state machine and the actor's
/// capability. Approval authority covers both approve and reject: both are
/// review verdicts on a pending version.
pub fn check_transition(
    version: &Version,
    to: Status,
    actor: &Actor,
) -> Result<(), RegistryError> {
    if !is_valid_transition(version.status, to) {
        return Err(RegistryError::InvalidTransition {
            id: version.id.to_string(),
            from: version.status,
            to,
        });
    }

    match to {
        Status::PendingReview if version.status == Status::Draft => {
            // Submit guard: content reference must be present
            if version.content.url.is_empty() {
                return Err(RegistryError::Validation(format!(
                    "version {} has no content reference and cannot be submitted",
                    version.id
                )));
            }
        }
        Status::Approved | Status::Draft => {
            if !actor.can_approve {
                return Err(RegistryError::Unauthorized {
                    actor: actor.display_name.clone(),
                });
            }
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{RecordId, RecordPrefix};
    use crate::core::version::ContentRef;
    use chrono::Utc;

    fn version_with_status(status: Status) -> Version {
        Version {
            id: RecordId::new(RecordPrefix::Ver),
            document_id: RecordId::new(RecordPrefix::Doc),
            number: 1,
            status,
            content: ContentRef {
                file_name: "proc.pdf".to_string(),
                file_size: 100,
                media_type: "application/pdf".to_string(),
                url: "blob://aa/bb".to_string(),
            },
            created_by: "jsmith".to_string(),
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            change_description: String::new(),
        }
    }

    fn approver() -> Actor {
        Actor {
            id: "qlead".to_string(),
            display_name: "Quality Lead".to_string(),
            can_approve: true,
        }
    }

    fn reader() -> Actor {
        Actor {
            id: "reader".to_string(),
            display_name: "Plain Reader".to_string(),
            can_approve: false,
        }
    }

    #[test]
    fn test_valid_transitions() {
        assert!(is_valid_transition(Status::Draft, Status::PendingReview));
        assert!(is_valid_transition(Status::PendingReview, Status::Approved));
        assert!(is_valid_transition(Status::PendingReview, Status::Draft));
        assert!(is_valid_transition(Status::Approved, Status::Obsolete));

        // Archival from any active state
        assert!(is_valid_transition(Status::Draft, Status::Archived));
        assert!(is_valid_transition(Status::PendingReview, Status::Archived));
        assert!(is_valid_transition(Status::Approved, Status::Archived));

        // Invalid transitions
        assert!(!is_valid_transition(Status::Draft, Status::Approved));
        assert!(!is_valid_transition(Status::Draft, Status::Obsolete));
        assert!(!is_valid_transition(Status::Approved, Status::Draft));
        assert!(!is_valid_transition(Status::Obsolete, Status::Approved));
        assert!(!is_valid_transition(Status::Archived, Status::Draft));
        assert!(!is_valid_transition(Status::Obsolete, Status::Archived));
    }

    #[test]
    fn test_allowed_transitions() {
        assert_eq!(
            allowed_transitions(Status::Draft),
            vec![Status::PendingReview, Status::Archived]
        );
        assert_eq!(
            allowed_transitions(Status::PendingReview),
            vec![Status::Approved, Status::Draft, Status::Archived]
        );
        assert_eq!(
            allowed_transitions(Status::Approved),
            vec![Status::Obsolete, Status::Archived]
        );
        assert!(allowed_transitions(Status::Obsolete).is_empty());
        assert!(allowed_transitions(Status::Archived).is_empty());
    }

    #[test]
    fn test_approve_requires_authority() {
        let version = version_with_status(Status::PendingReview);
        let err = check_transition(&version, Status::Approved, &reader()).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        assert!(check_transition(&version, Status::Approved, &approver()).is_ok());
    }

    #[test]
    fn test_reject_requires_authority() {
        let version = version_with_status(Status::PendingReview);
        let err = check_transition(&version, Status::Draft, &reader()).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        assert!(check_transition(&version, Status::Draft, &approver()).is_ok());
    }

    #[test]
    fn test_approve_from_draft_is_invalid() {
        let version = version_with_status(Status::Draft);
        let err = check_transition(&version, Status::Approved, &approver()).unwrap_err();
        match err {
            RegistryError::InvalidTransition { from, to, .. } => {
                assert_eq!(from, Status::Draft);
                assert_eq!(to, Status::Approved);
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_requires_content() {
        let mut version = version_with_status(Status::Draft);
        version.content.url = String::new();
        let err = check_transition(&version, Status::PendingReview, &reader()).unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[test]
    fn test_submit_needs_no_approval_authority() {
        let version = version_with_status(Status::Draft);
        assert!(check_transition(&version, Status::PendingReview, &reader()).is_ok());
    }
}
