//! Review scheduling - due dates derived from the document's frequency policy
//!
//! The next review date is computed exactly once, inside the approval
//! transaction. Reads only compare against the stored date; they never
//! recompute or mutate it, so replicas cannot drift apart on wall clocks.

use chrono::{Months, NaiveDate};

use crate::core::document::Document;

/// Default horizon for the "due soon" bucket
pub const DEFAULT_DUE_SOON_DAYS: u32 = 30;

/// Compute the next mandatory review date: `approved_on` plus the review
/// frequency in calendar months, with the day-of-month clamped to the target
/// month's last day (Jan 31 + 1 month = Feb 28/29).
pub fn next_review_date(approved_on: NaiveDate, frequency_months: u32) -> NaiveDate {
    approved_on
        .checked_add_months(Months::new(frequency_months))
        // Only reachable beyond year 262143; review policies are in months
        .unwrap_or(NaiveDate::MAX)
}

/// True iff the document's review date has passed and it is still in active
/// circulation (obsolete and archived documents are never overdue).
pub fn is_overdue(document: &Document, today: NaiveDate) -> bool {
    if document.archived || !document.status.is_active() {
        return false;
    }
    match document.next_review {
        Some(due) => today > due,
        None => false,
    }
}

/// True iff the review date falls within `[today, today + horizon_days]`.
pub fn is_due_soon(document: &Document, today: NaiveDate, horizon_days: u32) -> bool {
    if document.archived || !document.status.is_active() {
        return false;
    }
    match document.next_review {
        Some(due) => due >= today && due <= today + chrono::Days::new(u64::from(horizon_days)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Category;
    use crate::core::identity::{RecordId, RecordPrefix};
    use crate::core::version::Status;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doc_with_review(status: Status, next_review: Option<NaiveDate>) -> Document {
        Document {
            id: RecordId::new(RecordPrefix::Doc),
            reference: "QP-7.5-01".to_string(),
            title: "Document Control Procedure".to_string(),
            description: None,
            category: Category::Procedure,
            process: None,
            tags: vec![],
            owner: "jsmith".to_string(),
            author: None,
            review_frequency_months: 12,
            next_review,
            status,
            current_version_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            archived: false,
            archived_at: None,
            archived_by: None,
        }
    }

    #[test]
    fn test_next_review_simple() {
        assert_eq!(
            next_review_date(date(2023, 3, 1), 12),
            date(2024, 3, 1)
        );
        assert_eq!(next_review_date(date(2024, 5, 15), 6), date(2024, 11, 15));
    }

    #[test]
    fn test_next_review_clamps_to_month_end() {
        // Leap year: Jan 31 + 1 month = Feb 29
        assert_eq!(next_review_date(date(2024, 1, 31), 1), date(2024, 2, 29));
        // Non-leap year: Jan 31 + 1 month = Feb 28
        assert_eq!(next_review_date(date(2025, 1, 31), 1), date(2025, 2, 28));
        // Clamp survives into a longer month unchanged
        assert_eq!(next_review_date(date(2024, 8, 31), 1), date(2024, 9, 30));
    }

    #[test]
    fn test_overdue_after_due_date() {
        // v1 approved 2023-03-01 with 12 month frequency -> due 2024-03-01
        let doc = doc_with_review(Status::Approved, Some(date(2024, 3, 1)));
        assert!(!is_overdue(&doc, date(2024, 3, 1)));
        assert!(is_overdue(&doc, date(2024, 3, 2)));
    }

    #[test]
    fn test_overdue_ignores_retired_documents() {
        let obsolete = doc_with_review(Status::Obsolete, Some(date(2020, 1, 1)));
        assert!(!is_overdue(&obsolete, date(2024, 1, 1)));

        let mut archived = doc_with_review(Status::Approved, Some(date(2020, 1, 1)));
        archived.archived = true;
        assert!(!is_overdue(&archived, date(2024, 1, 1)));
    }

    #[test]
    fn test_overdue_without_review_date() {
        let doc = doc_with_review(Status::Draft, None);
        assert!(!is_overdue(&doc, date(2024, 1, 1)));
    }

    #[test]
    fn test_due_soon_window() {
        let doc = doc_with_review(Status::Approved, Some(date(2024, 3, 15)));
        assert!(is_due_soon(&doc, date(2024, 3, 1), 30));
        assert!(is_due_soon(&doc, date(2024, 3, 15), 30));
        // Past-due dates fall in the overdue bucket, not due-soon
        assert!(!is_due_soon(&doc, date(2024, 3, 16), 30));
        // Beyond the horizon
        assert!(!is_due_soon(&doc, date(2024, 1, 1), 30));
    }
}
