//! Tests for checklist status derivation.

use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

use super::*;

fn with_months(months: &[&str]) -> Checklist {
    let mut checklist = Checklist::new();
    for m in months {
        checklist.mark_received(m);
    }
    checklist
}

#[rstest]
#[case(&[], ReportStatus::PendingReview)]
#[case(&["august"], ReportStatus::InReview)]
#[case(&["august", "september", "october", "november", "december", "january", "february", "march", "april"], ReportStatus::InReview)]
#[case(&ACADEMIC_MONTHS, ReportStatus::Completed)]
fn test_status_from_received_months(#[case] months: &[&str], #[case] expected: ReportStatus) {
    assert_eq!(with_months(months).status(), expected);
}

#[test]
fn test_summer_months_are_ignored() {
    let mut checklist = Checklist::new();
    assert!(!checklist.mark_received("June"));
    assert!(!checklist.mark_received("july"));
    assert_eq!(checklist.received_count(), 0);
    assert_eq!(checklist.status(), ReportStatus::PendingReview);
}

#[test]
fn test_month_names_are_case_insensitive() {
    let mut checklist = Checklist::new();
    assert!(checklist.mark_received(" September "));
    assert!(checklist.is_received("SEPTEMBER"));
}

#[test]
fn test_from_json_tolerates_bad_shapes() {
    assert_eq!(Checklist::from_json(&json!(null)), Checklist::new());
    assert_eq!(Checklist::from_json(&json!([1, 2])), Checklist::new());

    let checklist = Checklist::from_json(&json!({"august": true, "may": "yes", "june": true}));
    assert!(checklist.is_received("august"));
    assert!(!checklist.is_received("may"));
    assert_eq!(checklist.received_count(), 1);
    assert_eq!(
        checklist.to_json(),
        json!({"august": true, "may": false, "june": true})
    );
}

#[test]
fn test_update_order_overwrite_then_month() {
    let current = with_months(&["august", "september"]);
    let update = ChecklistUpdate {
        checklist: Some(with_months(&["october"])),
        receive_month: Some("November".to_string()),
        complete_all: false,
    };
    let updated = update.apply(current);
    assert!(!updated.is_received("august"));
    assert!(updated.is_received("october"));
    assert!(updated.is_received("november"));
    assert_eq!(updated.status(), ReportStatus::InReview);
}

#[test]
fn test_update_complete_all() {
    let update = ChecklistUpdate {
        complete_all: true,
        ..ChecklistUpdate::default()
    };
    assert_eq!(update.apply(Checklist::new()).status(), ReportStatus::Completed);
}

#[test]
fn test_update_deserializes_camel_case() {
    let update: ChecklistUpdate =
        serde_json::from_value(json!({"receiveMonth": "march", "completeAll": false})).unwrap();
    assert_eq!(update.receive_month.as_deref(), Some("march"));
    assert!(!update.is_empty());
    assert!(ChecklistUpdate::default().is_empty());
}

#[test]
fn test_receive_month_outside_academic_year_is_stored() {
    let update: ChecklistUpdate =
        serde_json::from_value(json!({"receiveMonth": " June "})).unwrap();
    let updated = update.apply(Checklist::new());
    assert_eq!(updated.to_json(), json!({"june": true}));
    assert_eq!(updated.received_count(), 0);
    assert_eq!(updated.status(), ReportStatus::PendingReview);
}

#[rstest]
#[case(json!({"checklist": ["august"]}))]
#[case(json!({"checklist": "august"}))]
#[case(json!({"checklist": 1}))]
fn test_overwrite_with_non_object_clears(#[case] body: serde_json::Value) {
    let update: ChecklistUpdate = serde_json::from_value(body).unwrap();
    assert_eq!(update.checklist, Some(Checklist::new()));
    assert_eq!(
        update.apply(with_months(&["august"])).status(),
        ReportStatus::PendingReview
    );
}

#[test]
fn test_overwrite_with_non_boolean_values() {
    let update: ChecklistUpdate =
        serde_json::from_value(json!({"checklist": {"august": "yes", "may": true}})).unwrap();
    let updated = update.apply(Checklist::new());
    assert!(!updated.is_received("august"));
    assert!(updated.is_received("may"));
}

#[test]
fn test_null_overwrite_is_absent() {
    let update: ChecklistUpdate =
        serde_json::from_value(json!({"checklist": null, "completeAll": true})).unwrap();
    assert!(update.checklist.is_none());
    assert_eq!(
        update.apply(with_months(&["august"])).status(),
        ReportStatus::Completed
    );
}

#[test]
fn test_status_serialization() {
    assert_eq!(
        serde_json::to_value(ReportStatus::PendingReview).unwrap(),
        json!("Pending Review")
    );
    assert_eq!(
        "In Review".parse::<ReportStatus>().unwrap(),
        ReportStatus::InReview
    );
    assert!("Done".parse::<ReportStatus>().is_err());
}

proptest! {
    /// The status depends only on how many academic months are ticked.
    #[test]
    fn prop_status_matches_count(mask in 0u16..1024) {
        let months: Vec<&str> = ACADEMIC_MONTHS
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, m)| *m)
            .collect();
        let checklist = with_months(&months);

        prop_assert_eq!(checklist.received_count(), months.len());
        let expected = match months.len() {
            0 => ReportStatus::PendingReview,
            10 => ReportStatus::Completed,
            _ => ReportStatus::InReview,
        };
        prop_assert_eq!(checklist.status(), expected);
    }

    /// Ticking a month never lowers the count.
    #[test]
    fn prop_mark_received_is_monotonic(mask in 0u16..1024, idx in 0usize..10) {
        let months: Vec<&str> = ACADEMIC_MONTHS
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, m)| *m)
            .collect();
        let mut checklist = with_months(&months);
        let before = checklist.received_count();
        checklist.mark_received(ACADEMIC_MONTHS[idx]);
        prop_assert!(checklist.received_count() >= before);
        prop_assert!(checklist.is_received(ACADEMIC_MONTHS[idx]));
    }
}
