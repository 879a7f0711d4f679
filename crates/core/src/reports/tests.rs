//! Tests for report figures and submission.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

#[derive(Default)]
struct FakeStore {
    pending: Mutex<Vec<PendingSnapshot>>,
    archived: Mutex<Vec<ArchiveRequest>>,
    notifications: Mutex<Vec<String>>,
    fail_notify: bool,
}

impl SubmissionStore for FakeStore {
    async fn latest_pending(
        &self,
        organization_id: i64,
        wallet_id: i64,
    ) -> Result<Option<PendingSnapshot>, SubmissionError> {
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.organization_id == organization_id && s.wallet_id == wallet_id)
            .max_by_key(|s| s.report_id)
            .cloned())
    }

    async fn archive_and_reset(&self, request: &ArchiveRequest) -> Result<i64, SubmissionError> {
        self.pending
            .lock()
            .unwrap()
            .retain(|s| s.report_id != request.snapshot.report_id);
        let mut archived = self.archived.lock().unwrap();
        archived.push(request.clone());
        Ok(i64::try_from(archived.len()).unwrap())
    }

    async fn notify_osas(
        &self,
        _snapshot: &PendingSnapshot,
        message: &str,
    ) -> Result<(), SubmissionError> {
        if self.fail_notify {
            return Err(SubmissionError::Store("notifications unavailable".into()));
        }
        self.notifications.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

fn snapshot(report_id: i64, wallet_id: i64) -> PendingSnapshot {
    PendingSnapshot {
        report_id,
        organization_id: 7,
        organization_name: "Math Society".to_string(),
        wallet_id,
        budget_id: Some(3),
        report_no: Some("2025-1".to_string()),
        event_name: Some("Math Week".to_string()),
        date_prepared: NaiveDate::from_ymd_opt(2025, 9, 30),
        figures: ReportFigures {
            budget: dec!(10000),
            total_expense: dec!(7250.50),
            reimbursement: dec!(500),
            previous_fund: dec!(1200),
            ..ReportFigures::default()
        },
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
}

#[tokio::test]
async fn test_submit_archives_latest_pending_snapshot() {
    let store = Arc::new(FakeStore::default());
    store
        .pending
        .lock()
        .unwrap()
        .extend([snapshot(1, 10), snapshot(2, 10), snapshot(3, 11)]);
    let service = ReportSubmissionService::new(store.clone());

    let outcome = service.submit(7, 10, today()).await.unwrap();

    assert_eq!(outcome.report_id, 2);
    assert_eq!(outcome.archive_id, 1);
    assert!(outcome.notified);

    let archived = store.archived.lock().unwrap();
    assert_eq!(archived[0].remaining, dec!(3449.50));
    assert_eq!(archived[0].submitted_on, today());
    assert_eq!(
        store.notifications.lock().unwrap().as_slice(),
        ["has a report \"Pending Review\""]
    );
    assert!(!store.notifications.lock().unwrap()[0].contains("Math Society"));
}

#[tokio::test]
async fn test_submit_without_pending_report() {
    let store = Arc::new(FakeStore::default());
    store.pending.lock().unwrap().push(snapshot(1, 10));
    let service = ReportSubmissionService::new(store.clone());

    let err = service.submit(7, 99, today()).await.unwrap_err();
    assert!(matches!(err, SubmissionError::NoPendingReport));

    let err = service.submit(8, 10, today()).await.unwrap_err();
    assert!(matches!(err, SubmissionError::NoPendingReport));
    assert!(store.archived.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_submission() {
    let store = Arc::new(FakeStore {
        fail_notify: true,
        ..FakeStore::default()
    });
    store.pending.lock().unwrap().push(snapshot(4, 10));
    let service = ReportSubmissionService::new(store.clone());

    let outcome = service.submit(7, 10, today()).await.unwrap();
    assert!(!outcome.notified);
    assert_eq!(store.archived.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_submit_finds_nothing() {
    let store = Arc::new(FakeStore::default());
    store.pending.lock().unwrap().push(snapshot(1, 10));
    let service = ReportSubmissionService::new(store);

    service.submit(7, 10, today()).await.unwrap();
    assert!(matches!(
        service.submit(7, 10, today()).await,
        Err(SubmissionError::NoPendingReport)
    ));
}

#[test]
fn test_figures_from_optional_default_to_zero() {
    let figures = ReportFigures::from_optional(Some(dec!(500)), None, None, None, None, None);
    assert_eq!(figures.remaining(), dec!(500));
    assert_eq!(figures.total_income, Decimal::ZERO);
}

#[test]
fn test_line_item_amounts() {
    let expense = LineItem {
        kind: LineItemKind::Expense,
        date_issued: None,
        quantity: 3,
        particulars: Some("Bond paper".to_string()),
        income_type: None,
        description: None,
        price: dec!(245.75),
    };
    assert_eq!(expense.line_total(), dec!(737.25));
    assert_eq!(expense.signed_amount(), dec!(-737.25));
    assert_eq!(expense.label(), "Bond paper");

    let income = LineItem {
        kind: LineItemKind::Income,
        income_type: Some("Membership fee".to_string()),
        ..expense
    };
    assert_eq!(income.signed_amount(), dec!(737.25));
    assert_eq!(income.label(), "Membership fee");
}

#[test]
fn test_kind_parsing() {
    assert_eq!("Income".parse::<LineItemKind>().unwrap(), LineItemKind::Income);
    assert_eq!("expense".parse::<LineItemKind>().unwrap(), LineItemKind::Expense);
    assert!("transfer".parse::<LineItemKind>().is_err());
}

#[test]
fn test_receipt_caption() {
    let receipt = ReceiptItem {
        description: Some("Snacks".to_string()),
        receipt_date: NaiveDate::from_ymd_opt(2025, 9, 2),
        file_key: "math-society/general/september/a.png".to_string(),
    };
    assert_eq!(receipt.caption(), "2025-09-02 - Snacks");
}

proptest! {
    /// remaining = budget - total_expense - reimbursement + previous_fund
    #[test]
    fn prop_remaining_formula(
        budget in 0i64..100_000_000,
        expense in 0i64..100_000_000,
        reimbursement in 0i64..10_000_000,
        previous in 0i64..10_000_000,
        income in 0i64..10_000_000,
    ) {
        let figures = ReportFigures {
            budget: Decimal::new(budget, 2),
            total_expense: Decimal::new(expense, 2),
            reimbursement: Decimal::new(reimbursement, 2),
            previous_fund: Decimal::new(previous, 2),
            total_income: Decimal::new(income, 2),
            budget_in_the_bank: Decimal::ZERO,
        };
        prop_assert_eq!(
            figures.remaining(),
            Decimal::new(budget - expense - reimbursement + previous, 2)
        );
    }

    #[test]
    fn prop_next_number_increments(n in 0i64..1_000_000, year in 2000i32..2100) {
        let last = format!("{year}-{n}");
        prop_assert_eq!(next_report_number(Some(&last)), n + 1);
    }
}
