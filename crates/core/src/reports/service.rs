//! Report submission service.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;

use super::error::SubmissionError;
use super::types::{ArchiveRequest, PendingSnapshot, SubmissionOutcome};

/// Persistence needed to submit a report.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait SubmissionStore: Send + Sync {
    /// Latest `Pending Review` snapshot of a wallet owned by the organization.
    fn latest_pending(
        &self,
        organization_id: i64,
        wallet_id: i64,
    ) -> impl Future<Output = Result<Option<PendingSnapshot>, SubmissionError>> + Send;

    /// Marks the snapshot submitted, writes the archive with its transactions
    /// and receipts, clears the live month and ticks the month on the master
    /// checklist. Returns the archive ID.
    ///
    /// Implementations must apply all of this atomically.
    fn archive_and_reset(
        &self,
        request: &ArchiveRequest,
    ) -> impl Future<Output = Result<i64, SubmissionError>> + Send;

    /// Tells OSAS that a report is waiting for review.
    fn notify_osas(
        &self,
        snapshot: &PendingSnapshot,
        message: &str,
    ) -> impl Future<Output = Result<(), SubmissionError>> + Send;
}

/// Submits per-wallet report snapshots.
pub struct ReportSubmissionService<S: SubmissionStore> {
    store: Arc<S>,
}

impl<S: SubmissionStore> ReportSubmissionService<S> {
    /// Create a new submission service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Message stored on the OSAS notification. The organization name has
    /// its own column.
    pub const NOTIFICATION_MESSAGE: &str = "has a report \"Pending Review\"";

    /// Submits the latest pending snapshot of a wallet.
    ///
    /// The notification is best-effort: a failure there is logged and the
    /// submission still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::NoPendingReport` when nothing is pending and
    /// `SubmissionError::Store` when persistence fails.
    pub async fn submit(
        &self,
        organization_id: i64,
        wallet_id: i64,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let snapshot = self
            .store
            .latest_pending(organization_id, wallet_id)
            .await?
            .ok_or(SubmissionError::NoPendingReport)?;

        let request = ArchiveRequest {
            remaining: snapshot.figures.remaining(),
            submitted_on: today,
            snapshot,
        };
        let archive_id = self.store.archive_and_reset(&request).await?;

        let notified = match self
            .store
            .notify_osas(&request.snapshot, Self::NOTIFICATION_MESSAGE)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    report_id = request.snapshot.report_id,
                    "Failed to notify OSAS of submitted report"
                );
                false
            }
        };

        tracing::info!(
            organization_id,
            wallet_id,
            report_id = request.snapshot.report_id,
            archive_id,
            "Report submitted"
        );

        Ok(SubmissionOutcome {
            report_id: request.snapshot.report_id,
            archive_id,
            notified,
        })
    }
}
