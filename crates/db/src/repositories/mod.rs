//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod archive;
pub mod dashboard;
pub mod department;
pub mod financial_report;
pub mod notification;
pub mod organization;
pub mod osas_admin;
pub mod receipt;
pub mod report_context;
pub mod submission;
pub mod transaction;
pub mod wallet;

pub use archive::{ArchiveRepository, ArchiveWithItems};
pub use dashboard::DashboardRepository;
pub use department::DepartmentRepository;
pub use financial_report::{FinancialReportRepository, MasterReportInput, SnapshotInput};
pub use notification::{NOTIFICATION_PAGE_SIZE, NotificationRepository, has_unread};
pub use organization::{
    ALL_DEPARTMENTS, DEFAULT_SCHOOL_NAME, DEFAULT_WALLET_NAME, FieldChange, NewOrganization,
    OrganizationError, OrganizationListing, OrganizationRepository, OrganizationUpdate,
    ProfileUpdate,
};
pub use osas_admin::{
    ACTIVITY_PAGE_SIZE, ActivityFilter, AdminProfileUpdate, NewAdmin, OsasAdminRepository,
    RESET_TOKEN_TTL_HOURS,
};
pub use receipt::ReceiptRepository;
pub use report_context::{ReportContextRepository, ReportHeading};
pub use submission::DbSubmissionStore;
pub use transaction::{LineItemInput, TransactionRepository};
pub use wallet::{FolderContext, FolderSummary, WalletRepository};
