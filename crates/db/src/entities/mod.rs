//! `SeaORM` entity definitions.

pub mod archive_receipts;
pub mod archive_transactions;
pub mod departments;
pub mod financial_report_archives;
pub mod financial_reports;
pub mod months;
pub mod organizations;
pub mod osas_activity_log;
pub mod osas_admin_audit;
pub mod osas_admins;
pub mod osas_notifications;
pub mod osas_password_resets;
pub mod osas_sessions;
pub mod profile_users;
pub mod wallet_budgets;
pub mod wallet_receipts;
pub mod wallet_transactions;
pub mod wallets;
