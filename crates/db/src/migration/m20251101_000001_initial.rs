//! Initial database migration.
//!
//! Creates the organization, OSAS, wallet and report tables and seeds the
//! calendar months.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ORGANIZATIONS
        // ============================================================
        db.execute_unprepared(DEPARTMENTS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(PROFILE_USERS_SQL).await?;

        // ============================================================
        // PART 2: OSAS ADMINISTRATION
        // ============================================================
        db.execute_unprepared(OSAS_ADMIN_SQL).await?;
        db.execute_unprepared(OSAS_NOTIFICATIONS_SQL).await?;

        // ============================================================
        // PART 3: WALLETS
        // ============================================================
        db.execute_unprepared(MONTHS_SQL).await?;
        db.execute_unprepared(WALLETS_SQL).await?;

        // ============================================================
        // PART 4: FINANCIAL REPORTS & ARCHIVES
        // ============================================================
        db.execute_unprepared(FINANCIAL_REPORTS_SQL).await?;
        db.execute_unprepared(ARCHIVES_SQL).await?;

        // ============================================================
        // PART 5: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_MONTHS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const DEPARTMENTS_SQL: &str = r"
CREATE TABLE departments (
    id BIGSERIAL PRIMARY KEY,
    dept_name VARCHAR(255) NOT NULL UNIQUE
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id BIGSERIAL PRIMARY KEY,
    org_name VARCHAR(255) NOT NULL UNIQUE,
    username VARCHAR(100) NOT NULL UNIQUE,
    password TEXT NOT NULL,
    accreditation_date DATE,
    status VARCHAR(20) NOT NULL DEFAULT 'Active'
        CHECK (status IN ('Active', 'Archived')),
    department_id BIGINT REFERENCES departments(id) ON DELETE SET NULL,
    must_change_password BOOLEAN NOT NULL DEFAULT TRUE,
    created_by VARCHAR(100),
    org_short_name VARCHAR(100),
    department VARCHAR(255),
    school VARCHAR(255),
    profile_picture TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_organizations_status ON organizations(status);
CREATE INDEX idx_organizations_department ON organizations(department_id);
";

const PROFILE_USERS_SQL: &str = r"
CREATE TABLE profile_users (
    id BIGSERIAL PRIMARY KEY,
    organization_id BIGINT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    school_name VARCHAR(255)
);
";

const OSAS_ADMIN_SQL: &str = r"
CREATE TABLE osas_admin (
    id BIGSERIAL PRIMARY KEY,
    username VARCHAR(100) NOT NULL UNIQUE,
    password TEXT NOT NULL,
    full_name VARCHAR(255),
    email VARCHAR(255),
    role VARCHAR(50) NOT NULL DEFAULT 'admin',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE osas_activity_log (
    id BIGSERIAL PRIMARY KEY,
    admin_id BIGINT REFERENCES osas_admin(id) ON DELETE CASCADE,
    action_type VARCHAR(50) NOT NULL,
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_osas_activity_admin ON osas_activity_log(admin_id, created_at DESC);

CREATE TABLE osas_admin_audit (
    id BIGSERIAL PRIMARY KEY,
    admin_id BIGINT REFERENCES osas_admin(id) ON DELETE CASCADE,
    changed_field VARCHAR(100) NOT NULL,
    old_value TEXT,
    new_value TEXT,
    changed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE osas_sessions (
    id BIGSERIAL PRIMARY KEY,
    admin_id BIGINT NOT NULL REFERENCES osas_admin(id) ON DELETE CASCADE,
    device_info TEXT,
    ip_address VARCHAR(64),
    last_active_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    is_current BOOLEAN NOT NULL DEFAULT TRUE
);

CREATE INDEX idx_osas_sessions_admin ON osas_sessions(admin_id, last_active_at DESC);

CREATE TABLE osas_password_resets (
    id BIGSERIAL PRIMARY KEY,
    admin_id BIGINT NOT NULL REFERENCES osas_admin(id) ON DELETE CASCADE,
    token VARCHAR(64) NOT NULL UNIQUE,
    expires_at TIMESTAMPTZ NOT NULL,
    used BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const OSAS_NOTIFICATIONS_SQL: &str = r"
CREATE TABLE osas_notifications (
    id BIGSERIAL PRIMARY KEY,
    org_id BIGINT REFERENCES organizations(id) ON DELETE CASCADE,
    report_id BIGINT,
    org_name VARCHAR(255),
    message TEXT NOT NULL,
    is_read BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_osas_notifications_created ON osas_notifications(created_at DESC);
";

const MONTHS_SQL: &str = r"
CREATE TABLE months (
    id BIGSERIAL PRIMARY KEY,
    month_name VARCHAR(20) NOT NULL UNIQUE,
    month_order INTEGER NOT NULL UNIQUE CHECK (month_order BETWEEN 1 AND 12)
);
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id BIGSERIAL PRIMARY KEY,
    organization_id BIGINT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL
);

CREATE INDEX idx_wallets_org ON wallets(organization_id);

CREATE TABLE wallet_budgets (
    id BIGSERIAL PRIMARY KEY,
    wallet_id BIGINT NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    month_id BIGINT NOT NULL REFERENCES months(id),
    year INTEGER NOT NULL,
    amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    UNIQUE (wallet_id, month_id, year)
);

CREATE TABLE wallet_transactions (
    id BIGSERIAL PRIMARY KEY,
    wallet_id BIGINT NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    budget_id BIGINT NOT NULL REFERENCES wallet_budgets(id) ON DELETE CASCADE,
    kind VARCHAR(10) NOT NULL CHECK (kind IN ('income', 'expense')),
    date_issued DATE,
    quantity INTEGER NOT NULL DEFAULT 0,
    income_type VARCHAR(255),
    particulars VARCHAR(255),
    description TEXT,
    price NUMERIC(14, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_wallet_transactions_folder ON wallet_transactions(wallet_id, budget_id);

CREATE TABLE wallet_receipts (
    id BIGSERIAL PRIMARY KEY,
    wallet_id BIGINT NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    budget_id BIGINT NOT NULL REFERENCES wallet_budgets(id) ON DELETE CASCADE,
    file_url TEXT NOT NULL,
    description TEXT,
    receipt_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_wallet_receipts_folder ON wallet_receipts(wallet_id, budget_id);
";

const FINANCIAL_REPORTS_SQL: &str = r"
CREATE TABLE financial_reports (
    id BIGSERIAL PRIMARY KEY,
    organization_id BIGINT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    wallet_id BIGINT REFERENCES wallets(id) ON DELETE CASCADE,
    budget_id BIGINT REFERENCES wallet_budgets(id) ON DELETE CASCADE,
    status VARCHAR(30) NOT NULL DEFAULT 'Pending Review'
        CHECK (status IN ('Pending Review', 'In Review', 'Completed', 'Submitted')),
    notes TEXT,
    checklist JSONB NOT NULL DEFAULT '{}'::jsonb,
    submission_date DATE,
    event_name VARCHAR(255),
    date_prepared DATE,
    report_no VARCHAR(50),
    budget NUMERIC(14, 2),
    total_income NUMERIC(14, 2),
    total_expense NUMERIC(14, 2),
    reimbursement NUMERIC(14, 2),
    previous_fund NUMERIC(14, 2),
    budget_in_the_bank NUMERIC(14, 2),
    report_month VARCHAR(20),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK ((wallet_id IS NULL) = (budget_id IS NULL))
);

CREATE INDEX idx_financial_reports_org ON financial_reports(organization_id, created_at DESC);
CREATE INDEX idx_financial_reports_folder ON financial_reports(wallet_id, budget_id);
";

const ARCHIVES_SQL: &str = r"
CREATE TABLE financial_report_archives (
    id BIGSERIAL PRIMARY KEY,
    organization_id BIGINT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    wallet_id BIGINT NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
    budget_id BIGINT REFERENCES wallet_budgets(id) ON DELETE SET NULL,
    report_id BIGINT REFERENCES financial_reports(id) ON DELETE SET NULL,
    report_no VARCHAR(50),
    event_name VARCHAR(255),
    date_prepared DATE,
    budget NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_expense NUMERIC(14, 2) NOT NULL DEFAULT 0,
    reimbursement NUMERIC(14, 2) NOT NULL DEFAULT 0,
    previous_fund NUMERIC(14, 2) NOT NULL DEFAULT 0,
    remaining NUMERIC(14, 2) NOT NULL DEFAULT 0,
    file_url TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_archives_folder ON financial_report_archives(organization_id, wallet_id, budget_id);

CREATE TABLE financial_report_archive_transactions (
    id BIGSERIAL PRIMARY KEY,
    archive_id BIGINT NOT NULL REFERENCES financial_report_archives(id) ON DELETE CASCADE,
    kind VARCHAR(10) NOT NULL,
    date_issued DATE,
    quantity INTEGER NOT NULL DEFAULT 0,
    particulars VARCHAR(255),
    income_type VARCHAR(255),
    description TEXT,
    price NUMERIC(14, 2) NOT NULL DEFAULT 0
);

CREATE TABLE financial_report_archive_receipts (
    id BIGSERIAL PRIMARY KEY,
    archive_id BIGINT NOT NULL REFERENCES financial_report_archives(id) ON DELETE CASCADE,
    description TEXT,
    receipt_date DATE,
    file_url TEXT NOT NULL
);
";

const SEED_MONTHS_SQL: &str = r"
INSERT INTO months (month_name, month_order) VALUES
    ('January', 1), ('February', 2), ('March', 3), ('April', 4),
    ('May', 5), ('June', 6), ('July', 7), ('August', 8),
    ('September', 9), ('October', 10), ('November', 11), ('December', 12)
ON CONFLICT (month_name) DO NOTHING;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS financial_report_archive_receipts CASCADE;
DROP TABLE IF EXISTS financial_report_archive_transactions CASCADE;
DROP TABLE IF EXISTS financial_report_archives CASCADE;
DROP TABLE IF EXISTS financial_reports CASCADE;
DROP TABLE IF EXISTS wallet_receipts CASCADE;
DROP TABLE IF EXISTS wallet_transactions CASCADE;
DROP TABLE IF EXISTS wallet_budgets CASCADE;
DROP TABLE IF EXISTS wallets CASCADE;
DROP TABLE IF EXISTS months CASCADE;
DROP TABLE IF EXISTS osas_notifications CASCADE;
DROP TABLE IF EXISTS osas_password_resets CASCADE;
DROP TABLE IF EXISTS osas_sessions CASCADE;
DROP TABLE IF EXISTS osas_admin_audit CASCADE;
DROP TABLE IF EXISTS osas_activity_log CASCADE;
DROP TABLE IF EXISTS osas_admin CASCADE;
DROP TABLE IF EXISTS profile_users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS departments CASCADE;
";
