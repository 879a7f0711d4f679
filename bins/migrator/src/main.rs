//! Database migration runner for Orgfin.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! Reads the connection string from `DATABASE_URL`.

use sea_orm_migration::prelude::*;
use orgfin_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI sets up its own tracing
    cli::run_cli(Migrator).await;
}
