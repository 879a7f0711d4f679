//! Database seeder for Orgfin.
//!
//! Seeds the twelve months, a default department list and the first OSAS
//! superadmin. Running it again leaves existing rows alone.
//!
//! Usage: cargo run --bin seeder
//!
//! Environment:
//! - `DATABASE_URL` (required)
//! - `ORGFIN_SEED_ADMIN_USERNAME` (default `osas_admin`)
//! - `ORGFIN_SEED_ADMIN_PASSWORD` (default `osas123`)
//! - `ORGFIN_SEED_ADMIN_EMAIL`

use anyhow::Context;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

use orgfin_core::auth::hash_password;
use orgfin_db::entities::months;
use orgfin_db::repositories::{DepartmentRepository, NewAdmin, OsasAdminRepository};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DEPARTMENTS: [&str; 5] = [
    "College of Computer Studies",
    "College of Arts and Sciences",
    "College of Business Administration",
    "College of Education",
    "College of Engineering",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = orgfin_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding months...");
    seed_months(&db).await?;

    println!("Seeding departments...");
    seed_departments(&db).await?;

    println!("Seeding OSAS superadmin...");
    seed_superadmin(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_months(db: &DatabaseConnection) -> anyhow::Result<()> {
    if months::Entity::find().count(db).await? > 0 {
        println!("  Months already exist, skipping...");
        return Ok(());
    }

    for (order, name) in (1..).zip(MONTHS) {
        months::ActiveModel {
            month_name: Set(name.to_string()),
            month_order: Set(order),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    println!("  Inserted {} months", MONTHS.len());
    Ok(())
}

async fn seed_departments(db: &DatabaseConnection) -> anyhow::Result<()> {
    let repo = DepartmentRepository::new(db.clone());
    for name in DEPARTMENTS {
        let dept = repo.ensure(name).await?;
        println!("  {} (id {})", dept.dept_name, dept.id);
    }
    Ok(())
}

async fn seed_superadmin(db: &DatabaseConnection) -> anyhow::Result<()> {
    let username =
        std::env::var("ORGFIN_SEED_ADMIN_USERNAME").unwrap_or_else(|_| "osas_admin".to_string());
    let password =
        std::env::var("ORGFIN_SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "osas123".to_string());
    let email = std::env::var("ORGFIN_SEED_ADMIN_EMAIL").ok();

    let repo = OsasAdminRepository::new(db.clone());
    if repo.find_by_username(&username).await?.is_some() {
        println!("  Admin '{username}' already exists, skipping...");
        return Ok(());
    }

    let password_hash = hash_password(&password)?;
    let admin = repo
        .create(NewAdmin {
            username,
            password_hash,
            full_name: Some("OSAS Administrator".to_string()),
            email,
            role: "superadmin".to_string(),
        })
        .await?;

    println!("  Created superadmin '{}' (id {})", admin.username, admin.id);
    println!("  Change the seeded password before going to production.");
    Ok(())
}
