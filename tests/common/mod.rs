//! Shared test harness: in-memory SQLite with the real migration set, plus
//! seed helpers for the entities the settlement flows hang off.

#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;

use commerce_backend::entities::{
    bounties, bounty_bids, challenges, organisation_point_accounts, organisations, persons,
    platform_fee_configurations, prelude::*, product_point_accounts, products,
};

/// Fresh in-memory database with all migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// SQLite instance.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn seed_person(db: &DatabaseConnection, name: &str) -> persons::Model {
    persons::ActiveModel {
        full_name: Set(name.to_string()),
        email: Set(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed person")
}

pub async fn seed_organisation(
    db: &DatabaseConnection,
    name: &str,
    country: &str,
) -> organisations::Model {
    let now = Utc::now().fixed_offset();
    organisations::ActiveModel {
        name: Set(name.to_string()),
        country: Set(country.to_string()),
        tax_id: Set(None),
        tax_rate_bps: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed organisation")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    organisation_id: i32,
    name: &str,
) -> products::Model {
    products::ActiveModel {
        organisation_id: Set(organisation_id),
        name: Set(name.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed product")
}

pub async fn seed_challenge(db: &DatabaseConnection, product_id: i32, title: &str) -> challenges::Model {
    let now = Utc::now().fixed_offset();
    challenges::ActiveModel {
        product_id: Set(product_id),
        title: Set(title.to_string()),
        status: Set("Draft".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed challenge")
}

pub async fn seed_bounty(
    db: &DatabaseConnection,
    product_id: i32,
    challenge_id: Option<i32>,
    reward_type: &str,
    reward_amount: i64,
) -> bounties::Model {
    let now = Utc::now().fixed_offset();
    bounties::ActiveModel {
        product_id: Set(product_id),
        challenge_id: Set(challenge_id),
        competition_id: Set(None),
        title: Set("Test Bounty".to_string()),
        reward_type: Set(reward_type.to_string()),
        reward_amount: Set(reward_amount),
        final_reward_amount: Set(None),
        status: Set("Available".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed bounty")
}

pub async fn seed_bid(
    db: &DatabaseConnection,
    bounty_id: i32,
    person_id: i32,
    amount: i64,
) -> bounty_bids::Model {
    let now = Utc::now().fixed_offset();
    bounty_bids::ActiveModel {
        bounty_id: Set(bounty_id),
        person_id: Set(person_id),
        amount: Set(amount),
        status: Set("Pending".to_string()),
        message: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed bid")
}

/// Fee configuration applying from `days_ago` days before now (negative
/// for a future configuration).
pub async fn seed_fee_configuration(
    db: &DatabaseConnection,
    percentage: i32,
    days_ago: i64,
) -> platform_fee_configurations::Model {
    let now = Utc::now().fixed_offset();
    platform_fee_configurations::ActiveModel {
        percentage: Set(percentage),
        applies_from: Set(now - chrono::Duration::days(days_ago)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed fee configuration")
}

pub async fn org_balance(db: &DatabaseConnection, organisation_id: i32) -> i64 {
    OrganisationPointAccounts::find()
        .filter(organisation_point_accounts::Column::OrganisationId.eq(organisation_id))
        .one(db)
        .await
        .expect("Query failed")
        .map(|account| account.balance)
        .unwrap_or(0)
}

pub async fn product_balance(db: &DatabaseConnection, product_id: i32) -> i64 {
    ProductPointAccounts::find()
        .filter(product_point_accounts::Column::ProductId.eq(product_id))
        .one(db)
        .await
        .expect("Query failed")
        .map(|account| account.balance)
        .unwrap_or(0)
}
