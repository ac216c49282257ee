//! Organisation wallet service
//!
//! USD credit balance per organisation, used for decrease-adjustment
//! refunds. Mirrors the point ledger contract: every mutation appends an
//! immutable wallet transaction row and debits fail softly with Ok(false).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::entities::{organisation_wallet_transactions, organisation_wallets, prelude::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletTransactionType {
    Credit,
    Debit,
}

impl WalletTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletTransactionType::Credit => "CREDIT",
            WalletTransactionType::Debit => "DEBIT",
        }
    }
}

pub async fn get_or_create_wallet<C: ConnectionTrait>(
    conn: &C,
    organisation_id: i32,
) -> Result<organisation_wallets::Model, Box<dyn std::error::Error + Send + Sync>> {
    let existing = OrganisationWallets::find()
        .filter(organisation_wallets::Column::OrganisationId.eq(organisation_id))
        .one(conn)
        .await?;

    match existing {
        Some(wallet) => Ok(wallet),
        None => {
            let now = Utc::now().fixed_offset();
            let wallet = organisation_wallets::ActiveModel {
                organisation_id: Set(organisation_id),
                balance_usd_cents: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            Ok(wallet.insert(conn).await?)
        }
    }
}

async fn record_wallet_transaction<C: ConnectionTrait>(
    conn: &C,
    wallet_id: i32,
    transaction_type: WalletTransactionType,
    amount_cents: i64,
    description: &str,
    related_sales_order_id: Option<i32>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let row = organisation_wallet_transactions::ActiveModel {
        wallet_id: Set(wallet_id),
        transaction_type: Set(transaction_type.as_str().to_string()),
        amount_cents: Set(amount_cents),
        description: Set(description.to_string()),
        related_sales_order_id: Set(related_sales_order_id),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    row.insert(conn).await?;
    Ok(())
}

/// Credit the wallet; amounts must be positive.
pub async fn add_funds<C: ConnectionTrait>(
    conn: &C,
    wallet_id: i32,
    amount_cents: i64,
    description: &str,
    related_sales_order_id: Option<i32>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if amount_cents <= 0 {
        return Err(format!("Wallet credit must be positive, got {}", amount_cents).into());
    }

    let wallet = OrganisationWallets::find_by_id(wallet_id)
        .one(conn)
        .await?
        .ok_or_else(|| format!("Wallet {} not found", wallet_id))?;

    let mut active: organisation_wallets::ActiveModel = wallet.into();
    active.balance_usd_cents = Set(active.balance_usd_cents.unwrap() + amount_cents);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;

    record_wallet_transaction(
        conn,
        wallet_id,
        WalletTransactionType::Credit,
        amount_cents,
        description,
        related_sales_order_id,
    )
    .await?;

    tracing::info!("Credited {} cents to wallet {}", amount_cents, wallet_id);
    Ok(())
}

/// Debit the wallet if the balance covers it; Ok(false) otherwise.
pub async fn deduct_funds<C: ConnectionTrait>(
    conn: &C,
    wallet_id: i32,
    amount_cents: i64,
    description: &str,
    related_sales_order_id: Option<i32>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    if amount_cents <= 0 {
        return Err(format!("Wallet debit must be positive, got {}", amount_cents).into());
    }

    let wallet = OrganisationWallets::find_by_id(wallet_id)
        .one(conn)
        .await?
        .ok_or_else(|| format!("Wallet {} not found", wallet_id))?;

    if wallet.balance_usd_cents < amount_cents {
        tracing::info!(
            "Wallet {} has {} cents, cannot debit {}",
            wallet_id,
            wallet.balance_usd_cents,
            amount_cents
        );
        return Ok(false);
    }

    let mut active: organisation_wallets::ActiveModel = wallet.into();
    active.balance_usd_cents = Set(active.balance_usd_cents.unwrap() - amount_cents);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;

    record_wallet_transaction(
        conn,
        wallet_id,
        WalletTransactionType::Debit,
        amount_cents,
        description,
        related_sales_order_id,
    )
    .await?;

    Ok(true)
}
