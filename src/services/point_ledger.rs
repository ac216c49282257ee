//! Point ledger service
//!
//! The only code allowed to touch point account balances. Every successful
//! mutation appends one point_transactions row per touched account; rows
//! are never edited or deleted. Debits return Ok(false) on insufficient
//! balance instead of erroring.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::entities::{
    organisation_point_accounts, organisation_point_grants, point_transactions, prelude::*,
    product_point_accounts,
};

/// Ledger transaction kinds, stored as strings on the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Grant,
    Use,
    Refund,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Grant => "GRANT",
            TransactionType::Use => "USE",
            TransactionType::Refund => "REFUND",
            TransactionType::Transfer => "TRANSFER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GRANT" => Some(TransactionType::Grant),
            "USE" => Some(TransactionType::Use),
            "REFUND" => Some(TransactionType::Refund),
            "TRANSFER" => Some(TransactionType::Transfer),
            _ => None,
        }
    }
}

/// Validation failures raised before anything is written
#[derive(Debug)]
pub enum LedgerError {
    /// Amounts must be strictly positive; zero is rejected, not clamped
    NonPositiveAmount(i64),
    AccountNotFound(&'static str, i32),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::NonPositiveAmount(amount) => {
                write!(f, "Point amount must be positive, got {}", amount)
            }
            LedgerError::AccountNotFound(kind, id) => {
                write!(f, "{} point account {} not found", kind, id)
            }
        }
    }
}

impl std::error::Error for LedgerError {}

fn ensure_positive(amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Append one ledger row. Exactly one of the two account ids is set.
async fn record_transaction<C: ConnectionTrait>(
    conn: &C,
    org_account_id: Option<i32>,
    product_account_id: Option<i32>,
    cart_id: Option<i32>,
    amount: i64,
    transaction_type: TransactionType,
    description: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if org_account_id.is_some() == product_account_id.is_some() {
        return Err("Point transaction must reference exactly one account".into());
    }

    let row = point_transactions::ActiveModel {
        org_account_id: Set(org_account_id),
        product_account_id: Set(product_account_id),
        cart_id: Set(cart_id),
        amount: Set(amount),
        transaction_type: Set(transaction_type.as_str().to_string()),
        description: Set(description.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    row.insert(conn).await?;
    Ok(())
}

/// Find or create the point account for an organisation
pub async fn get_or_create_org_account<C: ConnectionTrait>(
    conn: &C,
    organisation_id: i32,
) -> Result<organisation_point_accounts::Model, Box<dyn std::error::Error + Send + Sync>> {
    let existing = OrganisationPointAccounts::find()
        .filter(organisation_point_accounts::Column::OrganisationId.eq(organisation_id))
        .one(conn)
        .await?;

    match existing {
        Some(account) => Ok(account),
        None => {
            let now = Utc::now().fixed_offset();
            let account = organisation_point_accounts::ActiveModel {
                organisation_id: Set(organisation_id),
                balance: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            Ok(account.insert(conn).await?)
        }
    }
}

/// Find or create the point account for a product
pub async fn get_or_create_product_account<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<product_point_accounts::Model, Box<dyn std::error::Error + Send + Sync>> {
    let existing = ProductPointAccounts::find()
        .filter(product_point_accounts::Column::ProductId.eq(product_id))
        .one(conn)
        .await?;

    match existing {
        Some(account) => Ok(account),
        None => {
            let now = Utc::now().fixed_offset();
            let account = product_point_accounts::ActiveModel {
                product_id: Set(product_id),
                balance: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            Ok(account.insert(conn).await?)
        }
    }
}

/// Unconditionally credit an organisation account and record the ledger row
pub async fn credit_org_account<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    amount: i64,
    transaction_type: TransactionType,
    description: &str,
    cart_id: Option<i32>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    ensure_positive(amount)?;

    let account = OrganisationPointAccounts::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound("organisation", account_id))?;

    let mut active: organisation_point_accounts::ActiveModel = account.into();
    active.balance = Set(active.balance.unwrap() + amount);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;

    record_transaction(
        conn,
        Some(account_id),
        None,
        cart_id,
        amount,
        transaction_type,
        description,
    )
    .await?;

    tracing::debug!(
        "Credited {} points to organisation account {} ({})",
        amount,
        account_id,
        transaction_type.as_str()
    );
    Ok(())
}

/// Debit an organisation account if the balance covers it.
///
/// Returns Ok(false) and writes nothing when the balance is insufficient.
pub async fn debit_org_account<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    amount: i64,
    transaction_type: TransactionType,
    description: &str,
    cart_id: Option<i32>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    ensure_positive(amount)?;

    let account = OrganisationPointAccounts::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound("organisation", account_id))?;

    if account.balance < amount {
        tracing::info!(
            "Organisation account {} has {} points, cannot debit {}",
            account_id,
            account.balance,
            amount
        );
        return Ok(false);
    }

    let mut active: organisation_point_accounts::ActiveModel = account.into();
    active.balance = Set(active.balance.unwrap() - amount);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;

    record_transaction(
        conn,
        Some(account_id),
        None,
        cart_id,
        amount,
        transaction_type,
        description,
    )
    .await?;

    Ok(true)
}

/// Unconditionally credit a product account and record the ledger row
pub async fn credit_product_account<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    amount: i64,
    transaction_type: TransactionType,
    description: &str,
    cart_id: Option<i32>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    ensure_positive(amount)?;

    let account = ProductPointAccounts::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound("product", account_id))?;

    let mut active: product_point_accounts::ActiveModel = account.into();
    active.balance = Set(active.balance.unwrap() + amount);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;

    record_transaction(
        conn,
        None,
        Some(account_id),
        cart_id,
        amount,
        transaction_type,
        description,
    )
    .await?;

    Ok(())
}

/// Debit a product account if the balance covers it
pub async fn debit_product_account<C: ConnectionTrait>(
    conn: &C,
    account_id: i32,
    amount: i64,
    transaction_type: TransactionType,
    description: &str,
    cart_id: Option<i32>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    ensure_positive(amount)?;

    let account = ProductPointAccounts::find_by_id(account_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound("product", account_id))?;

    if account.balance < amount {
        tracing::info!(
            "Product account {} has {} points, cannot debit {}",
            account_id,
            account.balance,
            amount
        );
        return Ok(false);
    }

    let mut active: product_point_accounts::ActiveModel = account.into();
    active.balance = Set(active.balance.unwrap() - amount);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;

    record_transaction(
        conn,
        None,
        Some(account_id),
        cart_id,
        amount,
        transaction_type,
        description,
    )
    .await?;

    Ok(true)
}

/// Move points from an organisation account to a product account within an
/// already-open transaction. USE is recorded on the source, TRANSFER on the
/// destination. Returns Ok(false) without writing when the source balance
/// is insufficient; the caller decides whether to roll back.
pub async fn transfer_to_product_within<C: ConnectionTrait>(
    conn: &C,
    org_account_id: i32,
    product_account_id: i32,
    amount: i64,
    description: &str,
    cart_id: Option<i32>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    if !debit_org_account(
        conn,
        org_account_id,
        amount,
        TransactionType::Use,
        description,
        cart_id,
    )
    .await?
    {
        return Ok(false);
    }

    credit_product_account(
        conn,
        product_account_id,
        amount,
        TransactionType::Transfer,
        description,
        cart_id,
    )
    .await?;

    Ok(true)
}

/// Atomic organisation -> product transfer. On insufficient source balance
/// nothing is written and no TRANSFER row is recorded.
pub async fn transfer_to_product(
    db: &DatabaseConnection,
    org_account_id: i32,
    product_account_id: i32,
    amount: i64,
    description: &str,
    cart_id: Option<i32>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    ensure_positive(amount)?;

    let txn = db.begin().await?;
    let moved = transfer_to_product_within(
        &txn,
        org_account_id,
        product_account_id,
        amount,
        description,
        cart_id,
    )
    .await?;

    if moved {
        txn.commit().await?;
    } else {
        txn.rollback().await?;
    }
    Ok(moved)
}

/// Reverse a settled transfer: debit the product account and credit the
/// organisation account, recording REFUND on both sides.
pub async fn refund_transfer_within<C: ConnectionTrait>(
    conn: &C,
    org_account_id: i32,
    product_account_id: i32,
    amount: i64,
    description: &str,
    cart_id: Option<i32>,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    if !debit_product_account(
        conn,
        product_account_id,
        amount,
        TransactionType::Refund,
        description,
        cart_id,
    )
    .await?
    {
        return Ok(false);
    }

    credit_org_account(
        conn,
        org_account_id,
        amount,
        TransactionType::Refund,
        description,
        cart_id,
    )
    .await?;

    Ok(true)
}

/// Record an organisation point grant: creates the grant row, credits the
/// account and writes the GRANT ledger row, all in one transaction.
pub async fn record_grant(
    db: &DatabaseConnection,
    organisation_id: i32,
    amount: i64,
    granted_by_id: Option<i32>,
    rationale: &str,
) -> Result<organisation_point_grants::Model, Box<dyn std::error::Error + Send + Sync>> {
    ensure_positive(amount)?;

    let txn = db.begin().await?;

    let account = get_or_create_org_account(&txn, organisation_id).await?;
    credit_org_account(
        &txn,
        account.id,
        amount,
        TransactionType::Grant,
        &format!("Grant: {}", rationale),
        None,
    )
    .await?;

    let grant = organisation_point_grants::ActiveModel {
        organisation_id: Set(organisation_id),
        amount: Set(amount),
        granted_by_id: Set(granted_by_id),
        rationale: Set(rationale.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    let grant = grant.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        "Granted {} points to organisation {}",
        amount,
        organisation_id
    );
    Ok(grant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        for tx_type in [
            TransactionType::Grant,
            TransactionType::Use,
            TransactionType::Refund,
            TransactionType::Transfer,
        ] {
            assert_eq!(TransactionType::from_str(tx_type.as_str()), Some(tx_type));
        }
        assert_eq!(TransactionType::from_str("SPEND"), None);
    }

    #[test]
    fn test_ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(1).is_ok());
        assert!(ensure_positive(0).is_err());
        assert!(ensure_positive(-500).is_err());
    }
}
