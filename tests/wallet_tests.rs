mod common;

use sea_orm::EntityTrait;

use commerce_backend::entities::prelude::*;
use commerce_backend::services::wallet;

use crate::common::{seed_organisation, setup_test_db};

#[tokio::test]
async fn test_add_and_deduct_funds_leave_a_transaction_trail() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;

    let wallet_row = wallet::get_or_create_wallet(&db, org.id).await.unwrap();
    assert_eq!(wallet_row.balance_usd_cents, 0);

    wallet::add_funds(&db, wallet_row.id, 5000, "Top up", None)
        .await
        .unwrap();

    let deducted = wallet::deduct_funds(&db, wallet_row.id, 2000, "Invoice", None)
        .await
        .unwrap();
    assert!(deducted);

    let wallet_row = OrganisationWallets::find_by_id(wallet_row.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet_row.balance_usd_cents, 3000);

    let transactions = OrganisationWalletTransactions::find().all(&db).await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert!(transactions.iter().any(|tx| tx.transaction_type == "CREDIT"));
    assert!(transactions.iter().any(|tx| tx.transaction_type == "DEBIT"));
}

#[tokio::test]
async fn test_deduct_beyond_balance_is_refused_without_writes() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    let wallet_row = wallet::get_or_create_wallet(&db, org.id).await.unwrap();

    wallet::add_funds(&db, wallet_row.id, 1000, "Top up", None)
        .await
        .unwrap();

    let deducted = wallet::deduct_funds(&db, wallet_row.id, 5000, "Too much", None)
        .await
        .unwrap();
    assert!(!deducted);

    let wallet_row = OrganisationWallets::find_by_id(wallet_row.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet_row.balance_usd_cents, 1000);

    let transactions = OrganisationWalletTransactions::find().all(&db).await.unwrap();
    assert_eq!(transactions.len(), 1, "refused debit must not leave a row");
}

#[tokio::test]
async fn test_non_positive_wallet_amounts_are_rejected() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    let wallet_row = wallet::get_or_create_wallet(&db, org.id).await.unwrap();

    assert!(wallet::add_funds(&db, wallet_row.id, 0, "Nothing", None)
        .await
        .is_err());
    assert!(wallet::deduct_funds(&db, wallet_row.id, -100, "Negative", None)
        .await
        .is_err());
}
