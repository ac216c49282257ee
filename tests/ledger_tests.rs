mod common;

use sea_orm::EntityTrait;

use commerce_backend::entities::prelude::*;
use commerce_backend::services::point_ledger;

use crate::common::{org_balance, product_balance, seed_organisation, seed_product, setup_test_db};

#[tokio::test]
async fn test_grant_credits_account_and_records_transaction() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;

    let grant = point_ledger::record_grant(&db, org.id, 1000, None, "Initial funding")
        .await
        .unwrap();
    assert_eq!(grant.amount, 1000);
    assert_eq!(org_balance(&db, org.id).await, 1000);

    let transactions = PointTransactions::find().all(&db).await.unwrap();
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.amount, 1000);
    assert_eq!(tx.transaction_type, "GRANT");
    assert_eq!(tx.description, "Grant: Initial funding");
    assert!(tx.org_account_id.is_some());
    assert!(tx.product_account_id.is_none());
}

#[tokio::test]
async fn test_use_points_decrements_exactly_or_not_at_all() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    point_ledger::record_grant(&db, org.id, 1000, None, "Seed")
        .await
        .unwrap();
    let account = point_ledger::get_or_create_org_account(&db, org.id)
        .await
        .unwrap();

    let used = point_ledger::debit_org_account(
        &db,
        account.id,
        400,
        point_ledger::TransactionType::Use,
        "Bounty funding",
        None,
    )
    .await
    .unwrap();
    assert!(used);
    assert_eq!(org_balance(&db, org.id).await, 600);

    // Balance must be untouched when it cannot cover the debit
    let used = point_ledger::debit_org_account(
        &db,
        account.id,
        5000,
        point_ledger::TransactionType::Use,
        "Too much",
        None,
    )
    .await
    .unwrap();
    assert!(!used);
    assert_eq!(org_balance(&db, org.id).await, 600);

    let transactions = PointTransactions::find().all(&db).await.unwrap();
    assert_eq!(transactions.len(), 2, "failed debit must not leave a row");
}

#[tokio::test]
async fn test_zero_and_negative_amounts_are_rejected() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;

    assert!(point_ledger::record_grant(&db, org.id, 0, None, "Nothing")
        .await
        .is_err());
    assert!(point_ledger::record_grant(&db, org.id, -500, None, "Negative")
        .await
        .is_err());

    let account = point_ledger::get_or_create_org_account(&db, org.id)
        .await
        .unwrap();
    assert!(point_ledger::debit_org_account(
        &db,
        account.id,
        0,
        point_ledger::TransactionType::Use,
        "Nothing",
        None,
    )
    .await
    .is_err());

    assert!(PointTransactions::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transfer_conserves_total_points() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    let product = seed_product(&db, org.id, "Test Product").await;

    point_ledger::record_grant(&db, org.id, 1000, None, "Seed")
        .await
        .unwrap();
    let org_account = point_ledger::get_or_create_org_account(&db, org.id)
        .await
        .unwrap();
    let product_account = point_ledger::get_or_create_product_account(&db, product.id)
        .await
        .unwrap();

    let moved = point_ledger::transfer_to_product(
        &db,
        org_account.id,
        product_account.id,
        400,
        "Bounty funding",
        None,
    )
    .await
    .unwrap();
    assert!(moved);

    let org_after = org_balance(&db, org.id).await;
    let product_after = product_balance(&db, product.id).await;
    assert_eq!(org_after, 600);
    assert_eq!(product_after, 400);
    assert_eq!(org_after + product_after, 1000);

    let transactions = PointTransactions::find().all(&db).await.unwrap();
    // GRANT + USE on the org side, TRANSFER on the product side
    assert_eq!(transactions.len(), 3);
    assert!(transactions
        .iter()
        .any(|tx| tx.transaction_type == "USE" && tx.org_account_id == Some(org_account.id)));
    assert!(transactions.iter().any(|tx| tx.transaction_type == "TRANSFER"
        && tx.product_account_id == Some(product_account.id)));
}

#[tokio::test]
async fn test_transfer_with_insufficient_balance_writes_nothing() {
    let db = setup_test_db().await.unwrap();
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    let product = seed_product(&db, org.id, "Test Product").await;

    point_ledger::record_grant(&db, org.id, 100, None, "Seed")
        .await
        .unwrap();
    let org_account = point_ledger::get_or_create_org_account(&db, org.id)
        .await
        .unwrap();
    let product_account = point_ledger::get_or_create_product_account(&db, product.id)
        .await
        .unwrap();

    let moved = point_ledger::transfer_to_product(
        &db,
        org_account.id,
        product_account.id,
        400,
        "Bounty funding",
        None,
    )
    .await
    .unwrap();
    assert!(!moved);

    assert_eq!(org_balance(&db, org.id).await, 100);
    assert_eq!(product_balance(&db, product.id).await, 0);

    let transactions = PointTransactions::find().all(&db).await.unwrap();
    assert_eq!(transactions.len(), 1, "only the grant row may exist");
}
