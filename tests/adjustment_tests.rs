mod common;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use commerce_backend::entities::{
    cart_line_items, organisation_wallet_transactions, prelude::*, sales_orders,
};
use commerce_backend::services::payments::PaymentProcessor;
use commerce_backend::services::{adjustment, cart, settlement};

use crate::common::{
    seed_bid, seed_bounty, seed_organisation, seed_person, seed_product, setup_test_db,
};

struct Settled {
    order: commerce_backend::entities::sales_orders::Model,
    org_id: i32,
    bounty_id: i32,
    person_id: i32,
}

/// Checkout and settle a 10000-cent USD bounty with no fee configuration.
async fn settle_usd_bounty(db: &sea_orm::DatabaseConnection) -> Settled {
    let payments = PaymentProcessor::new();
    let person = seed_person(db, "Bidder Buyer").await;
    let org = seed_organisation(db, "Test Organisation", "US").await;
    let product = seed_product(db, org.id, "Test Product").await;
    let bounty = seed_bounty(db, product.id, None, "USD", 10000).await;

    let cart_row = cart::create_cart(db, person.id, org.id, product.id, "US")
        .await
        .unwrap();
    cart::add_bounty_item(db, cart_row.id, bounty.id, "USD", 10000)
        .await
        .unwrap();
    let order = settlement::start_checkout(db, cart_row.id)
        .await
        .unwrap()
        .sales_order
        .unwrap();
    assert!(settlement::process_payment(db, &payments, order.id)
        .await
        .unwrap());

    let order = SalesOrders::find_by_id(order.id).one(db).await.unwrap().unwrap();
    Settled {
        order,
        org_id: org.id,
        bounty_id: bounty.id,
        person_id: person.id,
    }
}

#[tokio::test]
async fn test_increase_adjustment_spawns_charged_child_order() {
    let db = setup_test_db().await.unwrap();
    let payments = PaymentProcessor::new();
    let settled = settle_usd_bounty(&db).await;

    let bid = seed_bid(&db, settled.bounty_id, settled.person_id, 12000).await;
    let bid = adjustment::accept_bid(&db, &payments, bid.id).await.unwrap();
    assert_eq!(bid.status, "Accepted");

    let bounty = Bounties::find_by_id(settled.bounty_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bounty.final_reward_amount, Some(12000));
    assert_eq!(bounty.status, "Claimed");

    let child = SalesOrders::find()
        .filter(sales_orders::Column::ParentSalesOrderId.eq(settled.order.id))
        .one(&db)
        .await
        .unwrap()
        .expect("adjustment child order exists");
    assert_eq!(child.subtotal_cents, 2000);
    assert_eq!(child.total_cents, 2000);
    assert_eq!(child.status, "Completed");

    let child_items = CartLineItems::find()
        .filter(cart_line_items::Column::CartId.eq(child.cart_id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(child_items.len(), 1);
    assert_eq!(child_items[0].kind, "INCREASE_ADJUSTMENT");
    assert_eq!(child_items[0].related_bid_id, Some(bid.id));

    // The settled parent is an immutable audit record
    let parent = SalesOrders::find_by_id(settled.order.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(parent.status, "Completed");
    assert_eq!(parent.total_cents, settled.order.total_cents);
}

#[tokio::test]
async fn test_decrease_adjustment_credits_the_organisation_wallet() {
    let db = setup_test_db().await.unwrap();
    let payments = PaymentProcessor::new();
    let settled = settle_usd_bounty(&db).await;

    let bid = seed_bid(&db, settled.bounty_id, settled.person_id, 7000).await;
    adjustment::accept_bid(&db, &payments, bid.id).await.unwrap();

    let child = SalesOrders::find()
        .filter(sales_orders::Column::ParentSalesOrderId.eq(settled.order.id))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(child.subtotal_cents, 3000);
    assert_eq!(child.status, "Completed");

    let child_items = CartLineItems::find()
        .filter(cart_line_items::Column::CartId.eq(child.cart_id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(child_items[0].kind, "DECREASE_ADJUSTMENT");

    // Wallet credit, not a point refund
    let wallet = OrganisationWallets::find()
        .filter(
            commerce_backend::entities::organisation_wallets::Column::OrganisationId
                .eq(settled.org_id),
        )
        .one(&db)
        .await
        .unwrap()
        .expect("wallet created");
    assert_eq!(wallet.balance_usd_cents, 3000);

    let wallet_txs = OrganisationWalletTransactions::find()
        .filter(organisation_wallet_transactions::Column::WalletId.eq(wallet.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(wallet_txs.len(), 1);
    assert_eq!(wallet_txs[0].transaction_type, "CREDIT");
    assert_eq!(wallet_txs[0].amount_cents, 3000);
    assert_eq!(wallet_txs[0].related_sales_order_id, Some(child.id));

    assert!(PointTransactions::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bid_matching_the_reward_creates_no_adjustment() {
    let db = setup_test_db().await.unwrap();
    let payments = PaymentProcessor::new();
    let settled = settle_usd_bounty(&db).await;

    let bid = seed_bid(&db, settled.bounty_id, settled.person_id, 10000).await;
    adjustment::accept_bid(&db, &payments, bid.id).await.unwrap();

    let children = SalesOrders::find()
        .filter(sales_orders::Column::ParentSalesOrderId.eq(settled.order.id))
        .all(&db)
        .await
        .unwrap();
    assert!(children.is_empty());
}

#[tokio::test]
async fn test_only_pending_bids_can_be_accepted() {
    let db = setup_test_db().await.unwrap();
    let payments = PaymentProcessor::new();
    let settled = settle_usd_bounty(&db).await;

    let bid = seed_bid(&db, settled.bounty_id, settled.person_id, 12000).await;
    adjustment::accept_bid(&db, &payments, bid.id).await.unwrap();

    // Accepted once; accepting again is a validation error
    assert!(adjustment::accept_bid(&db, &payments, bid.id).await.is_err());
}

#[tokio::test]
async fn test_points_bounty_bid_skips_the_adjustment_flow() {
    let db = setup_test_db().await.unwrap();
    let payments = PaymentProcessor::new();
    let person = seed_person(&db, "Points Bidder").await;
    let org = seed_organisation(&db, "Test Organisation", "US").await;
    let product = seed_product(&db, org.id, "Test Product").await;
    let bounty = seed_bounty(&db, product.id, None, "Points", 400).await;

    let bid = seed_bid(&db, bounty.id, person.id, 500).await;
    let bid = adjustment::accept_bid(&db, &payments, bid.id).await.unwrap();
    assert_eq!(bid.status, "Accepted");

    let bounty = Bounties::find_by_id(bounty.id).one(&db).await.unwrap().unwrap();
    assert_eq!(bounty.final_reward_amount, Some(500));

    assert!(SalesOrders::find().all(&db).await.unwrap().is_empty());
}
