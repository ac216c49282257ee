//! Order settlement state machine
//!
//! Checkout freezes an open cart into a sales order (USD side) and/or a
//! point order (points side). Processing drives
//! Pending -> Processing -> Completed | Failed; refunds drive
//! Completed -> Refunded. The funds movement, work item activation and
//! cart completion all commit together or not at all.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    carts, challenges, competitions, point_orders, prelude::*, sales_order_line_items,
    sales_orders,
};
use crate::services::cart::{self, CartError, CartStatus, LineItemKind};
use crate::services::payments::PaymentProcessor;
use crate::services::point_ledger;

/// Order lifecycle states, stored as strings on the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Failed => "Failed",
            OrderStatus::Refunded => "Refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(OrderStatus::Pending),
            "Processing" => Some(OrderStatus::Processing),
            "Completed" => Some(OrderStatus::Completed),
            "Failed" => Some(OrderStatus::Failed),
            "Refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    /// No transitions leave these states except Completed -> Refunded
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Failed | OrderStatus::Refunded
        )
    }
}

/// The orders a checkout produced: at least one side is present
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub sales_order: Option<sales_orders::Model>,
    pub point_order: Option<point_orders::Model>,
}

async fn set_order_status<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    status: OrderStatus,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let order = SalesOrders::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or_else(|| format!("Sales order {} not found", order_id))?;
    let mut active: sales_orders::ActiveModel = order.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;
    Ok(())
}

async fn set_point_order_status<C: ConnectionTrait>(
    conn: &C,
    point_order_id: i32,
    status: OrderStatus,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let order = PointOrders::find_by_id(point_order_id)
        .one(conn)
        .await?
        .ok_or_else(|| format!("Point order {} not found", point_order_id))?;
    let mut active: point_orders::ActiveModel = order.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;
    Ok(())
}

async fn set_cart_status<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    status: CartStatus,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cart = cart::load_cart(conn, cart_id).await?;
    let mut active: carts::ActiveModel = cart.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(conn).await?;
    Ok(())
}

/// Flip purchased work items live: challenges go Active, competitions go
/// Active only out of Draft.
async fn activate_work_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let items = cart::load_items(conn, cart_id).await?;
    for item in items {
        if LineItemKind::from_str(&item.kind) != Some(LineItemKind::Bounty) {
            continue;
        }
        let Some(bounty_id) = item.bounty_id else {
            continue;
        };
        let bounty = Bounties::find_by_id(bounty_id)
            .one(conn)
            .await?
            .ok_or(CartError::BountyNotFound(bounty_id))?;

        if let Some(challenge_id) = bounty.challenge_id {
            if let Some(challenge) = Challenges::find_by_id(challenge_id).one(conn).await? {
                if challenge.status != "Active" {
                    let mut active: challenges::ActiveModel = challenge.into();
                    active.status = Set("Active".to_string());
                    active.updated_at = Set(Utc::now().fixed_offset());
                    active.update(conn).await?;
                    tracing::info!("Challenge {} activated", challenge_id);
                }
            }
        }

        if let Some(competition_id) = bounty.competition_id {
            if let Some(competition) = Competitions::find_by_id(competition_id).one(conn).await? {
                if competition.status == "Draft" {
                    let mut active: competitions::ActiveModel = competition.into();
                    active.status = Set("Active".to_string());
                    active.updated_at = Set(Utc::now().fixed_offset());
                    active.update(conn).await?;
                    tracing::info!("Competition {} activated", competition_id);
                }
            }
        }
    }
    Ok(())
}

/// Reverse activation on refund: Active work items drop back to Draft.
async fn deactivate_work_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let items = cart::load_items(conn, cart_id).await?;
    for item in items {
        if LineItemKind::from_str(&item.kind) != Some(LineItemKind::Bounty) {
            continue;
        }
        let Some(bounty_id) = item.bounty_id else {
            continue;
        };
        let bounty = Bounties::find_by_id(bounty_id)
            .one(conn)
            .await?
            .ok_or(CartError::BountyNotFound(bounty_id))?;

        if let Some(challenge_id) = bounty.challenge_id {
            if let Some(challenge) = Challenges::find_by_id(challenge_id).one(conn).await? {
                if challenge.status == "Active" {
                    let mut active: challenges::ActiveModel = challenge.into();
                    active.status = Set("Draft".to_string());
                    active.updated_at = Set(Utc::now().fixed_offset());
                    active.update(conn).await?;
                    tracing::info!("Challenge {} deactivated", challenge_id);
                }
            }
        }

        if let Some(competition_id) = bounty.competition_id {
            if let Some(competition) = Competitions::find_by_id(competition_id).one(conn).await? {
                if competition.status == "Active" {
                    let mut active: competitions::ActiveModel = competition.into();
                    active.status = Set("Draft".to_string());
                    active.updated_at = Set(Utc::now().fixed_offset());
                    active.update(conn).await?;
                    tracing::info!("Competition {} deactivated", competition_id);
                }
            }
        }
    }
    Ok(())
}

/// Transition an open cart to Checkout: recompute fee and tax, freeze the
/// USD line items onto a Pending sales order and/or create a Pending point
/// order. One order of each kind per cart.
pub async fn start_checkout(
    db: &DatabaseConnection,
    cart_id: i32,
) -> Result<CheckoutOutcome, Box<dyn std::error::Error + Send + Sync>> {
    let cart = cart::load_cart(db, cart_id).await?;
    if CartStatus::from_str(&cart.status) != Some(CartStatus::Open) {
        return Err(CartError::NotOpen {
            cart_id,
            status: cart.status.clone(),
        }
        .into());
    }

    cart::recompute_fees_and_taxes(db, &cart).await?;
    let items = cart::load_items(db, cart_id).await?;
    if items.is_empty() {
        return Err(CartError::Empty(cart_id).into());
    }

    let subtotal = cart::usd_subtotal_cents(&items);
    let points = cart::total_points(&items);
    if subtotal == 0 && points == 0 {
        return Err(CartError::Empty(cart_id).into());
    }

    let fee = items
        .iter()
        .filter(|item| LineItemKind::from_str(&item.kind) == Some(LineItemKind::PlatformFee))
        .map(cart::item_total_usd_cents)
        .sum::<i64>();
    let tax = items
        .iter()
        .filter(|item| LineItemKind::from_str(&item.kind) == Some(LineItemKind::SalesTax))
        .map(cart::item_total_usd_cents)
        .sum::<i64>();

    let existing_order = SalesOrders::find()
        .filter(sales_orders::Column::CartId.eq(cart_id))
        .one(db)
        .await?;
    if existing_order.is_some() {
        return Err(format!("Cart {} already has a sales order", cart_id).into());
    }

    let txn = db.begin().await?;
    let now = Utc::now().fixed_offset();

    let sales_order = if subtotal > 0 {
        let order = sales_orders::ActiveModel {
            cart_id: Set(cart_id),
            order_reference: Set(Uuid::new_v4().to_string()),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            subtotal_cents: Set(subtotal),
            fee_cents: Set(fee),
            tax_cents: Set(tax),
            total_cents: Set(subtotal + fee + tax),
            parent_sales_order_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let order = order.insert(&txn).await?;

        for item in &items {
            if item.unit_usd_cents == 0 {
                continue;
            }
            let frozen = sales_order_line_items::ActiveModel {
                sales_order_id: Set(order.id),
                kind: Set(item.kind.clone()),
                quantity: Set(item.quantity),
                unit_usd_cents: Set(item.unit_usd_cents),
                bounty_id: Set(item.bounty_id),
                related_bid_id: Set(item.related_bid_id),
                created_at: Set(now),
                ..Default::default()
            };
            frozen.insert(&txn).await?;
        }
        Some(order)
    } else {
        None
    };

    let point_order = if points > 0 {
        let org_account = point_ledger::get_or_create_org_account(&txn, cart.organisation_id).await?;
        let product_account =
            point_ledger::get_or_create_product_account(&txn, cart.product_id).await?;
        let order = point_orders::ActiveModel {
            cart_id: Set(cart_id),
            org_account_id: Set(org_account.id),
            product_account_id: Set(product_account.id),
            total_points: Set(points),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            parent_order_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Some(order.insert(&txn).await?)
    } else {
        None
    };

    set_cart_status(&txn, cart_id, CartStatus::Checkout).await?;
    txn.commit().await?;

    tracing::info!(
        "Cart {} checked out: subtotal={} fee={} tax={} points={}",
        cart_id,
        subtotal,
        fee,
        tax,
        points
    );
    Ok(CheckoutOutcome {
        sales_order,
        point_order,
    })
}

/// The atomic funds-movement step. Everything in here commits together:
/// the USD charge, the point transfer, work item activation and cart
/// completion. Ok(false) means nothing was applied.
async fn settle_funds(
    db: &DatabaseConnection,
    payments: &PaymentProcessor,
    order: &sales_orders::Model,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let txn = db.begin().await?;

    let approved = payments
        .charge_usd_cents(&order.order_reference, order.total_cents)
        .await?;
    if !approved {
        txn.rollback().await?;
        return Ok(false);
    }

    let point_order = PointOrders::find()
        .filter(point_orders::Column::CartId.eq(order.cart_id))
        .one(&txn)
        .await?;
    if let Some(point_order) = point_order {
        if OrderStatus::from_str(&point_order.status) == Some(OrderStatus::Pending) {
            let moved = point_ledger::transfer_to_product_within(
                &txn,
                point_order.org_account_id,
                point_order.product_account_id,
                point_order.total_points,
                &format!("Bounty funding for cart {}", order.cart_id),
                Some(order.cart_id),
            )
            .await?;
            if !moved {
                txn.rollback().await?;
                return Ok(false);
            }
            set_point_order_status(&txn, point_order.id, OrderStatus::Completed).await?;
        }
    }

    activate_work_items(&txn, order.cart_id).await?;
    set_cart_status(&txn, order.cart_id, CartStatus::Completed).await?;
    set_order_status(&txn, order.id, OrderStatus::Completed).await?;

    txn.commit().await?;
    Ok(true)
}

/// Drive a Pending order through Processing to Completed or Failed.
///
/// Re-invoking on an order in any other state returns Ok(false) without
/// mutating anything. Infrastructure errors inside the funds step demote
/// the order to Failed rather than leaving it stuck in Processing.
pub async fn process_payment(
    db: &DatabaseConnection,
    payments: &PaymentProcessor,
    sales_order_id: i32,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let order = SalesOrders::find_by_id(sales_order_id)
        .one(db)
        .await?
        .ok_or_else(|| format!("Sales order {} not found", sales_order_id))?;

    if OrderStatus::from_str(&order.status) != Some(OrderStatus::Pending) {
        tracing::info!(
            "Sales order {} is {}, not processing again",
            sales_order_id,
            order.status
        );
        return Ok(false);
    }

    set_order_status(db, sales_order_id, OrderStatus::Processing).await?;

    match settle_funds(db, payments, &order).await {
        Ok(true) => {
            tracing::info!("Sales order {} completed", sales_order_id);
            Ok(true)
        }
        Ok(false) => {
            set_order_status(db, sales_order_id, OrderStatus::Failed).await?;
            tracing::warn!("Sales order {} failed: funds step declined", sales_order_id);
            Ok(false)
        }
        Err(e) => {
            tracing::error!("Sales order {} failed: {}", sales_order_id, e);
            set_order_status(db, sales_order_id, OrderStatus::Failed).await?;
            Ok(false)
        }
    }
}

/// Completed -> Refunded. Reverses the ledger movement, deactivates the
/// purchased work items and refunds the USD charge. Any other starting
/// state is a no-op returning Ok(false).
pub async fn refund(
    db: &DatabaseConnection,
    payments: &PaymentProcessor,
    sales_order_id: i32,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let order = SalesOrders::find_by_id(sales_order_id)
        .one(db)
        .await?
        .ok_or_else(|| format!("Sales order {} not found", sales_order_id))?;

    if OrderStatus::from_str(&order.status) != Some(OrderStatus::Completed) {
        tracing::info!(
            "Sales order {} is {}, refund is only legal from Completed",
            sales_order_id,
            order.status
        );
        return Ok(false);
    }

    let txn = db.begin().await?;

    let approved = payments
        .refund_usd_cents(&order.order_reference, order.total_cents)
        .await?;
    if !approved {
        txn.rollback().await?;
        return Ok(false);
    }

    let point_order = PointOrders::find()
        .filter(point_orders::Column::CartId.eq(order.cart_id))
        .one(&txn)
        .await?;
    if let Some(point_order) = point_order {
        if OrderStatus::from_str(&point_order.status) == Some(OrderStatus::Completed) {
            let reversed = point_ledger::refund_transfer_within(
                &txn,
                point_order.org_account_id,
                point_order.product_account_id,
                point_order.total_points,
                &format!("Refund for cart {}", order.cart_id),
                Some(order.cart_id),
            )
            .await?;
            if !reversed {
                txn.rollback().await?;
                return Ok(false);
            }
            set_point_order_status(&txn, point_order.id, OrderStatus::Refunded).await?;
        }
    }

    deactivate_work_items(&txn, order.cart_id).await?;
    set_order_status(&txn, sales_order_id, OrderStatus::Refunded).await?;

    txn.commit().await?;
    tracing::info!("Sales order {} refunded", sales_order_id);
    Ok(true)
}

/// Complete a Pending point order on a points-only cart: transfer the
/// points, activate the work items and close the cart. Ok(false) when the
/// order is not Pending or the organisation balance is short.
pub async fn complete_point_order(
    db: &DatabaseConnection,
    point_order_id: i32,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let point_order = PointOrders::find_by_id(point_order_id)
        .one(db)
        .await?
        .ok_or_else(|| format!("Point order {} not found", point_order_id))?;

    if OrderStatus::from_str(&point_order.status) != Some(OrderStatus::Pending) {
        tracing::info!(
            "Point order {} is {}, not completing again",
            point_order_id,
            point_order.status
        );
        return Ok(false);
    }

    let txn = db.begin().await?;

    let moved = point_ledger::transfer_to_product_within(
        &txn,
        point_order.org_account_id,
        point_order.product_account_id,
        point_order.total_points,
        &format!("Bounty funding for cart {}", point_order.cart_id),
        Some(point_order.cart_id),
    )
    .await?;
    if !moved {
        txn.rollback().await?;
        return Ok(false);
    }

    set_point_order_status(&txn, point_order_id, OrderStatus::Completed).await?;
    activate_work_items(&txn, point_order.cart_id).await?;

    let sales_order = SalesOrders::find()
        .filter(sales_orders::Column::CartId.eq(point_order.cart_id))
        .one(&txn)
        .await?;
    if sales_order.is_none() {
        set_cart_status(&txn, point_order.cart_id, CartStatus::Completed).await?;
    }

    txn.commit().await?;
    tracing::info!("Point order {} completed", point_order_id);
    Ok(true)
}

/// Refund a Completed point order on a points-only cart. Ok(false) from
/// any other state.
pub async fn refund_point_order(
    db: &DatabaseConnection,
    point_order_id: i32,
) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let point_order = PointOrders::find_by_id(point_order_id)
        .one(db)
        .await?
        .ok_or_else(|| format!("Point order {} not found", point_order_id))?;

    if OrderStatus::from_str(&point_order.status) != Some(OrderStatus::Completed) {
        tracing::info!(
            "Point order {} is {}, refund is only legal from Completed",
            point_order_id,
            point_order.status
        );
        return Ok(false);
    }

    let txn = db.begin().await?;

    let reversed = point_ledger::refund_transfer_within(
        &txn,
        point_order.org_account_id,
        point_order.product_account_id,
        point_order.total_points,
        &format!("Refund for cart {}", point_order.cart_id),
        Some(point_order.cart_id),
    )
    .await?;
    if !reversed {
        txn.rollback().await?;
        return Ok(false);
    }

    set_point_order_status(&txn, point_order_id, OrderStatus::Refunded).await?;

    let sales_order = SalesOrders::find()
        .filter(sales_orders::Column::CartId.eq(point_order.cart_id))
        .one(&txn)
        .await?;
    if sales_order.is_none() {
        deactivate_work_items(&txn, point_order.cart_id).await?;
    }

    txn.commit().await?;
    tracing::info!("Point order {} refunded", point_order_id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Failed,
            OrderStatus::Refunded,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("Cancelled"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
    }
}
