//! Bid-driven adjustment flow
//!
//! Accepting a bid fixes the bounty's final reward. When the bounty was
//! already settled through a USD sales order, the difference between the
//! bid and the declared reward spawns a child cart and child sales order
//! linked via parent_sales_order_id. Increases are charged like any new
//! order; decreases credit the organisation wallet. The settled parent
//! order is never touched.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    bounties, bounty_bids, carts, prelude::*, sales_order_line_items, sales_orders,
};
use crate::services::cart::{self, CartStatus, LineItemKind};
use crate::services::payments::PaymentProcessor;
use crate::services::settlement::{self, OrderStatus};
use crate::services::wallet;

/// Bid lifecycle states, stored as strings on the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "Pending",
            BidStatus::Accepted => "Accepted",
            BidStatus::Rejected => "Rejected",
            BidStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BidStatus::Pending),
            "Accepted" => Some(BidStatus::Accepted),
            "Rejected" => Some(BidStatus::Rejected),
            "Withdrawn" => Some(BidStatus::Withdrawn),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum AdjustmentError {
    BidNotFound(i32),
    BidNotPending { bid_id: i32, status: String },
}

impl std::fmt::Display for AdjustmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentError::BidNotFound(id) => write!(f, "Bid {} not found", id),
            AdjustmentError::BidNotPending { bid_id, status } => {
                write!(f, "Bid {} is {}, only pending bids can be accepted", bid_id, status)
            }
        }
    }
}

impl std::error::Error for AdjustmentError {}

/// The settled order that originally funded this bounty, if any: oldest
/// Completed sales order carrying a BOUNTY line item for it, excluding
/// adjustment children.
async fn initial_completed_order(
    db: &DatabaseConnection,
    bounty_id: i32,
) -> Result<Option<sales_orders::Model>, Box<dyn std::error::Error + Send + Sync>> {
    let line_items = SalesOrderLineItems::find()
        .filter(sales_order_line_items::Column::BountyId.eq(bounty_id))
        .filter(sales_order_line_items::Column::Kind.eq(LineItemKind::Bounty.as_str()))
        .all(db)
        .await?;

    let order_ids: Vec<i32> = line_items
        .iter()
        .map(|item| item.sales_order_id)
        .collect();
    if order_ids.is_empty() {
        return Ok(None);
    }

    Ok(SalesOrders::find()
        .filter(sales_orders::Column::Id.is_in(order_ids))
        .filter(sales_orders::Column::ParentSalesOrderId.is_null())
        .filter(sales_orders::Column::Status.eq(OrderStatus::Completed.as_str()))
        .order_by(sales_orders::Column::CreatedAt, Order::Asc)
        .one(db)
        .await?)
}

/// Accept a pending bid. Sets the bounty's final reward to the bid amount
/// and, when the bounty was settled in USD, spawns the matching adjustment
/// order for the difference.
pub async fn accept_bid(
    db: &DatabaseConnection,
    payments: &PaymentProcessor,
    bid_id: i32,
) -> Result<bounty_bids::Model, Box<dyn std::error::Error + Send + Sync>> {
    let bid = BountyBids::find_by_id(bid_id)
        .one(db)
        .await?
        .ok_or(AdjustmentError::BidNotFound(bid_id))?;

    if BidStatus::from_str(&bid.status) != Some(BidStatus::Pending) {
        return Err(AdjustmentError::BidNotPending {
            bid_id,
            status: bid.status.clone(),
        }
        .into());
    }

    let bounty = Bounties::find_by_id(bid.bounty_id)
        .one(db)
        .await?
        .ok_or_else(|| format!("Bounty {} not found", bid.bounty_id))?;

    let now = Utc::now().fixed_offset();
    let txn = db.begin().await?;

    let mut bid_active: bounty_bids::ActiveModel = bid.clone().into();
    bid_active.status = Set(BidStatus::Accepted.as_str().to_string());
    bid_active.updated_at = Set(now);
    let bid = bid_active.update(&txn).await?;

    let mut bounty_active: bounties::ActiveModel = bounty.clone().into();
    bounty_active.final_reward_amount = Set(Some(bid.amount));
    bounty_active.status = Set("Claimed".to_string());
    bounty_active.updated_at = Set(now);
    bounty_active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!("Bid {} accepted for bounty {}", bid_id, bounty.id);

    if bounty.reward_type == "USD" {
        if let Some(original) = initial_completed_order(db, bounty.id).await? {
            let delta = bid.amount - bounty.reward_amount;
            if delta > 0 {
                create_increase_adjustment(db, payments, &original, &bounty, bid.id, delta)
                    .await?;
            } else if delta < 0 {
                create_decrease_adjustment(db, &original, &bounty, bid.id, -delta).await?;
            }
        }
    }

    Ok(bid)
}

async fn original_cart(
    db: &DatabaseConnection,
    order: &sales_orders::Model,
) -> Result<carts::Model, Box<dyn std::error::Error + Send + Sync>> {
    cart::load_cart(db, order.cart_id).await
}

/// The bid raised the price: charge the difference through a child order.
async fn create_increase_adjustment(
    db: &DatabaseConnection,
    payments: &PaymentProcessor,
    original: &sales_orders::Model,
    bounty: &bounties::Model,
    bid_id: i32,
    delta_cents: i64,
) -> Result<sales_orders::Model, Box<dyn std::error::Error + Send + Sync>> {
    let parent_cart = original_cart(db, original).await?;
    let now = Utc::now().fixed_offset();

    let txn = db.begin().await?;

    let child_cart = carts::ActiveModel {
        person_id: Set(parent_cart.person_id),
        organisation_id: Set(parent_cart.organisation_id),
        product_id: Set(parent_cart.product_id),
        country: Set(parent_cart.country.clone()),
        status: Set(CartStatus::Checkout.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let child_cart = child_cart.insert(&txn).await?;

    cart::add_adjustment_item(
        &txn,
        child_cart.id,
        LineItemKind::IncreaseAdjustment,
        delta_cents,
        bounty.id,
        bid_id,
    )
    .await?;

    let child_order = sales_orders::ActiveModel {
        cart_id: Set(child_cart.id),
        order_reference: Set(Uuid::new_v4().to_string()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        subtotal_cents: Set(delta_cents),
        fee_cents: Set(0),
        tax_cents: Set(0),
        total_cents: Set(delta_cents),
        parent_sales_order_id: Set(Some(original.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let child_order = child_order.insert(&txn).await?;

    let frozen = sales_order_line_items::ActiveModel {
        sales_order_id: Set(child_order.id),
        kind: Set(LineItemKind::IncreaseAdjustment.as_str().to_string()),
        quantity: Set(1),
        unit_usd_cents: Set(delta_cents),
        bounty_id: Set(Some(bounty.id)),
        related_bid_id: Set(Some(bid_id)),
        created_at: Set(now),
        ..Default::default()
    };
    frozen.insert(&txn).await?;

    txn.commit().await?;

    settlement::process_payment(db, payments, child_order.id).await?;

    tracing::info!(
        "Increase adjustment of {} cents created for bounty {} (parent order {})",
        delta_cents,
        bounty.id,
        original.id
    );
    Ok(child_order)
}

/// The bid lowered the price: record a settled child order and credit the
/// organisation wallet, not the point ledger.
async fn create_decrease_adjustment(
    db: &DatabaseConnection,
    original: &sales_orders::Model,
    bounty: &bounties::Model,
    bid_id: i32,
    delta_cents: i64,
) -> Result<sales_orders::Model, Box<dyn std::error::Error + Send + Sync>> {
    let parent_cart = original_cart(db, original).await?;
    let now = Utc::now().fixed_offset();

    let txn = db.begin().await?;

    let child_cart = carts::ActiveModel {
        person_id: Set(parent_cart.person_id),
        organisation_id: Set(parent_cart.organisation_id),
        product_id: Set(parent_cart.product_id),
        country: Set(parent_cart.country.clone()),
        status: Set(CartStatus::Completed.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let child_cart = child_cart.insert(&txn).await?;

    cart::add_adjustment_item(
        &txn,
        child_cart.id,
        LineItemKind::DecreaseAdjustment,
        delta_cents,
        bounty.id,
        bid_id,
    )
    .await?;

    let child_order = sales_orders::ActiveModel {
        cart_id: Set(child_cart.id),
        order_reference: Set(Uuid::new_v4().to_string()),
        status: Set(OrderStatus::Completed.as_str().to_string()),
        subtotal_cents: Set(delta_cents),
        fee_cents: Set(0),
        tax_cents: Set(0),
        total_cents: Set(delta_cents),
        parent_sales_order_id: Set(Some(original.id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let child_order = child_order.insert(&txn).await?;

    let frozen = sales_order_line_items::ActiveModel {
        sales_order_id: Set(child_order.id),
        kind: Set(LineItemKind::DecreaseAdjustment.as_str().to_string()),
        quantity: Set(1),
        unit_usd_cents: Set(delta_cents),
        bounty_id: Set(Some(bounty.id)),
        related_bid_id: Set(Some(bid_id)),
        created_at: Set(now),
        ..Default::default()
    };
    frozen.insert(&txn).await?;

    let wallet_row = wallet::get_or_create_wallet(&txn, parent_cart.organisation_id).await?;
    wallet::add_funds(
        &txn,
        wallet_row.id,
        delta_cents,
        &format!("Refund for bounty adjustment: {}", bounty.title),
        Some(child_order.id),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        "Decrease adjustment of {} cents credited to organisation {} (parent order {})",
        delta_cents,
        parent_cart.organisation_id,
        original.id
    );
    Ok(child_order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_status_round_trip() {
        for status in [
            BidStatus::Pending,
            BidStatus::Accepted,
            BidStatus::Rejected,
            BidStatus::Withdrawn,
        ] {
            assert_eq!(BidStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(BidStatus::from_str("Expired"), None);
    }
}
