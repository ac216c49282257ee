//! Platform fee calculator
//!
//! The fee percentage is time-versioned: the active configuration is the
//! row with the latest applies_from <= the given instant, and no
//! configuration means no fee. The fee is materialised as a single
//! PLATFORM_FEE line item on the cart, updated or deleted whenever cart
//! contents change.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, Order, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{cart_line_items, carts, platform_fee_configurations, prelude::*};
use crate::services::cart::{self, LineItemKind};

/// The configuration in force at `as_of`, if any
pub async fn active_fee_configuration<C: ConnectionTrait>(
    conn: &C,
    as_of: chrono::DateTime<chrono::FixedOffset>,
) -> Result<Option<platform_fee_configurations::Model>, Box<dyn std::error::Error + Send + Sync>> {
    Ok(PlatformFeeConfigurations::find()
        .filter(platform_fee_configurations::Column::AppliesFrom.lte(as_of))
        .order_by(platform_fee_configurations::Column::AppliesFrom, Order::Desc)
        .one(conn)
        .await?)
}

/// floor(subtotal * percentage / 100), truncating toward zero
pub fn platform_fee_cents(subtotal_cents: i64, percentage: i32) -> i64 {
    subtotal_cents * percentage as i64 / 100
}

/// Update-or-create the cart's PLATFORM_FEE line item from its current USD
/// subtotal; deletes the item when the fee comes out zero. Idempotent.
///
/// Returns the fee in cents.
pub async fn apply_platform_fee<C: ConnectionTrait>(
    conn: &C,
    cart: &carts::Model,
) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
    let items = cart::load_items(conn, cart.id).await?;
    let subtotal = cart::usd_subtotal_cents(&items);

    let percentage = active_fee_configuration(conn, Utc::now().fixed_offset())
        .await?
        .map(|config| config.percentage)
        .unwrap_or(0);

    let fee = platform_fee_cents(subtotal, percentage);

    let existing = CartLineItems::find()
        .filter(cart_line_items::Column::CartId.eq(cart.id))
        .filter(cart_line_items::Column::Kind.eq(LineItemKind::PlatformFee.as_str()))
        .one(conn)
        .await?;

    if fee <= 0 {
        if let Some(item) = existing {
            item.delete(conn).await?;
        }
        return Ok(0);
    }

    match existing {
        Some(item) => {
            if item.unit_usd_cents != fee {
                let mut active: cart_line_items::ActiveModel = item.into();
                active.unit_usd_cents = Set(fee);
                active.update(conn).await?;
            }
        }
        None => {
            let item = cart_line_items::ActiveModel {
                cart_id: Set(cart.id),
                kind: Set(LineItemKind::PlatformFee.as_str().to_string()),
                quantity: Set(1),
                unit_usd_cents: Set(fee),
                unit_points: Set(0),
                bounty_id: Set(None),
                related_bid_id: Set(None),
                created_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            };
            item.insert(conn).await?;
        }
    }

    tracing::debug!(
        "Platform fee for cart {}: {} cents ({}% of {})",
        cart.id,
        fee,
        percentage,
        subtotal
    );
    Ok(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_is_truncated_toward_zero() {
        assert_eq!(platform_fee_cents(10000, 10), 1000);
        assert_eq!(platform_fee_cents(9999, 10), 999);
        assert_eq!(platform_fee_cents(50, 3), 1);
        assert_eq!(platform_fee_cents(33, 3), 0);
    }

    #[test]
    fn test_zero_percentage_means_no_fee() {
        assert_eq!(platform_fee_cents(10000, 0), 0);
    }

    #[test]
    fn test_full_percentage() {
        assert_eq!(platform_fee_cents(12345, 100), 12345);
    }
}
