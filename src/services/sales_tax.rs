//! Sales tax calculator
//!
//! Rate selection: an organisation-specific flat rate wins when configured;
//! otherwise EU buyers get the fixed EU rate and everyone else pays
//! nothing. The tax is materialised as a single SALES_TAX line item over
//! the taxable amount (USD subtotal plus platform fee), maintained the same
//! way the fee item is.

use std::collections::HashSet;

use chrono::Utc;
use lazy_static::lazy_static;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, Set,
};

use crate::entities::{cart_line_items, carts, prelude::*};
use crate::services::cart::{self, LineItemKind};

/// Fixed rate applied to EU buyers without an organisation-specific rate
pub const EU_SALES_TAX_RATE_BPS: i32 = 2000;

lazy_static! {
    static ref EU_COUNTRIES: HashSet<&'static str> = [
        "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT",
        "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
    ]
    .iter()
    .copied()
    .collect();
}

/// Select the applicable rate in basis points
pub fn sales_tax_rate_bps(org_rate_bps: Option<i32>, country: &str) -> i32 {
    if let Some(rate) = org_rate_bps {
        return rate;
    }
    if EU_COUNTRIES.contains(country) {
        return EU_SALES_TAX_RATE_BPS;
    }
    0
}

/// taxable * rate_bps / 10000, truncating toward zero
pub fn sales_tax_cents(taxable_cents: i64, rate_bps: i32) -> i64 {
    taxable_cents * rate_bps as i64 / 10_000
}

/// Update-or-create the cart's SALES_TAX line item; deletes it when the tax
/// comes out zero. Idempotent. Returns the tax in cents.
pub async fn apply_sales_tax<C: ConnectionTrait>(
    conn: &C,
    cart: &carts::Model,
) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
    let organisation = Organisations::find_by_id(cart.organisation_id)
        .one(conn)
        .await?
        .ok_or_else(|| format!("Organisation {} not found", cart.organisation_id))?;

    let items = cart::load_items(conn, cart.id).await?;
    let subtotal = cart::usd_subtotal_cents(&items);
    let fee = items
        .iter()
        .filter(|item| LineItemKind::from_str(&item.kind) == Some(LineItemKind::PlatformFee))
        .map(cart::item_total_usd_cents)
        .sum::<i64>();

    let rate_bps = sales_tax_rate_bps(organisation.tax_rate_bps, &cart.country);
    let tax = sales_tax_cents(subtotal + fee, rate_bps);

    let existing = CartLineItems::find()
        .filter(cart_line_items::Column::CartId.eq(cart.id))
        .filter(cart_line_items::Column::Kind.eq(LineItemKind::SalesTax.as_str()))
        .one(conn)
        .await?;

    if tax <= 0 {
        if let Some(item) = existing {
            item.delete(conn).await?;
        }
        return Ok(0);
    }

    match existing {
        Some(item) => {
            if item.unit_usd_cents != tax {
                let mut active: cart_line_items::ActiveModel = item.into();
                active.unit_usd_cents = Set(tax);
                active.update(conn).await?;
            }
        }
        None => {
            let item = cart_line_items::ActiveModel {
                cart_id: Set(cart.id),
                kind: Set(LineItemKind::SalesTax.as_str().to_string()),
                quantity: Set(1),
                unit_usd_cents: Set(tax),
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
        "Sales tax for cart {}: {} cents ({} bps on {})",
        cart.id,
        tax,
        rate_bps,
        subtotal + fee
    );
    Ok(tax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_flat_rate_wins() {
        assert_eq!(sales_tax_rate_bps(Some(850), "DE"), 850);
        assert_eq!(sales_tax_rate_bps(Some(0), "DE"), 0);
    }

    #[test]
    fn test_eu_buyers_get_fixed_rate() {
        assert_eq!(sales_tax_rate_bps(None, "DE"), EU_SALES_TAX_RATE_BPS);
        assert_eq!(sales_tax_rate_bps(None, "NL"), EU_SALES_TAX_RATE_BPS);
        assert_eq!(sales_tax_rate_bps(None, "SE"), EU_SALES_TAX_RATE_BPS);
    }

    #[test]
    fn test_non_eu_buyers_pay_nothing() {
        assert_eq!(sales_tax_rate_bps(None, "US"), 0);
        assert_eq!(sales_tax_rate_bps(None, "GB"), 0);
        assert_eq!(sales_tax_rate_bps(None, "JP"), 0);
    }

    #[test]
    fn test_tax_is_truncated_toward_zero() {
        assert_eq!(sales_tax_cents(11000, 2000), 2200);
        assert_eq!(sales_tax_cents(333, 2000), 66);
        assert_eq!(sales_tax_cents(4, 2000), 0);
    }
}
