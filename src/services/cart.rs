//! Cart aggregation service
//!
//! A cart collects line items tagged by kind. Bounty funding items must
//! match the bounty's declared reward type and amount exactly; the platform
//! fee and sales tax items are recomputed on every cart mutation so they
//! are never stale.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, Set,
};

use crate::entities::{cart_line_items, carts, prelude::*};
use crate::services::{fee_calculator, sales_tax};

/// Cart lifecycle states, stored as strings on the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartStatus {
    Open,
    Checkout,
    Completed,
    Abandoned,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Open => "Open",
            CartStatus::Checkout => "Checkout",
            CartStatus::Completed => "Completed",
            CartStatus::Abandoned => "Abandoned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(CartStatus::Open),
            "Checkout" => Some(CartStatus::Checkout),
            "Completed" => Some(CartStatus::Completed),
            "Abandoned" => Some(CartStatus::Abandoned),
            _ => None,
        }
    }
}

/// Line item kinds sharing the cart_line_items table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemKind {
    Bounty,
    PlatformFee,
    SalesTax,
    IncreaseAdjustment,
    DecreaseAdjustment,
}

impl LineItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemKind::Bounty => "BOUNTY",
            LineItemKind::PlatformFee => "PLATFORM_FEE",
            LineItemKind::SalesTax => "SALES_TAX",
            LineItemKind::IncreaseAdjustment => "INCREASE_ADJUSTMENT",
            LineItemKind::DecreaseAdjustment => "DECREASE_ADJUSTMENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BOUNTY" => Some(LineItemKind::Bounty),
            "PLATFORM_FEE" => Some(LineItemKind::PlatformFee),
            "SALES_TAX" => Some(LineItemKind::SalesTax),
            "INCREASE_ADJUSTMENT" => Some(LineItemKind::IncreaseAdjustment),
            "DECREASE_ADJUSTMENT" => Some(LineItemKind::DecreaseAdjustment),
            _ => None,
        }
    }

    pub fn is_adjustment(&self) -> bool {
        matches!(
            self,
            LineItemKind::IncreaseAdjustment | LineItemKind::DecreaseAdjustment
        )
    }

    /// Decrease adjustments subtract from the cart total
    pub fn is_decrease(&self) -> bool {
        matches!(self, LineItemKind::DecreaseAdjustment)
    }
}

/// Validation failures surfaced to the caller before anything is written
#[derive(Debug)]
pub enum CartError {
    CartNotFound(i32),
    BountyNotFound(i32),
    NotOpen { cart_id: i32, status: String },
    DuplicateBounty { cart_id: i32, bounty_id: i32 },
    RewardTypeMismatch { expected: String, got: String },
    FundingAmountMismatch { expected: i64, got: i64 },
    NonPositiveAmount(i64),
    BidReferenceRequired,
    BidReferenceNotAllowed,
    NotRemovable(String),
    ItemNotFound { cart_id: i32, item_id: i32 },
    Empty(i32),
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartError::CartNotFound(id) => write!(f, "Cart {} not found", id),
            CartError::BountyNotFound(id) => write!(f, "Bounty {} not found", id),
            CartError::NotOpen { cart_id, status } => {
                write!(f, "Cart {} is {}, expected Open", cart_id, status)
            }
            CartError::DuplicateBounty { cart_id, bounty_id } => {
                write!(f, "Bounty {} is already in cart {}", bounty_id, cart_id)
            }
            CartError::RewardTypeMismatch { expected, got } => {
                write!(
                    f,
                    "Funding type {} does not match bounty reward type {}",
                    got, expected
                )
            }
            CartError::FundingAmountMismatch { expected, got } => {
                write!(
                    f,
                    "Funding amount {} does not match bounty reward amount {}",
                    got, expected
                )
            }
            CartError::NonPositiveAmount(amount) => {
                write!(f, "Line item amount must be positive, got {}", amount)
            }
            CartError::BidReferenceRequired => {
                write!(f, "Adjustment line items require a bid reference")
            }
            CartError::BidReferenceNotAllowed => {
                write!(f, "Only adjustment line items may carry a bid reference")
            }
            CartError::NotRemovable(kind) => {
                write!(f, "{} line items are managed and cannot be removed", kind)
            }
            CartError::ItemNotFound { cart_id, item_id } => {
                write!(f, "Line item {} not found in cart {}", item_id, cart_id)
            }
            CartError::Empty(id) => write!(f, "Cart {} has no line items", id),
        }
    }
}

impl std::error::Error for CartError {}

/// Only adjustment items may carry a bid reference; adjustment items must.
pub fn validate_bid_reference(kind: LineItemKind, has_bid: bool) -> Result<(), CartError> {
    if kind.is_adjustment() && !has_bid {
        return Err(CartError::BidReferenceRequired);
    }
    if !kind.is_adjustment() && has_bid {
        return Err(CartError::BidReferenceNotAllowed);
    }
    Ok(())
}

pub async fn create_cart(
    db: &DatabaseConnection,
    person_id: i32,
    organisation_id: i32,
    product_id: i32,
    country: &str,
) -> Result<carts::Model, Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now().fixed_offset();
    let cart = carts::ActiveModel {
        person_id: Set(person_id),
        organisation_id: Set(organisation_id),
        product_id: Set(product_id),
        country: Set(country.to_string()),
        status: Set(CartStatus::Open.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let cart = cart.insert(db).await?;
    tracing::debug!("Created cart {} for person {}", cart.id, person_id);
    Ok(cart)
}

pub async fn load_cart<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<carts::Model, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Carts::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or(CartError::CartNotFound(cart_id))?)
}

pub async fn load_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
) -> Result<Vec<cart_line_items::Model>, Box<dyn std::error::Error + Send + Sync>> {
    Ok(CartLineItems::find()
        .filter(cart_line_items::Column::CartId.eq(cart_id))
        .all(conn)
        .await?)
}

fn item_kind(item: &cart_line_items::Model) -> Option<LineItemKind> {
    LineItemKind::from_str(&item.kind)
}

pub fn item_total_usd_cents(item: &cart_line_items::Model) -> i64 {
    item.unit_usd_cents * item.quantity as i64
}

/// Sum of the USD bounty funding items only (the taxable base)
pub fn usd_subtotal_cents(items: &[cart_line_items::Model]) -> i64 {
    items
        .iter()
        .filter(|item| item_kind(item) == Some(LineItemKind::Bounty))
        .map(item_total_usd_cents)
        .sum()
}

/// Sum of points across bounty funding items
pub fn total_points(items: &[cart_line_items::Model]) -> i64 {
    items
        .iter()
        .filter(|item| item_kind(item) == Some(LineItemKind::Bounty))
        .map(|item| item.unit_points * item.quantity as i64)
        .sum()
}

/// USD total: every non-decrease item adds, decrease adjustments subtract
pub fn total_amount_cents(items: &[cart_line_items::Model]) -> i64 {
    items
        .iter()
        .map(|item| match item_kind(item) {
            Some(kind) if kind.is_decrease() => -item_total_usd_cents(item),
            _ => item_total_usd_cents(item),
        })
        .sum()
}

fn ensure_open(cart: &carts::Model) -> Result<(), CartError> {
    if CartStatus::from_str(&cart.status) != Some(CartStatus::Open) {
        return Err(CartError::NotOpen {
            cart_id: cart.id,
            status: cart.status.clone(),
        });
    }
    Ok(())
}

/// Add a bounty funding item to an open cart.
///
/// The funding must match the bounty's declared reward exactly, both in
/// type (USD cents vs points) and amount; a mismatch is a validation
/// failure, never a silent correction.
pub async fn add_bounty_item(
    db: &DatabaseConnection,
    cart_id: i32,
    bounty_id: i32,
    funding_type: &str,
    funding_amount: i64,
) -> Result<cart_line_items::Model, Box<dyn std::error::Error + Send + Sync>> {
    let cart = load_cart(db, cart_id).await?;
    ensure_open(&cart)?;

    let bounty = Bounties::find_by_id(bounty_id)
        .one(db)
        .await?
        .ok_or(CartError::BountyNotFound(bounty_id))?;

    if funding_type != bounty.reward_type {
        return Err(CartError::RewardTypeMismatch {
            expected: bounty.reward_type.clone(),
            got: funding_type.to_string(),
        }
        .into());
    }
    if funding_amount <= 0 {
        return Err(CartError::NonPositiveAmount(funding_amount).into());
    }
    if funding_amount != bounty.reward_amount {
        return Err(CartError::FundingAmountMismatch {
            expected: bounty.reward_amount,
            got: funding_amount,
        }
        .into());
    }

    let duplicate = CartLineItems::find()
        .filter(cart_line_items::Column::CartId.eq(cart_id))
        .filter(cart_line_items::Column::BountyId.eq(bounty_id))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(CartError::DuplicateBounty { cart_id, bounty_id }.into());
    }

    let (unit_usd_cents, unit_points) = if bounty.reward_type == "USD" {
        (funding_amount, 0)
    } else {
        (0, funding_amount)
    };

    let item = cart_line_items::ActiveModel {
        cart_id: Set(cart_id),
        kind: Set(LineItemKind::Bounty.as_str().to_string()),
        quantity: Set(1),
        unit_usd_cents: Set(unit_usd_cents),
        unit_points: Set(unit_points),
        bounty_id: Set(Some(bounty_id)),
        related_bid_id: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    let item = item.insert(db).await?;

    recompute_fees_and_taxes(db, &cart).await?;

    tracing::debug!(
        "Added bounty {} to cart {} ({} {})",
        bounty_id,
        cart_id,
        funding_amount,
        bounty.reward_type
    );
    Ok(item)
}

/// Insert an adjustment line item; only the adjustment flow calls this.
pub async fn add_adjustment_item<C: ConnectionTrait>(
    conn: &C,
    cart_id: i32,
    kind: LineItemKind,
    amount_cents: i64,
    bounty_id: i32,
    related_bid_id: i32,
) -> Result<cart_line_items::Model, Box<dyn std::error::Error + Send + Sync>> {
    validate_bid_reference(kind, true)?;
    if amount_cents <= 0 {
        return Err(CartError::NonPositiveAmount(amount_cents).into());
    }

    let item = cart_line_items::ActiveModel {
        cart_id: Set(cart_id),
        kind: Set(kind.as_str().to_string()),
        quantity: Set(1),
        unit_usd_cents: Set(amount_cents),
        unit_points: Set(0),
        bounty_id: Set(Some(bounty_id)),
        related_bid_id: Set(Some(related_bid_id)),
        created_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    Ok(item.insert(conn).await?)
}

/// Remove a bounty funding item from an open cart and recompute fee/tax.
/// Fee and tax items are managed by the calculators and cannot be removed
/// directly.
pub async fn remove_item(
    db: &DatabaseConnection,
    cart_id: i32,
    item_id: i32,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cart = load_cart(db, cart_id).await?;
    ensure_open(&cart)?;

    let item = CartLineItems::find_by_id(item_id)
        .one(db)
        .await?
        .filter(|item| item.cart_id == cart_id)
        .ok_or(CartError::ItemNotFound { cart_id, item_id })?;

    if item_kind(&item) != Some(LineItemKind::Bounty) {
        return Err(CartError::NotRemovable(item.kind.clone()).into());
    }

    item.delete(db).await?;
    recompute_fees_and_taxes(db, &cart).await?;

    tracing::debug!("Removed line item {} from cart {}", item_id, cart_id);
    Ok(())
}

/// Re-derive the platform fee and sales tax items from current contents.
/// Called after every cart mutation; idempotent.
pub async fn recompute_fees_and_taxes<C: ConnectionTrait>(
    conn: &C,
    cart: &carts::Model,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    fee_calculator::apply_platform_fee(conn, cart).await?;
    sales_tax::apply_sales_tax(conn, cart).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(kind: LineItemKind, quantity: i32, unit_usd_cents: i64, unit_points: i64) -> cart_line_items::Model {
        cart_line_items::Model {
            id: 0,
            cart_id: 1,
            kind: kind.as_str().to_string(),
            quantity,
            unit_usd_cents,
            unit_points,
            bounty_id: None,
            related_bid_id: None,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn test_usd_subtotal_counts_bounty_items_only() {
        let items = vec![
            item(LineItemKind::Bounty, 1, 10000, 0),
            item(LineItemKind::Bounty, 2, 2500, 0),
            item(LineItemKind::PlatformFee, 1, 1500, 0),
            item(LineItemKind::SalesTax, 1, 300, 0),
        ];
        assert_eq!(usd_subtotal_cents(&items), 15000);
    }

    #[test]
    fn test_total_points_ignores_usd_items() {
        let items = vec![
            item(LineItemKind::Bounty, 1, 0, 400),
            item(LineItemKind::Bounty, 1, 10000, 0),
        ];
        assert_eq!(total_points(&items), 400);
    }

    #[test]
    fn test_total_amount_subtracts_decrease_adjustments() {
        let items = vec![
            item(LineItemKind::Bounty, 1, 10000, 0),
            item(LineItemKind::PlatformFee, 1, 1000, 0),
            item(LineItemKind::IncreaseAdjustment, 1, 2000, 0),
            item(LineItemKind::DecreaseAdjustment, 1, 500, 0),
        ];
        assert_eq!(total_amount_cents(&items), 12500);
    }

    #[test]
    fn test_bid_reference_rules() {
        assert!(validate_bid_reference(LineItemKind::IncreaseAdjustment, true).is_ok());
        assert!(validate_bid_reference(LineItemKind::DecreaseAdjustment, true).is_ok());
        assert!(matches!(
            validate_bid_reference(LineItemKind::IncreaseAdjustment, false),
            Err(CartError::BidReferenceRequired)
        ));
        assert!(matches!(
            validate_bid_reference(LineItemKind::Bounty, true),
            Err(CartError::BidReferenceNotAllowed)
        ));
        assert!(validate_bid_reference(LineItemKind::Bounty, false).is_ok());
    }

    #[test]
    fn test_status_and_kind_parsing() {
        assert_eq!(CartStatus::from_str("Open"), Some(CartStatus::Open));
        assert_eq!(CartStatus::from_str("open"), None);
        assert_eq!(
            LineItemKind::from_str("DECREASE_ADJUSTMENT"),
            Some(LineItemKind::DecreaseAdjustment)
        );
        assert_eq!(LineItemKind::from_str("FEE"), None);
    }
}
