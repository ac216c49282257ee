//! SeaORM Entity for sales orders
//!
//! The settled USD-side record of a checked-out cart, 1:1 per cart.
//! Invariant: total_cents = subtotal_cents + fee_cents + tax_cents.
//! Adjustment orders link to the settled order via parent_sales_order_id;
//! the parent is never mutated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cart_id: i32,
    /// Public identifier handed to the payment processor
    pub order_reference: String,
    /// Pending, Processing, Completed, Failed, Refunded
    pub status: String,
    pub subtotal_cents: i64,
    pub fee_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub parent_sales_order_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
