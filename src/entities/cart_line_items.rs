//! SeaORM Entity for cart line items
//!
//! One table for every item kind, tagged by `kind` (BOUNTY, PLATFORM_FEE,
//! SALES_TAX, INCREASE_ADJUSTMENT, DECREASE_ADJUSTMENT). Only adjustment
//! items carry a bid reference.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_line_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cart_id: i32,
    pub kind: String,
    pub quantity: i32,
    pub unit_usd_cents: i64,
    pub unit_points: i64,
    pub bounty_id: Option<i32>,
    pub related_bid_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
