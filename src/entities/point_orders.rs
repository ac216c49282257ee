//! SeaORM Entity for point orders
//!
//! The settled points-side record of a checked-out cart, 1:1 per cart.
//! Completion transfers total_points from the organisation account to the
//! product account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "point_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cart_id: i32,
    pub org_account_id: i32,
    pub product_account_id: i32,
    pub total_points: i64,
    /// Pending, Completed, Refunded
    pub status: String,
    pub parent_order_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
