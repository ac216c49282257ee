//! SeaORM Entity for the append-only point transaction ledger
//!
//! Rows are never updated or deleted. Exactly one of org_account_id /
//! product_account_id is set per row; amount is always positive.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub org_account_id: Option<i32>,
    pub product_account_id: Option<i32>,
    pub cart_id: Option<i32>,
    pub amount: i64,
    /// GRANT, USE, REFUND, TRANSFER
    pub transaction_type: String,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
