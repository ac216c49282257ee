//! SeaORM Entity for bounties
//!
//! reward_amount is points when reward_type is "Points", integer USD cents
//! when reward_type is "USD". final_reward_amount is set once an accepted
//! bid overrides the declared reward.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bounties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub challenge_id: Option<i32>,
    pub competition_id: Option<i32>,
    pub title: String,
    /// "Points" or "USD"
    pub reward_type: String,
    pub reward_amount: i64,
    pub final_reward_amount: Option<i64>,
    /// Available, Claimed, In Review, Completed, Cancelled
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
