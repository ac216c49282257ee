use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bounty_bids")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bounty_id: i32,
    pub person_id: i32,
    /// Same denomination as the bounty reward (points or USD cents)
    pub amount: i64,
    /// Pending, Accepted, Rejected, Withdrawn
    pub status: String,
    pub message: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
