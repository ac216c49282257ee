//! SeaORM Entity for time-versioned platform fee configuration
//!
//! The active configuration is the row with the latest applies_from <= now.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_fee_configurations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Whole percent, 1..=100
    pub percentage: i32,
    pub applies_from: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
