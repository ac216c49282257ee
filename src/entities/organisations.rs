//! SeaORM Entity for organisations
//!
//! The buyer side of the marketplace: carts, point accounts and wallets
//! hang off an organisation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "organisations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
    pub tax_id: Option<String>,
    /// Flat sales tax rate in basis points; None = jurisdiction rule applies
    pub tax_rate_bps: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
