use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrderResponse {
    pub id: i32,
    pub cart_id: i32,
    pub order_reference: String,
    pub status: String,
    pub subtotal_cents: i64,
    pub fee_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    /// Dollars, for display
    pub total_usd: Decimal,
    pub parent_sales_order_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointOrderResponse {
    pub id: i32,
    pub cart_id: i32,
    pub total_points: i64,
    pub status: String,
    pub parent_order_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub success: bool,
    pub status: String,
}
