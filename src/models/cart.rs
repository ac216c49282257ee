use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartRequest {
    pub person_id: i32,
    pub organisation_id: i32,
    pub product_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub bounty_id: i32,
    /// Must match the bounty's reward type: "USD" or "Points"
    pub funding_type: String,
    /// Cents for USD funding, points otherwise
    pub funding_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemResponse {
    pub id: i32,
    pub kind: String,
    pub quantity: i32,
    pub unit_usd_cents: i64,
    pub unit_points: i64,
    pub bounty_id: Option<i32>,
    pub related_bid_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: i32,
    pub status: String,
    pub country: String,
    pub items: Vec<LineItemResponse>,
    pub usd_subtotal_cents: i64,
    pub total_points: i64,
    pub total_amount_cents: i64,
    /// Dollars, for display
    pub total_usd: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub sales_order_id: Option<i32>,
    pub point_order_id: Option<i32>,
}
