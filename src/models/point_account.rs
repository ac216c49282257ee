use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPointsRequest {
    pub organisation_id: i32,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_by_id: Option<i32>,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointAccountResponse {
    pub organisation_id: i32,
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointTransactionResponse {
    pub id: i32,
    pub amount: i64,
    pub transaction_type: String,
    pub description: String,
    pub cart_id: Option<i32>,
}
