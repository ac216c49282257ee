use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptBidResponse {
    pub bid_id: i32,
    pub status: String,
    pub final_reward_amount: i64,
}
