use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Recipient address, forwarded as-is to the contract binding.
    pub to: String,
    /// Token amount as a decimal string, arbitrary precision.
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
