/// Token contract binding over JSON-RPC
///
/// Reads go through `eth_call` against the configured contract address;
/// transfers go through `eth_sendTransaction` (the node-side wallet signs),
/// and confirmation waits poll `eth_getTransactionReceipt`.
use async_trait::async_trait;
use num_bigint::BigUint;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use super::abi;
use super::client::JsonRpcClient;
use crate::provider::{Address, ProviderError, TokenContract, TxHandle, TxReceipt};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const RECEIPT_POLL_ATTEMPTS: u32 = 240;

pub struct RpcTokenContract {
    rpc: Arc<JsonRpcClient>,
    address: Address,
}

impl RpcTokenContract {
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self {
            rpc,
            address: address.to_lowercase(),
        }
    }

    async fn eth_call(&self, data: String) -> Result<String, ProviderError> {
        self.rpc
            .call_string(
                "eth_call",
                json!([{ "to": self.address, "data": data }, "latest"]),
            )
            .await
    }
}

#[async_trait]
impl TokenContract for RpcTokenContract {
    async fn name(&self) -> Result<String, ProviderError> {
        let raw = self.eth_call(format!("0x{}", abi::SELECTOR_NAME)).await?;
        abi::decode_string(&raw)
    }

    async fn symbol(&self) -> Result<String, ProviderError> {
        let raw = self.eth_call(format!("0x{}", abi::SELECTOR_SYMBOL)).await?;
        abi::decode_string(&raw)
    }

    async fn balance_of(&self, account: &Address) -> Result<BigUint, ProviderError> {
        let raw = self.eth_call(abi::balance_of_data(account)?).await?;
        abi::decode_uint(&raw)
    }

    async fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> Result<TxHandle, ProviderError> {
        let data = abi::transfer_data(to, amount)?;
        let hash = self
            .rpc
            .call_string(
                "eth_sendTransaction",
                json!([{ "from": from, "to": self.address, "data": data }]),
            )
            .await?;
        log::info!("transfer submitted: {}", hash);
        Ok(TxHandle { hash })
    }

    async fn wait_for_confirmation(&self, tx: &TxHandle) -> Result<TxReceipt, ProviderError> {
        for attempt in 0..RECEIPT_POLL_ATTEMPTS {
            let value = self
                .rpc
                .call("eth_getTransactionReceipt", json!([tx.hash]))
                .await?;

            if !value.is_null() {
                let status = value
                    .get("status")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| {
                        ProviderError::InvalidResponse("receipt missing status".to_string())
                    })?;
                let block_number = value
                    .get("blockNumber")
                    .and_then(|b| b.as_str())
                    .and_then(|b| u64::from_str_radix(b.trim_start_matches("0x"), 16).ok());

                return Ok(TxReceipt {
                    hash: tx.hash.clone(),
                    success: status == "0x1",
                    block_number,
                });
            }

            log::debug!(
                "receipt for {} not available yet (attempt {})",
                tx.hash,
                attempt + 1
            );
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }

        Err(ProviderError::InvalidResponse(format!(
            "transaction {} not confirmed after {} attempts",
            tx.hash, RECEIPT_POLL_ATTEMPTS
        )))
    }
}
