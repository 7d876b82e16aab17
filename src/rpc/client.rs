/// JSON-RPC 2.0 client wrapper
///
/// Thin reqwest wrapper shared by the wallet and token implementations.
/// Transport failures map to `ProviderError::Unavailable` so the session
/// layer can tell "no wallet reachable" apart from structured errors.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::provider::{ProviderError, RpcErrorObject};

pub struct JsonRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

impl JsonRpcClient {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a single JSON-RPC call and unwrap the result value.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        log::debug!("rpc call {} -> {}", method, self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Unavailable(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(ProviderError::Rpc(error));
        }

        body.result
            .ok_or_else(|| ProviderError::InvalidResponse("missing result field".to_string()))
    }

    /// Call a method and decode the result as a string.
    pub async fn call_string(&self, method: &str, params: Value) -> Result<String, ProviderError> {
        let value = self.call(method, params).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("{} returned non-string", method)))
    }
}
