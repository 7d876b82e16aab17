/// Axum HTTP handlers: the JSON-RPC endpoint plus dev control endpoints
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use num_bigint::BigUint;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::{MockChain, RpcError};

/// Shared application state
pub type AppState = Arc<MockChain>;

/// Custom error type for the control endpoints
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, message).into_response()
    }
}

/// GET /health
pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct RpcCall {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// POST /
/// The JSON-RPC surface the session service talks to.
pub async fn rpc_handler(State(chain): State<AppState>, Json(call): Json<RpcCall>) -> Json<Value> {
    log::debug!("rpc {} {}", call.method, call.params);
    let result = dispatch(&chain, &call.method, &call.params);

    let body = match result {
        Ok(result) => json!({
            "jsonrpc": "2.0",
            "id": call.id,
            "result": result,
        }),
        Err(err) => json!({
            "jsonrpc": "2.0",
            "id": call.id,
            "error": { "code": err.code, "message": err.message },
        }),
    };
    Json(body)
}

fn dispatch(chain: &MockChain, method: &str, params: &Value) -> Result<Value, RpcError> {
    match method {
        "net_version" => Ok(Value::String(chain.network_id())),
        "eth_accounts" | "eth_requestAccounts" => Ok(json!(chain.accounts())),
        "eth_call" => {
            let call = params
                .get(0)
                .ok_or_else(|| RpcError::invalid_params("missing call object"))?;
            let to = field(call, "to")?;
            let data = field(call, "data")?;
            chain.call(&to, &data).map(Value::String)
        }
        "eth_sendTransaction" => {
            let tx = params
                .get(0)
                .ok_or_else(|| RpcError::invalid_params("missing transaction object"))?;
            let from = field(tx, "from")?;
            let to = field(tx, "to")?;
            let data = field(tx, "data")?;
            chain.send_transaction(&from, &to, &data).map(Value::String)
        }
        "eth_getTransactionReceipt" => {
            let hash = params
                .get(0)
                .and_then(|h| h.as_str())
                .ok_or_else(|| RpcError::invalid_params("missing transaction hash"))?;
            Ok(match chain.receipt(hash) {
                Some(receipt) => json!({
                    "transactionHash": receipt.hash,
                    "status": if receipt.success { "0x1" } else { "0x0" },
                    "blockNumber": format!("0x{:x}", receipt.block_number),
                }),
                None => Value::Null,
            })
        }
        other => Err(RpcError::invalid_params(format!(
            "method {} not supported",
            other
        ))),
    }
}

fn field(obj: &Value, name: &str) -> Result<String, RpcError> {
    obj.get(name)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| RpcError::invalid_params(format!("missing field {}", name)))
}

#[derive(Debug, Deserialize)]
pub struct SetAccountsRequest {
    pub accounts: Vec<String>,
}

/// POST /mock/accounts
/// Replace the unlocked account list (simulates switching accounts in the
/// wallet; an empty list simulates revoking access).
pub async fn set_accounts(
    State(chain): State<AppState>,
    Json(req): Json<SetAccountsRequest>,
) -> StatusCode {
    log::info!("accounts switched to {:?}", req.accounts);
    chain.set_accounts(req.accounts);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct SetNetworkRequest {
    pub network_id: String,
}

/// POST /mock/network
/// Move the simulated wallet to another network.
pub async fn set_network(
    State(chain): State<AppState>,
    Json(req): Json<SetNetworkRequest>,
) -> StatusCode {
    log::info!("network switched to {}", req.network_id);
    chain.set_network_id(req.network_id);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct FundRequest {
    pub account: String,
    pub amount: String,
}

/// POST /mock/fund
/// Set an account's token balance (decimal string).
pub async fn fund_account(
    State(chain): State<AppState>,
    Json(req): Json<FundRequest>,
) -> Result<StatusCode, ApiError> {
    let amount = BigUint::parse_bytes(req.amount.as_bytes(), 10)
        .ok_or_else(|| ApiError::BadRequest(format!("not a token amount: {}", req.amount)))?;
    chain.fund(&req.account, amount);
    Ok(StatusCode::NO_CONTENT)
}
