//! Boundary contracts for the wallet and the deployed token.
//!
//! The controller never talks to a node directly; it goes through these two
//! capabilities. The JSON-RPC implementations live in [`crate::rpc`], the
//! integration tests substitute in-process fakes.

use async_trait::async_trait;
use num_bigint::BigUint;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;

/// Account address as the wallet reports it. Assumed well-formed; malformed
/// addresses are rejected by the contract side, not validated here.
pub type Address = String;

/// Change notifications pushed by the wallet.
#[derive(Debug, Clone)]
pub enum WalletEvent {
    /// The authorized account list changed; empty means access was revoked.
    AccountsChanged(Vec<Address>),
    /// The wallet moved to a different network.
    NetworkChanged(String),
}

/// Structured error response from the wallet provider, JSON-RPC shaped.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<RpcErrorData>,
}

/// Nested diagnostic payload some providers attach to errors.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorData {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// The provider cannot be reached at all.
    #[error("wallet provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with a structured error.
    #[error("{}", .0.message)]
    Rpc(RpcErrorObject),

    /// The provider answered with something we cannot interpret.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Error code wallets use when the user declines a request.
    pub const USER_REJECTED_CODE: i64 = 4001;

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ProviderError::Rpc(obj) if obj.code == Self::USER_REJECTED_CODE)
    }

    /// The most specific diagnostic text available: the nested data message
    /// when present, otherwise the top-level message.
    pub fn detail(&self) -> &str {
        match self {
            ProviderError::Rpc(obj) => obj
                .data
                .as_ref()
                .and_then(|d| d.message.as_deref())
                .unwrap_or(&obj.message),
            ProviderError::Unavailable(msg) => msg,
            ProviderError::InvalidResponse(msg) => msg,
        }
    }
}

/// Handle for a submitted transaction awaiting inclusion.
#[derive(Debug, Clone)]
pub struct TxHandle {
    pub hash: String,
}

/// Finalized execution outcome of a submitted transaction.
#[derive(Debug, Clone)]
pub struct TxReceipt {
    pub hash: String,
    /// On-chain execution succeeded. A mined-but-reverted transaction
    /// produces a receipt with `success == false`.
    pub success: bool,
    pub block_number: Option<u64>,
}

/// The injected wallet: account access, current network, change events.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access. Returns the authorized accounts,
    /// first one being the active account.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Identifier of the network the wallet is currently on.
    async fn network_id(&self) -> Result<String, ProviderError>;

    /// Subscribe to account/network change notifications. Each call returns
    /// an independent receiver; dropping it ends the subscription.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Binding to the deployed token contract.
#[async_trait]
pub trait TokenContract: Send + Sync {
    async fn name(&self) -> Result<String, ProviderError>;

    async fn symbol(&self) -> Result<String, ProviderError>;

    async fn balance_of(&self, account: &Address) -> Result<BigUint, ProviderError>;

    /// Submit a transfer. Resolves once the wallet has signed and the node
    /// accepted the transaction, with the transaction hash.
    async fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> Result<TxHandle, ProviderError>;

    /// Wait until the transaction is included and return its receipt.
    async fn wait_for_confirmation(&self, tx: &TxHandle) -> Result<TxReceipt, ProviderError>;
}
