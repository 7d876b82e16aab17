//! Dapp Wallet: session controller for a sample token dapp
//!
//! This crate owns the wallet connection lifecycle for a single-token dapp:
//! connecting a wallet, validating the network, keeping a balance view fresh
//! through a polling loop, and submitting transfers with error classification.
//! The presentation layer stays outside the crate and talks to the controller
//! through the HTTP intent surface in [`api`].
//!
//! # Architecture
//!
//! - **Session Controller**: single owner of session/balance/transaction state
//! - **Provider capabilities**: [`provider::WalletProvider`] and
//!   [`provider::TokenContract`] traits hiding the wallet and the deployed token
//! - **JSON-RPC implementations**: [`rpc`] backs both capabilities with a node
//!   endpoint (use the `chain-mock` crate for local development)
//!
//! # Example
//!
//! ```ignore
//! use dapp_wallet::config::SessionConfig;
//! use dapp_wallet::rpc::{JsonRpcClient, RpcTokenContract, RpcWalletProvider};
//! use dapp_wallet::session::SessionController;
//! use std::sync::Arc;
//!
//! let config = SessionConfig::from_env();
//! let rpc = Arc::new(JsonRpcClient::new(config.node_url.clone()));
//! let provider = Arc::new(RpcWalletProvider::new(rpc.clone()));
//! let token = Arc::new(RpcTokenContract::new(rpc, config.token_address.clone()));
//! let controller = SessionController::new(config, provider, token);
//! let snapshot = controller.connect().await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod session;

// Re-exports for convenience
pub use config::SessionConfig;
pub use error::SessionError;
pub use provider::{ProviderError, TokenContract, WalletEvent, WalletProvider};
pub use session::{SessionController, SessionPhase, SessionSnapshot};

// Common result type
pub type Result<T> = std::result::Result<T, SessionError>;
