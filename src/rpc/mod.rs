//! JSON-RPC implementations of the provider capabilities.
//!
//! Everything here speaks to one node endpoint: the wallet surface
//! (`eth_requestAccounts`, `net_version`) and the token surface
//! (`eth_call`, `eth_sendTransaction`, `eth_getTransactionReceipt`).
//! During development the endpoint is usually the `chain-mock` crate.

pub mod abi;
pub mod client;
pub mod token;
pub mod wallet;

pub use client::JsonRpcClient;
pub use token::RpcTokenContract;
pub use wallet::RpcWalletProvider;
