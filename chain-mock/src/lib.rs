/// Chain Mock Server Library
///
/// This crate provides both a standalone binary and library components
/// for simulating a wallet-enabled dev node with an in-memory token ledger.

pub mod handlers;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use server::{create_router, run_server};
pub use state::{ChainConfig, MockChain, Receipt};
