/// Chain Mock Server
///
/// A lightweight stand-in for a wallet-enabled dev node: serves the JSON-RPC
/// methods the session service uses and keeps a single token ledger in
/// memory. Designed for local development and integration tests.

mod handlers;
mod server;
mod state;

use anyhow::{Context, Result};
use num_bigint::BigUint;
use std::env;
use std::sync::Arc;

use server::run_server;
use state::{ChainConfig, MockChain};

#[derive(Debug)]
struct Config {
    // Simulated chain
    network_id: String,
    accounts: Vec<String>,
    token_address: String,
    token_name: String,
    token_symbol: String,
    initial_balance: BigUint,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let network_id = env::var("NETWORK_ID").unwrap_or_else(|_| "1337".to_string());

        let accounts = env::var("ACCOUNTS")
            .unwrap_or_else(|_| "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let token_address = env::var("TOKEN_ADDRESS")
            .unwrap_or_else(|_| "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string());

        let token_name = env::var("TOKEN_NAME").unwrap_or_else(|_| "Demo Token".to_string());
        let token_symbol = env::var("TOKEN_SYMBOL").unwrap_or_else(|_| "DEMO".to_string());

        let initial_balance = env::var("INITIAL_BALANCE")
            .unwrap_or_else(|_| "1000000".to_string())
            .parse::<BigUint>()
            .ok()
            .context("Invalid INITIAL_BALANCE")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8545".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            network_id,
            accounts,
            token_address,
            token_name,
            token_symbol,
            initial_balance,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Chain Mock Server...");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    log::info!("Network id: {}", config.network_id);
    log::info!("Unlocked accounts: {:?}", config.accounts);
    log::info!(
        "Token {} ({}) at {}",
        config.token_name,
        config.token_symbol,
        config.token_address
    );
    log::info!(
        "Server will listen on {}:{}",
        config.server_host,
        config.server_port
    );

    let chain = Arc::new(MockChain::new(ChainConfig {
        network_id: config.network_id,
        accounts: config.accounts,
        token_address: config.token_address,
        token_name: config.token_name,
        token_symbol: config.token_symbol,
        initial_balance: config.initial_balance,
    }));

    // Run server
    run_server(chain, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
