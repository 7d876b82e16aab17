/// Session service configuration from environment variables
///
/// Controls the node endpoint, the deployed token address, and the
/// network identifier the wallet is expected to be on.
use std::env;
use std::time::Duration;

/// Network identifier of the local development chain.
pub const DEFAULT_NETWORK_ID: &str = "1337";

/// Token contract address deployed by chain-mock at startup.
pub const DEFAULT_TOKEN_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// JSON-RPC endpoint of the wallet-enabled node
    pub node_url: String,
    /// Address of the deployed token contract
    pub token_address: String,
    /// Network identifier the wallet must be on
    pub expected_network_id: String,
    /// Balance poll cadence
    pub poll_interval: Duration,
    /// Bind address for the intent API
    pub bind_address: String,
}

impl SessionConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `NODE_URL`: JSON-RPC endpoint (default `http://localhost:8545`)
    /// - `TOKEN_ADDRESS`: deployed token contract (default chain-mock's address)
    /// - `EXPECTED_NETWORK_ID`: required wallet network (default `1337`)
    /// - `POLL_INTERVAL_MS`: balance poll cadence in milliseconds (default `1000`)
    /// - `BIND_ADDRESS`: intent API bind address (default `0.0.0.0:4000`)
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Local development against chain-mock
    /// cargo run
    ///
    /// # Point at another node and token
    /// NODE_URL=http://localhost:8545 TOKEN_ADDRESS=0x... cargo run
    /// ```
    pub fn from_env() -> Self {
        let node_url =
            env::var("NODE_URL").unwrap_or_else(|_| "http://localhost:8545".to_string());
        log::info!("📡 Node URL: {}", node_url);

        let token_address = env::var("TOKEN_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_ADDRESS.to_string())
            .to_lowercase();
        log::info!("🪙 Token contract: {}", token_address);

        let expected_network_id =
            env::var("EXPECTED_NETWORK_ID").unwrap_or_else(|_| DEFAULT_NETWORK_ID.to_string());
        log::info!("🌐 Expected network id: {}", expected_network_id);

        let poll_interval_ms = env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(1000);

        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:4000".to_string());

        Self {
            node_url,
            token_address,
            expected_network_id,
            poll_interval: Duration::from_millis(poll_interval_ms),
            bind_address,
        }
    }
}

impl Default for SessionConfig {
    /// Default configuration (local chain-mock)
    fn default() -> Self {
        Self {
            node_url: "http://localhost:8545".to_string(),
            token_address: DEFAULT_TOKEN_ADDRESS.to_string(),
            expected_network_id: DEFAULT_NETWORK_ID.to_string(),
            poll_interval: Duration::from_millis(1000),
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}
