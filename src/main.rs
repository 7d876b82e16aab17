use std::sync::Arc;
use std::time::Duration;

use dapp_wallet::api::server;
use dapp_wallet::config::SessionConfig;
use dapp_wallet::rpc::{JsonRpcClient, RpcTokenContract, RpcWalletProvider};
use dapp_wallet::session::SessionController;

/// Cadence of the wallet change watcher (accounts / network diffs).
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting dapp session wallet service");
    let config = SessionConfig::from_env();

    let rpc = Arc::new(JsonRpcClient::new(config.node_url.clone()));
    let provider = Arc::new(RpcWalletProvider::new(Arc::clone(&rpc)));
    provider.start_watching(WATCH_INTERVAL);
    let token = Arc::new(RpcTokenContract::new(rpc, config.token_address.clone()));

    let bind_address = config.bind_address.clone();
    let controller = SessionController::new(config, provider, token);

    server::start_server(controller, &bind_address).await?;
    Ok(())
}
