/// Wallet surface over JSON-RPC
///
/// Implements account access and network identity against the node, and
/// bridges the push-style change events the controller expects by watching
/// `eth_accounts` / `net_version` for diffs.
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::client::JsonRpcClient;
use crate::provider::{Address, ProviderError, WalletEvent, WalletProvider};

const EVENT_CHANNEL_CAPACITY: usize = 32;

pub struct RpcWalletProvider {
    rpc: Arc<JsonRpcClient>,
    events: broadcast::Sender<WalletEvent>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl RpcWalletProvider {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            rpc,
            events,
            watcher: Mutex::new(None),
        }
    }

    /// Start the change watcher: polls the wallet surface and broadcasts
    /// account/network diffs as events. Installing a new watcher replaces
    /// the previous one.
    pub fn start_watching(&self, interval: Duration) {
        let rpc = Arc::clone(&self.rpc);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last_accounts: Option<Vec<Address>> = None;
            let mut last_network: Option<String> = None;
            loop {
                ticker.tick().await;

                match rpc.call("eth_accounts", json!([])).await {
                    Ok(value) => match parse_accounts(value) {
                        Ok(accounts) => {
                            let changed = last_accounts.as_ref() != Some(&accounts);
                            let first = last_accounts.is_none();
                            last_accounts = Some(accounts.clone());
                            if changed && !first {
                                let _ = events.send(WalletEvent::AccountsChanged(accounts));
                            }
                        }
                        Err(e) => log::debug!("account watch failed: {}", e),
                    },
                    Err(e) => log::debug!("account watch failed: {}", e),
                }

                match rpc.call_string("net_version", json!([])).await {
                    Ok(network) => {
                        let changed = last_network.as_deref() != Some(network.as_str());
                        let first = last_network.is_none();
                        last_network = Some(network.clone());
                        if changed && !first {
                            let _ = events.send(WalletEvent::NetworkChanged(network));
                        }
                    }
                    Err(e) => log::debug!("network watch failed: {}", e),
                }
            }
        });

        let mut watcher = self.watcher.lock().expect("watcher lock poisoned");
        if let Some(old) = watcher.replace(handle) {
            old.abort();
        }
    }
}

impl Drop for RpcWalletProvider {
    fn drop(&mut self) {
        if let Ok(mut watcher) = self.watcher.lock() {
            if let Some(handle) = watcher.take() {
                handle.abort();
            }
        }
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let value = self.rpc.call("eth_requestAccounts", json!([])).await?;
        parse_accounts(value)
    }

    async fn network_id(&self) -> Result<String, ProviderError> {
        self.rpc.call_string("net_version", json!([])).await
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

fn parse_accounts(value: serde_json::Value) -> Result<Vec<Address>, ProviderError> {
    let list = value
        .as_array()
        .ok_or_else(|| ProviderError::InvalidResponse("accounts is not an array".to_string()))?;
    list.iter()
        .map(|entry| {
            entry
                .as_str()
                .map(|s| s.to_lowercase())
                .ok_or_else(|| {
                    ProviderError::InvalidResponse("account is not a string".to_string())
                })
        })
        .collect()
}
