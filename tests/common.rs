//! Common test utilities for session controller integration tests
//!
//! Provides in-process fakes of the wallet and the token contract with
//! failure/rejection toggles, plus a controller factory with a fast poll
//! cadence so tests settle quickly.
#![allow(dead_code)]

use async_trait::async_trait;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use dapp_wallet::config::SessionConfig;
use dapp_wallet::provider::{
    Address, ProviderError, RpcErrorData, RpcErrorObject, TokenContract, TxHandle, TxReceipt,
    WalletEvent, WalletProvider,
};
use dapp_wallet::session::SessionController;

pub const ALICE: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const BOB: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
pub const DEV_NETWORK: &str = "1337";

/// In-process wallet fake.
pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    network: Mutex<String>,
    available: AtomicBool,
    reject_next_request: AtomicBool,
    events: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    pub fn new(account: &str, network: &str) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(vec![account.to_string()]),
            network: Mutex::new(network.to_string()),
            available: AtomicBool::new(true),
            reject_next_request: AtomicBool::new(false),
            events,
        })
    }

    /// A wallet that cannot be reached at all.
    pub fn unavailable() -> Arc<Self> {
        let wallet = Self::new(ALICE, DEV_NETWORK);
        wallet.available.store(false, Ordering::SeqCst);
        wallet
    }

    pub fn reject_next_request(&self) {
        self.reject_next_request.store(true, Ordering::SeqCst);
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        *self.accounts.lock().unwrap() = accounts.iter().map(|a| a.to_string()).collect();
    }

    pub fn emit_accounts_changed(&self, accounts: &[&str]) {
        self.set_accounts(accounts);
        let _ = self.events.send(WalletEvent::AccountsChanged(
            accounts.iter().map(|a| a.to_string()).collect(),
        ));
    }

    pub fn emit_network_changed(&self, network: &str) {
        *self.network.lock().unwrap() = network.to_string();
        let _ = self
            .events
            .send(WalletEvent::NetworkChanged(network.to_string()));
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable(
                "no injected wallet".to_string(),
            ));
        }
        if self.reject_next_request.swap(false, Ordering::SeqCst) {
            return Err(user_rejection());
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn network_id(&self) -> Result<String, ProviderError> {
        Ok(self.network.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

#[derive(Clone)]
struct MinedTransfer {
    from: Address,
    to: Address,
    amount: BigUint,
}

/// In-process token contract fake. Transfers apply at confirmation time,
/// like a real chain mines them.
pub struct MockToken {
    balances: Mutex<HashMap<Address, BigUint>>,
    pending: Mutex<HashMap<String, MinedTransfer>>,
    name_fetches: AtomicUsize,
    balance_reads: AtomicUsize,
    fail_confirmation: AtomicBool,
    reject_next_transfer: AtomicBool,
    revert_reason: Mutex<Option<String>>,
    confirmation_delay: Mutex<Duration>,
    next_nonce: AtomicUsize,
}

impl MockToken {
    pub fn new(holder: &str, balance: u64) -> Arc<Self> {
        let mut balances = HashMap::new();
        balances.insert(holder.to_string(), BigUint::from(balance));
        Arc::new(Self {
            balances: Mutex::new(balances),
            pending: Mutex::new(HashMap::new()),
            name_fetches: AtomicUsize::new(0),
            balance_reads: AtomicUsize::new(0),
            fail_confirmation: AtomicBool::new(false),
            reject_next_transfer: AtomicBool::new(false),
            revert_reason: Mutex::new(None),
            confirmation_delay: Mutex::new(Duration::from_millis(0)),
            next_nonce: AtomicUsize::new(1),
        })
    }

    pub fn balance(&self, account: &str) -> BigUint {
        self.balances
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_balance(&self, account: &str, balance: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert(account.to_string(), BigUint::from(balance));
    }

    pub fn name_fetches(&self) -> usize {
        self.name_fetches.load(Ordering::SeqCst)
    }

    pub fn balance_reads(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }

    /// Next confirmation comes back with a failed status.
    pub fn fail_next_confirmation(&self) {
        self.fail_confirmation.store(true, Ordering::SeqCst);
    }

    /// Next transfer submission is declined in the wallet.
    pub fn reject_next_transfer(&self) {
        self.reject_next_transfer.store(true, Ordering::SeqCst);
    }

    /// Next transfer submission fails with a structured revert diagnostic.
    pub fn revert_next_transfer(&self, reason: &str) {
        *self.revert_reason.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_confirmation_delay(&self, delay: Duration) {
        *self.confirmation_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl TokenContract for MockToken {
    async fn name(&self) -> Result<String, ProviderError> {
        self.name_fetches.fetch_add(1, Ordering::SeqCst);
        Ok("Demo Token".to_string())
    }

    async fn symbol(&self) -> Result<String, ProviderError> {
        Ok("DEMO".to_string())
    }

    async fn balance_of(&self, account: &Address) -> Result<BigUint, ProviderError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance(account))
    }

    async fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> Result<TxHandle, ProviderError> {
        if self.reject_next_transfer.swap(false, Ordering::SeqCst) {
            return Err(user_rejection());
        }
        if let Some(reason) = self.revert_reason.lock().unwrap().take() {
            return Err(ProviderError::Rpc(RpcErrorObject {
                code: -32000,
                message: "execution error".to_string(),
                data: Some(RpcErrorData {
                    message: Some(reason),
                }),
            }));
        }

        let nonce = self.next_nonce.fetch_add(1, Ordering::SeqCst);
        let hash = format!("0xmock{:060x}", nonce);
        self.pending.lock().unwrap().insert(
            hash.clone(),
            MinedTransfer {
                from: from.clone(),
                to: to.clone(),
                amount: amount.clone(),
            },
        );
        Ok(TxHandle { hash })
    }

    async fn wait_for_confirmation(&self, tx: &TxHandle) -> Result<TxReceipt, ProviderError> {
        let delay = *self.confirmation_delay.lock().unwrap();
        if delay > Duration::from_millis(0) {
            tokio::time::sleep(delay).await;
        }

        let mined = self
            .pending
            .lock()
            .unwrap()
            .remove(&tx.hash)
            .ok_or_else(|| ProviderError::InvalidResponse("unknown transaction".to_string()))?;

        if self.fail_confirmation.swap(false, Ordering::SeqCst) {
            return Ok(TxReceipt {
                hash: tx.hash.clone(),
                success: false,
                block_number: Some(1),
            });
        }

        {
            let mut balances = self.balances.lock().unwrap();
            let sender = balances.get(&mined.from).cloned().unwrap_or_default();
            if sender < mined.amount {
                return Ok(TxReceipt {
                    hash: tx.hash.clone(),
                    success: false,
                    block_number: Some(1),
                });
            }
            balances.insert(mined.from.clone(), sender - mined.amount.clone());
            let recipient = balances.entry(mined.to.clone()).or_default();
            *recipient += mined.amount;
        }

        Ok(TxReceipt {
            hash: tx.hash.clone(),
            success: true,
            block_number: Some(1),
        })
    }
}

fn user_rejection() -> ProviderError {
    ProviderError::Rpc(RpcErrorObject {
        code: ProviderError::USER_REJECTED_CODE,
        message: "User rejected the request.".to_string(),
        data: None,
    })
}

/// Config with a fast poll so tests settle in a few tens of milliseconds.
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_millis(20),
        ..SessionConfig::default()
    }
}

/// Config with a slow poll, for asserting on the immediate first read.
pub fn slow_poll_config() -> SessionConfig {
    SessionConfig {
        poll_interval: Duration::from_secs(5),
        ..SessionConfig::default()
    }
}

pub fn controller(
    config: SessionConfig,
    wallet: &Arc<MockWallet>,
    token: &Arc<MockToken>,
) -> Arc<SessionController> {
    SessionController::new(
        config,
        Arc::clone(wallet) as Arc<dyn WalletProvider>,
        Arc::clone(token) as Arc<dyn TokenContract>,
    )
}

/// Give spawned tasks and event handlers time to settle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(120)).await;
}
