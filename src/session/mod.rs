//! Wallet/session controller.
//!
//! Single owner of the session state machine:
//! `Disconnected → Connecting → Initializing → Active ⇄ AwaitingConfirmation`,
//! with any phase falling back to `Disconnected` on account removal or
//! network change. The presentation layer only ever sees snapshots and
//! dispatches intents; no state leaks out mutably.

mod poll;
mod state;
mod transfer;

pub use state::{SessionPhase, SessionSnapshot, TokenInfo};

use chrono::Utc;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::provider::{Address, ProviderError, TokenContract, WalletEvent, WalletProvider};
use state::SessionState;

pub struct SessionController {
    pub(crate) config: SessionConfig,
    pub(crate) provider: Arc<dyn WalletProvider>,
    pub(crate) token: Arc<dyn TokenContract>,
    pub(crate) state: RwLock<SessionState>,
    /// Bumped on every poller stop/start and on reset; balance reads carry
    /// the generation they were issued under and are discarded when stale.
    pub(crate) poll_generation: AtomicU64,
    pub(crate) poll_task: Mutex<Option<JoinHandle<()>>>,
    pub(crate) listener_task: Mutex<Option<JoinHandle<()>>>,
    /// Handed to spawned tasks so they never keep the controller alive.
    pub(crate) weak_self: Weak<SessionController>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        provider: Arc<dyn WalletProvider>,
        token: Arc<dyn TokenContract>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            config,
            provider,
            token,
            state: RwLock::new(SessionState::default()),
            poll_generation: AtomicU64::new(0),
            poll_task: Mutex::new(None),
            listener_task: Mutex::new(None),
            weak_self: weak.clone(),
        })
    }

    /// Read-only view of the current state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    /// Connect the wallet and bring up a session.
    ///
    /// Requests account access, validates the wallet's network against the
    /// configured identifier, re-registers the change listener and
    /// initializes. A user-rejected request leaves the state clean and
    /// reports no failure.
    pub async fn connect(&self) -> Result<SessionSnapshot, SessionError> {
        {
            let mut state = self.state.write().await;
            // network failure is cleared on every retry
            state.network_error = None;
            state.phase = SessionPhase::Connecting;
        }

        let accounts = match self.provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => return self.abort_connect(e).await,
        };
        let account = match accounts.into_iter().next() {
            Some(account) => account,
            None => {
                self.state.write().await.phase = SessionPhase::Disconnected;
                return Err(SessionError::WalletUnavailable(
                    "wallet returned no accounts".to_string(),
                ));
            }
        };

        let network = match self.provider.network_id().await {
            Ok(network) => network,
            Err(e) => return self.abort_connect(e).await,
        };
        if network != self.config.expected_network_id {
            let err = SessionError::NetworkMismatch {
                expected: self.config.expected_network_id.clone(),
                actual: network,
            };
            let mut state = self.state.write().await;
            state.phase = SessionPhase::Disconnected;
            state.network_error = Some(err.to_string());
            return Err(err);
        }

        // Deregister-then-register: the previous listener is aborted before a
        // fresh subscription is taken, so reconnects never stack handlers.
        self.spawn_event_listener();

        self.state.write().await.network_id = Some(network);
        self.initialize(account).await?;

        Ok(self.snapshot().await)
    }

    /// Bring a session up for `account`: record it, fetch the token metadata
    /// once, start the balance poller. Also the re-entry point when the
    /// wallet switches to another account.
    pub(crate) async fn initialize(&self, account: Address) -> Result<(), SessionError> {
        log::info!("initializing session for {}", account);
        {
            let mut state = self.state.write().await;
            state.phase = SessionPhase::Initializing;
            state.account = Some(account);
            state.connected_at = Some(Utc::now());
            state.token = None;
            state.balance = None;
            state.tx_error = None;
        }

        let metadata = futures::future::try_join(self.token.name(), self.token.symbol()).await;
        match metadata {
            Ok((name, symbol)) => {
                let mut state = self.state.write().await;
                state.token = Some(TokenInfo { name, symbol });
                state.phase = SessionPhase::Active;
            }
            Err(e) => {
                // no partial session survives a failed bring-up
                self.reset_state().await;
                self.drop_event_listener();
                return Err(SessionError::Contract(e.detail().to_string()));
            }
        }

        self.start_polling();
        Ok(())
    }

    /// Tear the session down on user intent.
    pub async fn disconnect(&self) -> SessionSnapshot {
        log::info!("disconnecting session");
        self.drop_event_listener();
        self.reset_state().await;
        self.snapshot().await
    }

    pub async fn dismiss_transfer_error(&self) -> SessionSnapshot {
        let mut state = self.state.write().await;
        state.tx_error = None;
        state.snapshot()
    }

    pub async fn dismiss_network_error(&self) -> SessionSnapshot {
        let mut state = self.state.write().await;
        state.network_error = None;
        state.snapshot()
    }

    /// Halt polling and restore the empty resting state, atomically from the
    /// point of view of snapshot readers.
    pub(crate) async fn reset_state(&self) {
        self.stop_polling();
        let mut state = self.state.write().await;
        state.clear();
    }

    async fn abort_connect(&self, e: ProviderError) -> Result<SessionSnapshot, SessionError> {
        self.state.write().await.phase = SessionPhase::Disconnected;
        if e.is_user_rejection() {
            // absorbed: no error state, no failure reported
            log::debug!("wallet connect rejected by user");
            return Ok(self.snapshot().await);
        }
        Err(SessionError::WalletUnavailable(e.detail().to_string()))
    }

    fn spawn_event_listener(&self) {
        let mut events = self.provider.subscribe();
        let weak = self.weak_self.clone();
        let handle = tokio::spawn(async move {
            loop {
                let event = events.recv().await;
                let controller = match weak.upgrade() {
                    Some(controller) => controller,
                    None => break,
                };
                match event {
                    Ok(WalletEvent::AccountsChanged(accounts)) => {
                        controller.stop_polling();
                        match accounts.into_iter().next() {
                            Some(account) => {
                                log::info!("wallet account changed to {}", account);
                                if let Err(e) = controller.initialize(account).await {
                                    log::warn!(
                                        "re-initialization after account change failed: {}",
                                        e
                                    );
                                }
                            }
                            None => {
                                log::info!("wallet access revoked, resetting session");
                                controller.reset_state().await;
                                break;
                            }
                        }
                    }
                    Ok(WalletEvent::NetworkChanged(network)) => {
                        log::info!("wallet network changed to {}", network);
                        controller.stop_polling();
                        controller.reset_state().await;
                        if network != controller.config.expected_network_id {
                            let err = SessionError::NetworkMismatch {
                                expected: controller.config.expected_network_id.clone(),
                                actual: network,
                            };
                            controller.state.write().await.network_error = Some(err.to_string());
                        }
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("event stream lagged, {} notifications dropped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut listener = self.listener_task.lock().expect("listener lock poisoned");
        if let Some(old) = listener.replace(handle) {
            old.abort();
        }
    }

    fn drop_event_listener(&self) {
        let mut listener = self.listener_task.lock().expect("listener lock poisoned");
        if let Some(handle) = listener.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        if let Ok(mut slot) = self.listener_task.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}
