//! Session state owned by the controller.

use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::Serialize;

use crate::provider::Address;

/// Lifecycle phase of the wallet session.
///
/// `Disconnected` is both the initial and a valid terminal resting state;
/// any phase falls back to it on account removal or network change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Initializing,
    Active,
    AwaitingConfirmation,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Disconnected
    }
}

/// Token metadata, fetched once per session.
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
}

/// The single state struct behind the controller lock. No session fields
/// survive a reset.
#[derive(Debug, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub account: Option<Address>,
    pub network_id: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub token: Option<TokenInfo>,
    pub balance: Option<BigUint>,
    pub pending_tx: Option<String>,
    pub tx_error: Option<String>,
    pub network_error: Option<String>,
}

impl SessionState {
    /// All-or-nothing reset back to the disconnected resting state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            account: self.account.clone(),
            network_id: self.network_id.clone(),
            connected_at: self.connected_at,
            token: self.token.clone(),
            balance: self.balance.as_ref().map(|b| b.to_str_radix(10)),
            pending_tx: self.pending_tx.clone(),
            tx_error: self.tx_error.clone(),
            network_error: self.network_error.clone(),
        }
    }
}

/// Read-only view handed to the presentation layer. Balance is a decimal
/// string so arbitrary precision survives JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub account: Option<String>,
    pub network_id: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub token: Option<TokenInfo>,
    pub balance: Option<String>,
    pub pending_tx: Option<String>,
    pub tx_error: Option<String>,
    pub network_error: Option<String>,
}
