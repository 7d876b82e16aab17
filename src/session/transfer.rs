//! Transfer submission and error classification.

use num_bigint::BigUint;
use std::sync::atomic::Ordering;

use super::{SessionController, SessionPhase, SessionSnapshot};
use crate::error::SessionError;
use crate::provider::Address;

/// Message recorded when a transaction was mined but its execution failed.
const CONFIRMATION_FAILED: &str = "execution failed on chain";

impl SessionController {
    /// Submit a token transfer and wait for its confirmation.
    ///
    /// Clears any previous transaction failure before the attempt. The
    /// pending transaction is cleared in every outcome. A user-rejected
    /// submission is absorbed without recording a failure; every other error
    /// is recorded with the most specific diagnostic text available and also
    /// returned to the caller.
    pub async fn transfer(
        &self,
        to: Address,
        amount: BigUint,
    ) -> Result<SessionSnapshot, SessionError> {
        let from = {
            let mut state = self.state.write().await;
            state.tx_error = None;
            if state.pending_tx.is_some() || state.phase == SessionPhase::AwaitingConfirmation {
                return Err(SessionError::TransferPending);
            }
            let from = state.account.clone().ok_or(SessionError::NotConnected)?;
            state.phase = SessionPhase::AwaitingConfirmation;
            from
        };

        log::info!("submitting transfer of {} to {}", amount, to);
        let outcome = self.run_transfer(&from, &to, &amount).await;

        let mut state = self.state.write().await;
        state.pending_tx = None;
        if state.phase == SessionPhase::AwaitingConfirmation {
            state.phase = SessionPhase::Active;
        }

        match outcome {
            Ok(()) => Ok(state.snapshot()),
            Err(SessionError::UserRejected) => {
                log::debug!("transfer rejected by user");
                Ok(state.snapshot())
            }
            Err(err) => {
                state.tx_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &BigUint,
    ) -> Result<(), SessionError> {
        // captured before submission: a reset while the transfer is in
        // flight bumps the generation and the refresh below is discarded
        let generation = self.poll_generation.load(Ordering::SeqCst);

        let tx = self
            .token
            .transfer(from, to, amount)
            .await
            .map_err(SessionError::from_provider)?;

        {
            let mut state = self.state.write().await;
            // the session may have been torn down while the wallet was open
            if state.account.is_some() {
                state.pending_tx = Some(tx.hash.clone());
            }
        }

        let receipt = self
            .token
            .wait_for_confirmation(&tx)
            .await
            .map_err(SessionError::from_provider)?;
        if !receipt.success {
            return Err(SessionError::Transaction(CONFIRMATION_FAILED.to_string()));
        }
        log::info!(
            "transfer {} confirmed in block {:?}",
            tx.hash,
            receipt.block_number
        );

        // refresh straight away rather than waiting for the next poll tick
        match self.token.balance_of(from).await {
            Ok(balance) => self.apply_balance(generation, balance).await,
            Err(e) => log::warn!("post-transfer balance refresh failed: {}", e),
        }

        Ok(())
    }
}
