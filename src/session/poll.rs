//! Balance polling lifecycle.

use num_bigint::BigUint;
use std::sync::atomic::Ordering;

use super::SessionController;

impl SessionController {
    /// Install the balance poller for the current session.
    ///
    /// Any prior poller is aborted first, so at most one is active per
    /// session. The first read fires immediately; subsequent reads follow
    /// the configured interval.
    pub(crate) fn start_polling(&self) {
        let generation = self.poll_generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut slot = self.poll_task.lock().expect("poll task lock poisoned");
            if let Some(old) = slot.take() {
                old.abort();
            }
        }

        let weak = self.weak_self.clone();
        let interval = self.config.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let controller = match weak.upgrade() {
                    Some(controller) => controller,
                    None => break,
                };
                if controller.poll_generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                let account = match controller.state.read().await.account.clone() {
                    Some(account) => account,
                    None => break,
                };
                match controller.token.balance_of(&account).await {
                    Ok(amount) => controller.apply_balance(generation, amount).await,
                    Err(e) => log::warn!("balance poll failed: {}", e),
                }
            }
        });

        let mut slot = self.poll_task.lock().expect("poll task lock poisoned");
        *slot = Some(handle);
        log::debug!("balance poller installed (generation {})", generation);
    }

    /// Abort the poller and invalidate any read still in flight.
    pub(crate) fn stop_polling(&self) {
        self.poll_generation.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.poll_task.lock().expect("poll task lock poisoned");
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }

    /// Apply a balance read, unless its generation was superseded while the
    /// read was in flight.
    pub(crate) async fn apply_balance(&self, generation: u64, amount: BigUint) {
        let mut state = self.state.write().await;
        if self.poll_generation.load(Ordering::SeqCst) != generation {
            log::debug!("discarding balance read from superseded poller");
            return;
        }
        state.balance = Some(amount);
    }
}
