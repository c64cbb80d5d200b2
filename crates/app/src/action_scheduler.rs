//! Delayed action scheduler — the sweep loop that makes `fire_at` real.
//!
//! [`ActionScheduler`] periodically claims runnable actions from the
//! [`ActionStore`] and hands each one to the [`ActionExecutor`]. A claim
//! is an atomic store-level compare-and-swap, so several schedulers can
//! sweep the same store without dispatching an action twice, and claims
//! held by a crashed worker become claimable again once they outlive the
//! claim timeout. The loop never stops on its own: a failing sweep is
//! logged and retried at the next interval.

use std::time::Duration;

use serde::Deserialize;
use tokio::task::JoinHandle;

use driphub_domain::error::DripHubError;
use driphub_domain::time;

use crate::action_executor::ActionExecutor;
use crate::ports::{ActionStore, AdsAudienceGateway, EnginePublisher, NotificationGateway};

/// Configuration for the sweep loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Interval between sweeps of the action store, in seconds.
    pub sweep_interval_secs: u16,
    /// Maximum number of actions claimed per batch.
    pub batch_size: u32,
    /// How long a claim may be held before its worker is presumed
    /// crashed and the action becomes claimable again, in seconds.
    pub claim_timeout_secs: u16,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 5,
            batch_size: 100,
            claim_timeout_secs: 120,
        }
    }
}

/// Background scheduler that dispatches actions once `fire_at` arrives.
pub struct ActionScheduler<S, N, A, P> {
    store: S,
    executor: ActionExecutor<S, N, A, P>,
    config: SchedulerConfig,
}

impl<S, N, A, P> ActionScheduler<S, N, A, P>
where
    S: ActionStore + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    A: AdsAudienceGateway + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    /// Create a new scheduler.
    ///
    /// `store` must be the store the executor resolves its claims
    /// against; pass a clone of the same handle.
    pub fn new(store: S, executor: ActionExecutor<S, N, A, P>, config: SchedulerConfig) -> Self {
        Self {
            store,
            executor,
            config,
        }
    }

    /// Start the sweep loop as a background task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run sweeps forever, pausing for the interval between passes.
    async fn run(self) {
        let interval = Duration::from_secs(u64::from(self.config.sweep_interval_secs));
        loop {
            if let Err(err) = self.sweep().await {
                tracing::warn!(%err, "action sweep failed, retrying next interval");
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Run one sweep now: claim runnable actions batch by batch until the
    /// store has none left, executing every claim.
    ///
    /// Returns how many actions were dispatched. Execution outcomes are
    /// absorbed by the executor; only claiming can fail here.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError`] when the store cannot claim a batch.
    pub async fn sweep(&self) -> Result<u32, DripHubError> {
        let claim_timeout = chrono::Duration::seconds(i64::from(self.config.claim_timeout_secs));
        let mut dispatched = 0u32;

        loop {
            let batch = self
                .store
                .claim_due(time::now(), claim_timeout, self.config.batch_size)
                .await?;
            if batch.is_empty() {
                break;
            }

            for action in batch {
                self.executor.execute(action).await;
                dispatched += 1;
            }
        }

        if dispatched > 0 {
            tracing::debug!(dispatched, "sweep dispatched due actions");
        }
        Ok(dispatched)
    }
}
