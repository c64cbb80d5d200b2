//! Sequence service — operational use-cases over scheduled actions.

use driphub_domain::error::{DripHubError, NotFoundError};
use driphub_domain::id::{ActionId, AutomationId, UserId};
use driphub_domain::schedule::{ActionStatus, ScheduledAction};

use crate::ports::ActionStore;

/// Application service for inspecting and withdrawing scheduled actions.
pub struct SequenceService<S> {
    store: S,
}

impl<S: ActionStore> SequenceService<S> {
    /// Create a new service backed by the given action store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Withdraw every still-pending action of one automation for one
    /// user, e.g. because the user completed the purchase the sequence
    /// was nagging about.
    ///
    /// Actions already claimed or in a terminal status are left alone.
    /// Returns the number of actions cancelled; zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_sequence(
        &self,
        automation_id: AutomationId,
        user_id: &UserId,
    ) -> Result<u32, DripHubError> {
        let cancelled = self.store.cancel_pending(automation_id, user_id).await?;
        if cancelled > 0 {
            tracing::info!(cancelled, "cancelled pending actions");
        }
        Ok(cancelled)
    }

    /// Look up a scheduled action by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::NotFound`] when no action with `id`
    /// exists, or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get_action(&self, id: ActionId) -> Result<ScheduledAction, DripHubError> {
        self.store.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Action",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List scheduled actions, optionally filtered by status, most
    /// recently created first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_actions(
        &self,
        status: Option<ActionStatus>,
        limit: u32,
    ) -> Result<Vec<ScheduledAction>, DripHubError> {
        self.store.list(status, limit).await
    }
}
