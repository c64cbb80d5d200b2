//! Action store port — the durable queue of scheduled actions.
//!
//! The store is where every at-least-once guarantee lives: enqueueing is
//! idempotent on `(event_id, automation_id, step_index)`, claiming is an
//! atomic compare-and-swap so concurrent sweepers never double-dispatch,
//! and terminal transitions only apply while the row is still claimed.

use std::future::Future;
use std::sync::Arc;

use driphub_domain::error::DripHubError;
use driphub_domain::id::{ActionId, AutomationId, UserId};
use driphub_domain::schedule::{ActionStatus, ScheduledAction};
use driphub_domain::time::Timestamp;

/// Durable persistence for [`ScheduledAction`]s.
pub trait ActionStore {
    /// Insert a batch of pending actions, skipping any whose dedup key
    /// `(event_id, automation_id, step_index)` already exists.
    ///
    /// Returns the number of actions that were actually new.
    fn enqueue(
        &self,
        actions: Vec<ScheduledAction>,
    ) -> impl Future<Output = Result<u32, DripHubError>> + Send;

    /// Atomically claim up to `limit` runnable actions: pending rows with
    /// `fire_at <= now`, plus claimed rows whose claim is older than
    /// `claim_timeout` (their worker is presumed crashed). Claiming flips
    /// the row to `claimed`, stamps `claimed_at = now` and increments
    /// `attempt_count`. Each returned action is held by exactly one
    /// caller, even with concurrent sweepers.
    fn claim_due(
        &self,
        now: Timestamp,
        claim_timeout: chrono::Duration,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ScheduledAction>, DripHubError>> + Send;

    /// Transition a claimed action to `fired`.
    ///
    /// Returns `false` when the row was no longer claimed (the claim was
    /// lost to a timeout and another worker owns the action now).
    fn mark_fired(&self, id: ActionId) -> impl Future<Output = Result<bool, DripHubError>> + Send;

    /// Transition a claimed action to `failed`, recording the error.
    ///
    /// Returns `false` when the row was no longer claimed.
    fn mark_failed(
        &self,
        id: ActionId,
        error: &str,
    ) -> impl Future<Output = Result<bool, DripHubError>> + Send;

    /// Release a claimed action back to `pending` with a later `fire_at`,
    /// recording the error that caused the retry.
    ///
    /// Returns `false` when the row was no longer claimed.
    fn reschedule(
        &self,
        id: ActionId,
        fire_at: Timestamp,
        error: &str,
    ) -> impl Future<Output = Result<bool, DripHubError>> + Send;

    /// Cancel every still-pending action of one automation for one user.
    ///
    /// Returns the number of rows cancelled. Claimed and terminal rows
    /// are never touched.
    fn cancel_pending(
        &self,
        automation_id: AutomationId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<u32, DripHubError>> + Send;

    /// Get an action by its unique identifier.
    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<ScheduledAction>, DripHubError>> + Send;

    /// List actions for the ops surface, optionally filtered by status,
    /// most recently created first.
    fn list(
        &self,
        status: Option<ActionStatus>,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ScheduledAction>, DripHubError>> + Send;
}

impl<T: ActionStore + Send + Sync> ActionStore for Arc<T> {
    fn enqueue(
        &self,
        actions: Vec<ScheduledAction>,
    ) -> impl Future<Output = Result<u32, DripHubError>> + Send {
        (**self).enqueue(actions)
    }

    fn claim_due(
        &self,
        now: Timestamp,
        claim_timeout: chrono::Duration,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ScheduledAction>, DripHubError>> + Send {
        (**self).claim_due(now, claim_timeout, limit)
    }

    fn mark_fired(&self, id: ActionId) -> impl Future<Output = Result<bool, DripHubError>> + Send {
        (**self).mark_fired(id)
    }

    fn mark_failed(
        &self,
        id: ActionId,
        error: &str,
    ) -> impl Future<Output = Result<bool, DripHubError>> + Send {
        (**self).mark_failed(id, error)
    }

    fn reschedule(
        &self,
        id: ActionId,
        fire_at: Timestamp,
        error: &str,
    ) -> impl Future<Output = Result<bool, DripHubError>> + Send {
        (**self).reschedule(id, fire_at, error)
    }

    fn cancel_pending(
        &self,
        automation_id: AutomationId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<u32, DripHubError>> + Send {
        (**self).cancel_pending(automation_id, user_id)
    }

    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<ScheduledAction>, DripHubError>> + Send {
        (**self).get_by_id(id)
    }

    fn list(
        &self,
        status: Option<ActionStatus>,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ScheduledAction>, DripHubError>> + Send {
        (**self).list(status, limit)
    }
}
