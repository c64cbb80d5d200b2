//! Scheduled action — a durable, time-delayed unit of work.
//!
//! When an automation matches an event, each of its steps becomes one
//! [`ScheduledAction`] row with an absolute `fire_at` time. Rows move
//! through a small status machine:
//!
//! ```text
//! pending ──claim──▶ claimed ──fire──▶ fired
//!    │                  │
//!    │                  ├──fail──▶ failed
//!    │                  └──retry─▶ pending (later fire_at)
//!    └──cancel──▶ cancelled
//! ```
//!
//! `fired`, `cancelled` and `failed` are terminal. A claim that is
//! neither fired nor failed within the claim timeout is considered
//! abandoned (crashed worker) and may be reclaimed.

use serde::{Deserialize, Serialize};

use crate::automation::{ActionKind, ActionStep};
use crate::event::Event;
use crate::id::{ActionId, AutomationId, EventId, MerchantId, UserId};
use crate::time::Timestamp;

/// Where a scheduled action is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Waiting for its `fire_at` time.
    Pending,
    /// Picked up by a dispatcher, execution in flight.
    Claimed,
    /// Executed successfully.
    Fired,
    /// Withdrawn before execution.
    Cancelled,
    /// Gave up after exhausting retries or hitting a permanent error.
    Failed,
}

impl ActionStatus {
    /// Storage name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Fired => "fired",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Whether the action can never change status again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fired | Self::Cancelled | Self::Failed)
    }

    /// Whether the status machine allows moving from `self` to `to`.
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Claimed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Claimed, Self::Fired)
                | (Self::Claimed, Self::Failed)
                | (Self::Claimed, Self::Pending)
        )
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action status: {0}")]
pub struct UnknownStatusError(pub String);

impl std::str::FromStr for ActionStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "claimed" => Ok(Self::Claimed),
            "fired" => Ok(Self::Fired),
            "cancelled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatusError(other.to_string())),
        }
    }
}

/// Error returned when a status change is not allowed by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition action from {from} to {to}")]
pub struct TransitionError {
    pub from: ActionStatus,
    pub to: ActionStatus,
}

/// One durable, time-delayed unit of work produced by an automation match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub id: ActionId,
    /// Automation whose step produced this action.
    pub automation_id: AutomationId,
    /// Event that triggered the automation.
    pub event_id: EventId,
    pub merchant_id: MerchantId,
    pub user_id: UserId,
    /// Index of the step within the automation at schedule time.
    pub step_index: u32,
    pub kind: ActionKind,
    /// Event payload captured at schedule time, with static step data
    /// merged over it.
    pub data: serde_json::Value,
    /// Absolute time the action becomes due.
    pub fire_at: Timestamp,
    pub status: ActionStatus,
    /// Number of execution attempts started so far.
    pub attempt_count: u32,
    /// Message of the most recent execution error, if any.
    pub last_error: Option<String>,
    /// When the current or most recent claim was taken.
    pub claimed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ScheduledAction {
    /// Materialize one automation step against a triggering event.
    ///
    /// The event payload is captured into `data` so execution never
    /// depends on the event still being available; static step data
    /// overrides payload fields of the same name.
    #[must_use]
    pub fn from_step(
        event: &Event,
        automation_id: AutomationId,
        step_index: u32,
        step: &ActionStep,
        now: Timestamp,
    ) -> Self {
        Self {
            id: ActionId::new(),
            automation_id,
            event_id: event.id,
            merchant_id: event.merchant_id,
            user_id: event.user_id.clone(),
            step_index,
            kind: step.kind.clone(),
            data: merge_data(&event.payload, &step.data),
            fire_at: now + step.delay(),
            status: ActionStatus::Pending,
            attempt_count: 0,
            last_error: None,
            claimed_at: None,
            created_at: now,
        }
    }

    /// The natural key that makes scheduling idempotent: replaying the
    /// same event against the same automation step must not create a
    /// second action.
    #[must_use]
    pub fn dedup_key(&self) -> (EventId, AutomationId, u32) {
        (self.event_id, self.automation_id, self.step_index)
    }

    /// Whether the action is pending and due at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status == ActionStatus::Pending && self.fire_at <= now
    }

    /// Whether a claim has been held longer than `timeout` (the holder
    /// is presumed crashed).
    #[must_use]
    pub fn claim_expired(&self, now: Timestamp, timeout: chrono::Duration) -> bool {
        self.status == ActionStatus::Claimed
            && self.claimed_at.is_some_and(|taken| now - taken >= timeout)
    }

    /// Take the action for execution, starting a new attempt.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the action is pending.
    pub fn claim(&mut self, now: Timestamp) -> Result<(), TransitionError> {
        self.transition(ActionStatus::Claimed)?;
        self.claimed_at = Some(now);
        self.attempt_count += 1;
        Ok(())
    }

    /// Record successful execution.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the action is claimed.
    pub fn fire(&mut self) -> Result<(), TransitionError> {
        self.transition(ActionStatus::Fired)
    }

    /// Withdraw the action before execution.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the action is pending.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.transition(ActionStatus::Cancelled)
    }

    /// Give up on the action permanently.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the action is claimed.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(ActionStatus::Failed)?;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Release the claim and requeue the action for a later attempt.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the action is claimed.
    pub fn retry(
        &mut self,
        fire_at: Timestamp,
        error: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.transition(ActionStatus::Pending)?;
        self.fire_at = fire_at;
        self.last_error = Some(error.into());
        self.claimed_at = None;
        Ok(())
    }

    fn transition(&mut self, to: ActionStatus) -> Result<(), TransitionError> {
        if !self.status.can_transition(to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Merge static step data over a captured event payload.
///
/// Both inputs are expected to be JSON objects; anything else
/// contributes no fields.
#[must_use]
pub fn merge_data(payload: &serde_json::Value, step_data: &serde_json::Value) -> serde_json::Value {
    let mut merged = serde_json::Map::new();
    if let Some(object) = payload.as_object() {
        merged.extend(object.clone());
    }
    if let Some(object) = step_data.as_object() {
        merged.extend(object.clone());
    }
    serde_json::Value::Object(merged)
}

/// Exponential backoff for the `attempt`-th retry: `base * 2^(attempt-1)`,
/// never exceeding `cap`.
#[must_use]
pub fn backoff_delay(
    base: chrono::Duration,
    attempt: u32,
    cap: chrono::Duration,
) -> chrono::Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    let delay = base.checked_mul(2_i32.saturating_pow(exponent)).unwrap_or(cap);
    delay.min(cap)
}
