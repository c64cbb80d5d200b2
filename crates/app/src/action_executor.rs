//! Action executor — performs claimed actions and records the outcome.
//!
//! The executor receives actions the scheduler has claimed, dispatches
//! them to the matching gateway and resolves the claim: `fired` on
//! success, back to `pending` with backoff on a transient failure,
//! `failed` when the error is permanent or the attempts are used up.
//! Every action is resolved; a gateway error never escapes to the
//! sweep loop.

use driphub_domain::automation::ActionKind;
use driphub_domain::id::ActionId;
use driphub_domain::schedule::{ScheduledAction, backoff_delay};
use driphub_domain::time;

use crate::ports::{
    ActionStore, AdsAudienceGateway, EngineEvent, EnginePublisher, NotificationGateway,
    ProviderError,
};

/// How failed dispatches are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per action, the first one included.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt after that.
    pub retry_base: chrono::Duration,
    /// Upper bound on the backoff delay.
    pub retry_cap: chrono::Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_base: chrono::Duration::seconds(30),
            retry_cap: chrono::Duration::hours(1),
        }
    }
}

/// Dispatches claimed actions to gateways and resolves their claims.
pub struct ActionExecutor<S, N, A, P> {
    store: S,
    notifications: N,
    audiences: A,
    publisher: P,
    policy: RetryPolicy,
}

impl<S, N, A, P> ActionExecutor<S, N, A, P>
where
    S: ActionStore,
    N: NotificationGateway,
    A: AdsAudienceGateway,
    P: EnginePublisher,
{
    /// Create a new executor.
    pub fn new(
        store: S,
        notifications: N,
        audiences: A,
        publisher: P,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            notifications,
            audiences,
            publisher,
            policy,
        }
    }

    /// Execute one claimed action and record its outcome.
    ///
    /// Gateway and storage errors are absorbed here: on a storage error
    /// the claim is left as-is and the stale-claim sweep will hand the
    /// action out again later.
    #[tracing::instrument(
        skip(self, action),
        fields(action_id = %action.id, kind = %action.kind, attempt = action.attempt_count)
    )]
    pub async fn execute(&self, action: ScheduledAction) {
        match self.dispatch(&action).await {
            Ok(()) => self.resolve_fired(&action).await,
            Err(err) if err.is_transient() && action.attempt_count < self.policy.max_attempts => {
                self.resolve_retry(&action, &err).await;
            }
            Err(err) => self.resolve_failed(&action, &err).await,
        }
    }

    /// Hand the action to the gateway that knows its kind.
    async fn dispatch(&self, action: &ScheduledAction) -> Result<(), ProviderError> {
        match &action.kind {
            ActionKind::Email { template_id } => {
                let recipient = recipient_field(action, "email")?;
                self.notifications
                    .send_email(recipient, template_id, &action.data, action.id)
                    .await
            }
            ActionKind::Sms { template_id } => {
                let recipient = recipient_field(action, "phone")?;
                self.notifications
                    .send_sms(recipient, template_id, &action.data, action.id)
                    .await
            }
            ActionKind::SyncAudience {
                account_id,
                audience_id,
            } => {
                let users = [action.user_id.clone()];
                self.audiences
                    .sync_audience(account_id, audience_id, &users)
                    .await
                    .map_err(ProviderError::from)
            }
        }
    }

    async fn resolve_fired(&self, action: &ScheduledAction) {
        match self.store.mark_fired(action.id).await {
            Ok(true) => {
                tracing::info!("action fired");
                let _ = self
                    .publisher
                    .publish(EngineEvent::ActionFired {
                        action_id: action.id,
                        kind: action.kind.clone(),
                        user_id: action.user_id.clone(),
                    })
                    .await;
            }
            Ok(false) => claim_lost(action.id),
            Err(err) => outcome_not_recorded(action.id, &err),
        }
    }

    async fn resolve_retry(&self, action: &ScheduledAction, error: &ProviderError) {
        let delay = backoff_delay(
            self.policy.retry_base,
            action.attempt_count,
            self.policy.retry_cap,
        );
        let fire_at = time::now() + delay;
        match self.store.reschedule(action.id, fire_at, &error.to_string()).await {
            Ok(true) => {
                tracing::warn!(
                    error = %error,
                    retry_in_secs = delay.num_seconds(),
                    "action failed, retrying"
                );
            }
            Ok(false) => claim_lost(action.id),
            Err(err) => outcome_not_recorded(action.id, &err),
        }
    }

    async fn resolve_failed(&self, action: &ScheduledAction, error: &ProviderError) {
        match self.store.mark_failed(action.id, &error.to_string()).await {
            Ok(true) => {
                tracing::error!(error = %error, attempts = action.attempt_count, "action failed permanently");
                let _ = self
                    .publisher
                    .publish(EngineEvent::ActionFailed {
                        action_id: action.id,
                        user_id: action.user_id.clone(),
                        error: error.to_string(),
                        attempts: action.attempt_count,
                    })
                    .await;
            }
            Ok(false) => claim_lost(action.id),
            Err(err) => outcome_not_recorded(action.id, &err),
        }
    }
}

/// Pull a recipient address out of the action data. Without one the
/// action can never succeed, so the error is permanent.
fn recipient_field<'a>(
    action: &'a ScheduledAction,
    field: &str,
) -> Result<&'a str, ProviderError> {
    action
        .data
        .get(field)
        .and_then(serde_json::Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ProviderError::permanent(format!("no {field} address in action data")))
}

fn claim_lost(action_id: ActionId) {
    tracing::warn!(%action_id, "claim was lost before the outcome could be recorded");
}

fn outcome_not_recorded(action_id: ActionId, error: &driphub_domain::error::DripHubError) {
    tracing::error!(%action_id, %error, "could not record action outcome; claim left for the stale sweep");
}
