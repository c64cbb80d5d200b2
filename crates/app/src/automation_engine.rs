//! Automation engine — reacts to events by scheduling delayed actions.
//!
//! For each incoming event, the engine looks up the owning merchant's
//! automations whose trigger matches, evaluates conditions and, if all
//! pass, turns every step into a durable [`ScheduledAction`]. Nothing
//! is executed inline; the scheduler picks the actions up when they
//! come due.

use driphub_domain::automation::{AutomationDefinition, Trigger};
use driphub_domain::error::{DripHubError, NotFoundError};
use driphub_domain::event::{Event, Topic};
use driphub_domain::id::{AutomationId, UserId};
use driphub_domain::schedule::ScheduledAction;
use driphub_domain::time;

use crate::ports::{ActionStore, AutomationRepository, EngineEvent, EnginePublisher};

/// What one evaluation pass did for a single event.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// Automations whose trigger and conditions matched the event.
    pub matched: Vec<AutomationId>,
    /// Actions newly enqueued. Replays of an already-seen event match
    /// without scheduling anything, so this can be zero.
    pub scheduled: u32,
}

/// Matches events against automation definitions and enqueues their steps.
pub struct AutomationEngine<R, S, P> {
    repo: R,
    store: S,
    publisher: P,
}

impl<R, S, P> AutomationEngine<R, S, P>
where
    R: AutomationRepository,
    S: ActionStore,
    P: EnginePublisher,
{
    /// Create a new engine.
    pub fn new(repo: R, store: S, publisher: P) -> Self {
        Self {
            repo,
            store,
            publisher,
        }
    }

    /// Evaluate a single event against the owning merchant's automations.
    ///
    /// For each automation whose trigger matches, conditions are evaluated
    /// against the event payload. If all hold, every step becomes one
    /// pending [`ScheduledAction`]. Enqueueing is idempotent on
    /// `(event_id, automation_id, step_index)`, so replaying an event
    /// never schedules a second sequence.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading automations or enqueueing fails.
    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.id, topic = %event.topic, event_type = %event.event_type)
    )]
    pub async fn evaluate(&self, event: &Event) -> Result<EvaluationOutcome, DripHubError> {
        let automations = self
            .repo
            .find_matching(event.merchant_id, event.topic, &event.event_type)
            .await?;

        let mut outcome = EvaluationOutcome::default();
        for automation in &automations {
            if !automation.conditions_hold(&event.payload) {
                tracing::debug!(automation_id = %automation.id, "conditions did not hold");
                continue;
            }

            outcome.scheduled += self.schedule_steps(automation, event).await?;
            outcome.matched.push(automation.id);
        }

        Ok(outcome)
    }

    /// Start an automation by hand for one user, bypassing trigger matching.
    ///
    /// Conditions still apply, evaluated against `context`. Every call
    /// schedules a fresh sequence; manual triggers are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::NotFound`] when the automation does not exist.
    #[tracing::instrument(skip(self, context), fields(user_id = %user_id))]
    pub async fn trigger(
        &self,
        automation_id: AutomationId,
        user_id: UserId,
        context: serde_json::Value,
    ) -> Result<EvaluationOutcome, DripHubError> {
        let automation = self
            .repo
            .get_by_id(automation_id)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Automation",
                id: automation_id.to_string(),
            })?;

        let mut outcome = EvaluationOutcome::default();
        if !automation.enabled {
            tracing::warn!(automation_id = %automation.id, "refusing to trigger disabled automation");
            return Ok(outcome);
        }
        if !automation.conditions_hold(&context) {
            tracing::debug!(automation_id = %automation.id, "conditions did not hold");
            return Ok(outcome);
        }

        let event = manual_event(&automation, user_id, context);
        outcome.scheduled = self.schedule_steps(&automation, &event).await?;
        outcome.matched.push(automation.id);
        Ok(outcome)
    }

    /// Turn every step of `automation` into a pending action and enqueue
    /// the batch. Returns the number of actions that were actually new.
    async fn schedule_steps(
        &self,
        automation: &AutomationDefinition,
        event: &Event,
    ) -> Result<u32, DripHubError> {
        let now = time::now();
        let actions: Vec<ScheduledAction> = automation
            .steps
            .iter()
            .zip(0u32..)
            .map(|(step, index)| ScheduledAction::from_step(event, automation.id, index, step, now))
            .collect();

        let enqueued = self.store.enqueue(actions).await?;
        if enqueued == 0 {
            tracing::debug!(
                automation_id = %automation.id,
                event_id = %event.id,
                "sequence already scheduled for this event"
            );
            return Ok(0);
        }

        tracing::info!(
            automation_id = %automation.id,
            automation_name = %automation.name,
            actions = enqueued,
            "scheduled action sequence"
        );

        // A publish failure must not undo a successful enqueue.
        let _ = self
            .publisher
            .publish(EngineEvent::SequenceScheduled {
                automation_id: automation.id,
                automation_name: automation.name.clone(),
                user_id: event.user_id.clone(),
                actions: enqueued,
            })
            .await;

        Ok(enqueued)
    }
}

/// Synthesize the event a manual trigger stands in for. A fresh event id
/// is assigned per call, so repeated triggers schedule repeated sequences.
fn manual_event(
    automation: &AutomationDefinition,
    user_id: UserId,
    context: serde_json::Value,
) -> Event {
    let topic = match &automation.trigger {
        Trigger::EventType { topic, .. } => *topic,
        Trigger::Manual => Topic::User,
    };
    Event::new(
        topic,
        "manual.trigger",
        automation.merchant_id,
        user_id,
        context,
    )
}
