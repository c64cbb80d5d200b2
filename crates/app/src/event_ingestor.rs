//! Event ingestor — turns raw bus messages into evaluated events.
//!
//! The ingestor sits between the message bus adapter and the
//! [`AutomationEngine`]: it parses topic and payload, validates the
//! envelope fields every event must carry, and hands well-formed events
//! to the engine. A message that cannot be interpreted is dropped with a
//! warning and an [`EngineEvent::EventDropped`] notification; it never
//! stops the consumer from processing the next message.

use std::sync::Arc;

use serde::Deserialize;

use driphub_domain::error::{DripHubError, MalformedEventError};
use driphub_domain::event::{Event, Topic};
use driphub_domain::id::{EventId, MerchantId, UserId};
use driphub_domain::time::{self, Timestamp};

use crate::automation_engine::{AutomationEngine, EvaluationOutcome};
use crate::ports::{ActionStore, AutomationRepository, EngineEvent, EnginePublisher};

/// The fields every bus message must carry, next to its free-form payload.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    event_id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    merchant_id: MerchantId,
    user_id: String,
    #[serde(default)]
    occurred_at: Option<Timestamp>,
}

/// Interpret a message body as an [`Event`] arriving on `topic`.
///
/// The full body is kept as the event payload, so conditions can
/// reference any producer field. A missing or non-UUID `event_id` gets a
/// fresh one: the event is still processed, but replaying it can no
/// longer be detected.
///
/// # Errors
///
/// Returns [`MalformedEventError`] when required envelope fields are
/// missing or invalid.
pub fn parse_event(topic: Topic, body: serde_json::Value) -> Result<Event, MalformedEventError> {
    let envelope: Envelope =
        serde_json::from_value(body.clone()).map_err(|err| MalformedEventError {
            topic: topic.to_string(),
            reason: err.to_string(),
        })?;

    let user_id = UserId::new(envelope.user_id).map_err(|err| MalformedEventError {
        topic: topic.to_string(),
        reason: err.to_string(),
    })?;

    let id = match envelope.event_id.as_deref().map(str::parse) {
        Some(Ok(id)) => id,
        Some(Err(_)) | None => {
            tracing::warn!(%topic, "message carries no usable event_id, assigning one; replays of it will not be detected");
            EventId::new()
        }
    };

    Ok(Event {
        id,
        topic,
        event_type: envelope.event_type,
        merchant_id: envelope.merchant_id,
        user_id,
        payload: body,
        occurred_at: envelope.occurred_at.unwrap_or_else(time::now),
    })
}

/// Parses incoming bus messages and feeds them to the engine.
pub struct EventIngestor<R, S, P> {
    engine: Arc<AutomationEngine<R, S, P>>,
    publisher: P,
}

impl<R, S, P> EventIngestor<R, S, P>
where
    R: AutomationRepository,
    S: ActionStore,
    P: EnginePublisher,
{
    /// Create a new ingestor.
    pub fn new(engine: Arc<AutomationEngine<R, S, P>>, publisher: P) -> Self {
        Self { engine, publisher }
    }

    /// Handle one raw message from the bus.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::MalformedEvent`] when the message is
    /// dropped, or a storage error when evaluation fails. Either way the
    /// caller is expected to log and move on to the next message.
    pub async fn handle_message(
        &self,
        topic: &str,
        payload: &[u8],
    ) -> Result<EvaluationOutcome, DripHubError> {
        let Ok(parsed) = topic.parse::<Topic>() else {
            return Err(self
                .drop_event(MalformedEventError {
                    topic: topic.to_owned(),
                    reason: "unknown topic".to_owned(),
                })
                .await);
        };

        let body: serde_json::Value = match serde_json::from_slice(payload) {
            Ok(body) => body,
            Err(err) => {
                return Err(self
                    .drop_event(MalformedEventError {
                        topic: topic.to_owned(),
                        reason: format!("invalid json: {err}"),
                    })
                    .await);
            }
        };

        self.handle_envelope(parsed, body).await
    }

    /// Handle an already-decoded message body arriving on `topic`.
    ///
    /// This is the entry point for in-process producers such as the
    /// event injection endpoint.
    ///
    /// # Errors
    ///
    /// Same contract as [`EventIngestor::handle_message`].
    pub async fn handle_envelope(
        &self,
        topic: Topic,
        body: serde_json::Value,
    ) -> Result<EvaluationOutcome, DripHubError> {
        let event = match parse_event(topic, body) {
            Ok(event) => event,
            Err(err) => return Err(self.drop_event(err).await),
        };
        self.engine.evaluate(&event).await
    }

    async fn drop_event(&self, error: MalformedEventError) -> DripHubError {
        tracing::warn!(topic = %error.topic, reason = %error.reason, "dropping event");
        let _ = self
            .publisher
            .publish(EngineEvent::EventDropped {
                topic: error.topic.clone(),
                reason: error.reason.clone(),
            })
            .await;
        error.into()
    }
}
