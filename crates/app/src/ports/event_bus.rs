//! Engine event port — publish/subscribe for engine lifecycle events.

use std::future::Future;

use driphub_domain::automation::ActionKind;
use driphub_domain::error::DripHubError;
use driphub_domain::id::{ActionId, AutomationId, UserId};

/// Something the engine did that other parts of the system may care about.
///
/// These are internal lifecycle notifications, not the external bus events
/// that feed the ingestor.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An automation matched an event and its steps were enqueued.
    SequenceScheduled {
        automation_id: AutomationId,
        automation_name: String,
        user_id: UserId,
        actions: u32,
    },
    /// A scheduled action was dispatched to its gateway successfully.
    ActionFired {
        action_id: ActionId,
        kind: ActionKind,
        user_id: UserId,
    },
    /// A scheduled action exhausted its attempts or failed permanently.
    ActionFailed {
        action_id: ActionId,
        user_id: UserId,
        error: String,
        attempts: u32,
    },
    /// An incoming bus message was dropped before evaluation.
    EventDropped { topic: String, reason: String },
}

/// Publishes engine events to interested subscribers.
pub trait EnginePublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: EngineEvent) -> impl Future<Output = Result<(), DripHubError>> + Send;
}

impl<T: EnginePublisher + Send + Sync> EnginePublisher for std::sync::Arc<T> {
    fn publish(&self, event: EngineEvent) -> impl Future<Output = Result<(), DripHubError>> + Send {
        (**self).publish(event)
    }
}
