//! In-process engine bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use driphub_domain::error::DripHubError;

use crate::ports::{EngineEvent, EnginePublisher};

/// In-process engine bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEngineBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl InProcessEngineBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }
}

impl EnginePublisher for InProcessEngineBus {
    fn publish(&self, event: EngineEvent) -> impl Future<Output = Result<(), DripHubError>> + Send {
        // broadcast::send errors only when there are zero receivers;
        // that is not a publish failure.
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}
