//! Shared application state for axum handlers.

use std::sync::Arc;

use driphub_app::automation_engine::AutomationEngine;
use driphub_app::event_ingestor::EventIngestor;
use driphub_app::ports::{ActionStore, AutomationRepository, EnginePublisher};
use driphub_app::services::automation_service::AutomationService;
use driphub_app::services::sequence_service::SequenceService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository, action store and engine publisher types
/// to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone` — only the
/// `Arc` wrappers are cloned. Everything is taken pre-wrapped because
/// the engine and ingestor are shared with background tasks (the bus
/// consumer, the sweep loop).
pub struct AppState<R, S, P> {
    /// Automation definition CRUD service.
    pub automation_service: Arc<AutomationService<R>>,
    /// Scheduled-action queries and cancellation.
    pub sequence_service: Arc<SequenceService<S>>,
    /// Engine, for manual sequence starts.
    pub engine: Arc<AutomationEngine<R, S, P>>,
    /// Ingestor, for direct event injection.
    pub ingestor: Arc<EventIngestor<R, S, P>>,
}

impl<R, S, P> Clone for AppState<R, S, P> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            sequence_service: Arc::clone(&self.sequence_service),
            engine: Arc::clone(&self.engine),
            ingestor: Arc::clone(&self.ingestor),
        }
    }
}

impl<R, S, P> AppState<R, S, P>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    /// Create the application state from pre-wrapped services.
    pub fn new(
        automation_service: Arc<AutomationService<R>>,
        sequence_service: Arc<SequenceService<S>>,
        engine: Arc<AutomationEngine<R, S, P>>,
        ingestor: Arc<EventIngestor<R, S, P>>,
    ) -> Self {
        Self {
            automation_service,
            sequence_service,
            engine,
            ingestor,
        }
    }
}
