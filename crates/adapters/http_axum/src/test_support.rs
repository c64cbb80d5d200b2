//! In-memory ports and state builders for the handler tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use driphub_app::automation_engine::AutomationEngine;
use driphub_app::event_ingestor::EventIngestor;
use driphub_app::ports::{ActionStore, AutomationRepository, EngineEvent, EnginePublisher};
use driphub_app::services::automation_service::AutomationService;
use driphub_app::services::sequence_service::SequenceService;
use driphub_domain::automation::{AutomationDefinition, Trigger};
use driphub_domain::error::DripHubError;
use driphub_domain::event::Topic;
use driphub_domain::id::{ActionId, AutomationId, MerchantId, UserId};
use driphub_domain::schedule::{ActionStatus, ScheduledAction};
use driphub_domain::time::Timestamp;

use crate::state::AppState;

#[derive(Default)]
pub(crate) struct InMemoryAutomationRepo {
    store: Mutex<Vec<AutomationDefinition>>,
}

impl AutomationRepository for InMemoryAutomationRepo {
    fn create(
        &self,
        automation: AutomationDefinition,
    ) -> impl Future<Output = Result<AutomationDefinition, DripHubError>> + Send {
        self.store.lock().unwrap().push(automation.clone());
        async { Ok(automation) }
    }
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationDefinition>, DripHubError>> + Send {
        let r = self
            .store
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned();
        async { Ok(r) }
    }
    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, DripHubError>> + Send {
        let r = self.store.lock().unwrap().clone();
        async { Ok(r) }
    }
    fn find_matching(
        &self,
        merchant_id: MerchantId,
        topic: Topic,
        event_type: &str,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, DripHubError>> + Send {
        let r: Vec<_> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                a.merchant_id == merchant_id
                    && a.enabled
                    && matches!(
                        &a.trigger,
                        Trigger::EventType { topic: t, event_type: et }
                            if *t == topic && et == event_type
                    )
            })
            .cloned()
            .collect();
        async { Ok(r) }
    }
    fn update(
        &self,
        automation: AutomationDefinition,
    ) -> impl Future<Output = Result<AutomationDefinition, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.retain(|a| a.id != automation.id);
        store.push(automation.clone());
        async { Ok(automation) }
    }
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), DripHubError>> + Send {
        self.store.lock().unwrap().retain(|a| a.id != id);
        async { Ok(()) }
    }
}

#[derive(Default)]
pub(crate) struct InMemoryActionStore {
    store: Mutex<Vec<ScheduledAction>>,
}

impl InMemoryActionStore {
    pub(crate) fn with(actions: Vec<ScheduledAction>) -> Self {
        Self {
            store: Mutex::new(actions),
        }
    }

    pub(crate) fn all(&self) -> Vec<ScheduledAction> {
        self.store.lock().unwrap().clone()
    }
}

impl ActionStore for InMemoryActionStore {
    fn enqueue(
        &self,
        actions: Vec<ScheduledAction>,
    ) -> impl Future<Output = Result<u32, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let mut inserted = 0;
        for action in actions {
            if !store.iter().any(|a| a.dedup_key() == action.dedup_key()) {
                store.push(action);
                inserted += 1;
            }
        }
        async move { Ok(inserted) }
    }
    fn claim_due(
        &self,
        now: Timestamp,
        claim_timeout: chrono::Duration,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ScheduledAction>, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let mut claimed = Vec::new();
        for action in store.iter_mut() {
            if claimed.len() >= limit as usize {
                break;
            }
            if action.is_due(now) || action.claim_expired(now, claim_timeout) {
                action.status = ActionStatus::Pending;
                action.claim(now).unwrap();
                claimed.push(action.clone());
            }
        }
        async move { Ok(claimed) }
    }
    fn mark_fired(&self, id: ActionId) -> impl Future<Output = Result<bool, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let r = store
            .iter_mut()
            .find(|a| a.id == id)
            .is_some_and(|a| a.fire().is_ok());
        async move { Ok(r) }
    }
    fn mark_failed(
        &self,
        id: ActionId,
        error: &str,
    ) -> impl Future<Output = Result<bool, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let r = store
            .iter_mut()
            .find(|a| a.id == id)
            .is_some_and(|a| a.fail(error).is_ok());
        async move { Ok(r) }
    }
    fn reschedule(
        &self,
        id: ActionId,
        fire_at: Timestamp,
        error: &str,
    ) -> impl Future<Output = Result<bool, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let r = store
            .iter_mut()
            .find(|a| a.id == id)
            .is_some_and(|a| a.retry(fire_at, error).is_ok());
        async move { Ok(r) }
    }
    fn cancel_pending(
        &self,
        automation_id: AutomationId,
        user_id: &UserId,
    ) -> impl Future<Output = Result<u32, DripHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let mut cancelled = 0;
        for action in store
            .iter_mut()
            .filter(|a| a.automation_id == automation_id && a.user_id == *user_id)
        {
            if action.cancel().is_ok() {
                cancelled += 1;
            }
        }
        async move { Ok(cancelled) }
    }
    fn get_by_id(
        &self,
        id: ActionId,
    ) -> impl Future<Output = Result<Option<ScheduledAction>, DripHubError>> + Send {
        let r = self
            .store
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned();
        async move { Ok(r) }
    }
    fn list(
        &self,
        status: Option<ActionStatus>,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<ScheduledAction>, DripHubError>> + Send {
        let store = self.store.lock().unwrap();
        let mut r: Vec<_> = store
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        r.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        r.truncate(limit as usize);
        async move { Ok(r) }
    }
}

pub(crate) struct NullPublisher;

impl EnginePublisher for NullPublisher {
    fn publish(
        &self,
        _event: EngineEvent,
    ) -> impl Future<Output = Result<(), DripHubError>> + Send {
        async { Ok(()) }
    }
}

pub(crate) type TestState =
    AppState<Arc<InMemoryAutomationRepo>, Arc<InMemoryActionStore>, NullPublisher>;

pub(crate) fn state() -> TestState {
    state_with(
        Arc::new(InMemoryAutomationRepo::default()),
        Arc::new(InMemoryActionStore::default()),
    )
}

pub(crate) fn state_with(
    repo: Arc<InMemoryAutomationRepo>,
    store: Arc<InMemoryActionStore>,
) -> TestState {
    let engine = Arc::new(AutomationEngine::new(repo.clone(), store.clone(), NullPublisher));
    AppState::new(
        Arc::new(AutomationService::new(repo)),
        Arc::new(SequenceService::new(store)),
        engine.clone(),
        Arc::new(EventIngestor::new(engine, NullPublisher)),
    )
}
