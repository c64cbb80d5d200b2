//! In-memory port implementations shared by the unit tests.
//!
//! The action store fake goes through the domain status machine for
//! every transition, so tests against it exercise the same rules the
//! real store enforces in SQL.

use std::future::Future;
use std::sync::Mutex;

use driphub_domain::automation::{AutomationDefinition, Trigger};
use driphub_domain::error::DripHubError;
use driphub_domain::event::Topic;
use driphub_domain::id::{ActionId, AutomationId, MerchantId, UserId};
use driphub_domain::schedule::{ActionStatus, ScheduledAction};
use driphub_domain::time::Timestamp;

use crate::ports::{
    ActionStore, AdsAudienceGateway, AutomationRepository, EngineEvent, EnginePublisher,
    NotificationGateway, ProviderError, SyncError,
};

// ── In-memory automation repo ──────────────────────────────────────

pub(crate) struct InMemoryAutomationRepo {
    store: Mutex<Vec<AutomationDefinition>>,
}

impl InMemoryAutomationRepo {
    pub(crate) fn with(automations: Vec<AutomationDefinition>) -> Self {
        Self {
            store: Mutex::new(automations),
        }
    }
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

// ── In-memory action store ─────────────────────────────────────────

pub(crate) struct InMemoryActionStore {
    store: Mutex<Vec<ScheduledAction>>,
}

impl Default for InMemoryActionStore {
    fn default() -> Self {
        Self {
            store: Mutex::new(Vec::new()),
        }
    }
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

    pub(crate) fn get(&self, id: ActionId) -> ScheduledAction {
        self.store
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .unwrap()
    }

    /// Mutate one stored action in place, e.g. to age its `fire_at`.
    pub(crate) fn tweak(&self, id: ActionId, f: impl FnOnce(&mut ScheduledAction)) {
        let mut store = self.store.lock().unwrap();
        let action = store.iter_mut().find(|a| a.id == id).unwrap();
        f(action);
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
                // Row-level reclaim, mirroring what the SQL update does.
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

// ── Recording gateways ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SentMessage {
    pub(crate) channel: &'static str,
    pub(crate) recipient: String,
    pub(crate) template_id: String,
    pub(crate) dedupe_key: ActionId,
}

pub(crate) struct RecordingNotifications {
    pub(crate) sent: Mutex<Vec<SentMessage>>,
    fail_next: Mutex<Option<ProviderError>>,
}

impl Default for RecordingNotifications {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
        }
    }
}

impl RecordingNotifications {
    /// Make the next send fail with `error`.
    pub(crate) fn fail_next(&self, error: ProviderError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    fn record(
        &self,
        channel: &'static str,
        recipient: &str,
        template_id: &str,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }
        self.sent.lock().unwrap().push(SentMessage {
            channel,
            recipient: recipient.to_owned(),
            template_id: template_id.to_owned(),
            dedupe_key,
        });
        Ok(())
    }
}

impl NotificationGateway for RecordingNotifications {
    fn send_email(
        &self,
        recipient: &str,
        template_id: &str,
        _data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        let r = self.record("email", recipient, template_id, dedupe_key);
        async move { r }
    }
    fn send_sms(
        &self,
        recipient: &str,
        template_id: &str,
        _data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        let r = self.record("sms", recipient, template_id, dedupe_key);
        async move { r }
    }
}

pub(crate) struct RecordingAudiences {
    pub(crate) synced: Mutex<Vec<(String, String, Vec<UserId>)>>,
}

impl Default for RecordingAudiences {
    fn default() -> Self {
        Self {
            synced: Mutex::new(Vec::new()),
        }
    }
}

impl AdsAudienceGateway for RecordingAudiences {
    fn sync_audience(
        &self,
        account_id: &str,
        audience_id: &str,
        user_ids: &[UserId],
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        self.synced.lock().unwrap().push((
            account_id.to_owned(),
            audience_id.to_owned(),
            user_ids.to_vec(),
        ));
        async { Ok(()) }
    }
}

// ── Spy publisher ──────────────────────────────────────────────────

pub(crate) struct SpyPublisher {
    pub(crate) events: Mutex<Vec<EngineEvent>>,
}

impl Default for SpyPublisher {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl EnginePublisher for SpyPublisher {
    fn publish(&self, event: EngineEvent) -> impl Future<Output = Result<(), DripHubError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
