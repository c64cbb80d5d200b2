//! Recording gateways that stand in for real providers.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use driphub_app::ports::{AdsAudienceGateway, NotificationGateway, ProviderError, SyncError};
use driphub_domain::id::{ActionId, UserId};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivery channel of a recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Sms,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Sms => f.write_str("sms"),
        }
    }
}

/// A notification the virtual gateway accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNotification {
    pub channel: Channel,
    pub recipient: String,
    pub template_id: String,
    pub data: serde_json::Value,
    pub dedupe_key: ActionId,
}

/// In-memory [`NotificationGateway`] for demos and tests.
///
/// Every send succeeds and is recorded in call order. Queue failures
/// with [`VirtualNotificationGateway::fail_next`] to exercise retry
/// handling.
#[derive(Default)]
pub struct VirtualNotificationGateway {
    sent: Mutex<Vec<RecordedNotification>>,
    failures: Mutex<VecDeque<ProviderError>>,
}

impl VirtualNotificationGateway {
    /// Snapshot of everything sent so far, in call order.
    #[must_use]
    pub fn sent(&self) -> Vec<RecordedNotification> {
        lock(&self.sent).clone()
    }

    /// Make the next `n` sends fail with `error` before recording
    /// resumes.
    pub fn fail_next(&self, n: u32, error: ProviderError) {
        let mut failures = lock(&self.failures);
        for _ in 0..n {
            failures.push_back(error.clone());
        }
    }

    fn deliver(
        &self,
        channel: Channel,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        if let Some(err) = lock(&self.failures).pop_front() {
            tracing::info!(%channel, recipient, error = %err, "virtual gateway failing on request");
            return Err(err);
        }
        tracing::info!(%channel, recipient, template_id, %dedupe_key, "virtual notification delivered");
        lock(&self.sent).push(RecordedNotification {
            channel,
            recipient: recipient.to_owned(),
            template_id: template_id.to_owned(),
            data: data.clone(),
            dedupe_key,
        });
        Ok(())
    }
}

impl NotificationGateway for VirtualNotificationGateway {
    async fn send_email(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        self.deliver(Channel::Email, recipient, template_id, data, dedupe_key)
    }

    async fn send_sms(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        self.deliver(Channel::Sms, recipient, template_id, data, dedupe_key)
    }
}

/// One audience sync the virtual gateway accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSync {
    pub account_id: String,
    pub audience_id: String,
    pub user_ids: Vec<UserId>,
}

/// In-memory [`AdsAudienceGateway`] for demos and tests.
#[derive(Default)]
pub struct VirtualAdsGateway {
    synced: Mutex<Vec<RecordedSync>>,
    failures: Mutex<VecDeque<SyncError>>,
}

impl VirtualAdsGateway {
    /// Snapshot of every sync so far, in call order.
    #[must_use]
    pub fn synced(&self) -> Vec<RecordedSync> {
        lock(&self.synced).clone()
    }

    /// Make the next `n` syncs fail with `error`.
    pub fn fail_next(&self, n: u32, error: SyncError) {
        let mut failures = lock(&self.failures);
        for _ in 0..n {
            failures.push_back(error.clone());
        }
    }
}

impl AdsAudienceGateway for VirtualAdsGateway {
    async fn sync_audience(
        &self,
        account_id: &str,
        audience_id: &str,
        user_ids: &[UserId],
    ) -> Result<(), SyncError> {
        if let Some(err) = lock(&self.failures).pop_front() {
            tracing::info!(account_id, audience_id, error = %err, "virtual gateway failing on request");
            return Err(err);
        }
        tracing::info!(account_id, audience_id, users = user_ids.len(), "virtual audience synced");
        lock(&self.synced).push(RecordedSync {
            account_id: account_id.to_owned(),
            audience_id: audience_id.to_owned(),
            user_ids: user_ids.to_vec(),
        });
        Ok(())
    }
}
