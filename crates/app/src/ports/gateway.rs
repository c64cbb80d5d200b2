//! Gateway ports — outbound providers for notifications and ad audiences.
//!
//! Providers are swappable: the executor only sees these traits and the
//! transient/permanent split of their errors, which drives the retry
//! decision.

use std::future::Future;
use std::sync::Arc;

use driphub_domain::id::{ActionId, UserId};

/// Failure sending a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Worth retrying: timeout, rate limit, provider 5xx.
    #[error("transient provider error: {reason}")]
    Transient { reason: String },
    /// Retrying cannot help: invalid recipient, rejected template.
    #[error("permanent provider error: {reason}")]
    Permanent { reason: String },
}

impl ProviderError {
    /// Transient failure shorthand.
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Permanent failure shorthand.
    #[must_use]
    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent {
            reason: reason.into(),
        }
    }

    /// Whether a retry with backoff could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// Failure syncing an ad audience.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("transient audience sync error: {reason}")]
    Transient { reason: String },
    #[error("permanent audience sync error: {reason}")]
    Permanent { reason: String },
}

impl From<SyncError> for ProviderError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Transient { reason } => Self::Transient { reason },
            SyncError::Permanent { reason } => Self::Permanent { reason },
        }
    }
}

/// Sends templated notifications to end users.
///
/// `dedupe_key` is the scheduled action id; providers that support
/// idempotency keys use it so an at-least-once retry cannot double-send.
pub trait NotificationGateway {
    /// Send a templated email.
    fn send_email(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Send a templated SMS.
    fn send_sms(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

impl<T: NotificationGateway + Send + Sync> NotificationGateway for Arc<T> {
    fn send_email(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        (**self).send_email(recipient, template_id, data, dedupe_key)
    }

    fn send_sms(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send {
        (**self).send_sms(recipient, template_id, data, dedupe_key)
    }
}

/// Pushes users into advertising custom audiences.
pub trait AdsAudienceGateway {
    /// Add users to an audience on a connected ad account.
    fn sync_audience(
        &self,
        account_id: &str,
        audience_id: &str,
        user_ids: &[UserId],
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

impl<T: AdsAudienceGateway + Send + Sync> AdsAudienceGateway for Arc<T> {
    fn sync_audience(
        &self,
        account_id: &str,
        audience_id: &str,
        user_ids: &[UserId],
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        (**self).sync_audience(account_id, audience_id, user_ids)
    }
}
