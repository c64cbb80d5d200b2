//! Automation repository port — persistence for automation definitions.

use std::future::Future;
use std::sync::Arc;

use driphub_domain::automation::AutomationDefinition;
use driphub_domain::error::DripHubError;
use driphub_domain::event::Topic;
use driphub_domain::id::{AutomationId, MerchantId};

/// Repository for persisting and querying [`AutomationDefinition`]s.
pub trait AutomationRepository {
    /// Create a new automation in storage.
    fn create(
        &self,
        automation: AutomationDefinition,
    ) -> impl Future<Output = Result<AutomationDefinition, DripHubError>> + Send;

    /// Get an automation by its unique identifier.
    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationDefinition>, DripHubError>> + Send;

    /// Get all automations.
    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, DripHubError>> + Send;

    /// Get the enabled automations of one merchant whose trigger listens
    /// for `event_type` on `topic`. This is the engine's hot-path lookup.
    fn find_matching(
        &self,
        merchant_id: MerchantId,
        topic: Topic,
        event_type: &str,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, DripHubError>> + Send;

    /// Update an existing automation.
    fn update(
        &self,
        automation: AutomationDefinition,
    ) -> impl Future<Output = Result<AutomationDefinition, DripHubError>> + Send;

    /// Delete an automation by its unique identifier.
    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), DripHubError>> + Send;
}

impl<T: AutomationRepository + Send + Sync> AutomationRepository for Arc<T> {
    fn create(
        &self,
        automation: AutomationDefinition,
    ) -> impl Future<Output = Result<AutomationDefinition, DripHubError>> + Send {
        (**self).create(automation)
    }

    fn get_by_id(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationDefinition>, DripHubError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, DripHubError>> + Send {
        (**self).get_all()
    }

    fn find_matching(
        &self,
        merchant_id: MerchantId,
        topic: Topic,
        event_type: &str,
    ) -> impl Future<Output = Result<Vec<AutomationDefinition>, DripHubError>> + Send {
        (**self).find_matching(merchant_id, topic, event_type)
    }

    fn update(
        &self,
        automation: AutomationDefinition,
    ) -> impl Future<Output = Result<AutomationDefinition, DripHubError>> + Send {
        (**self).update(automation)
    }

    fn delete(&self, id: AutomationId) -> impl Future<Output = Result<(), DripHubError>> + Send {
        (**self).delete(id)
    }
}
