//! Automation service — use-cases for managing automation definitions.

use driphub_domain::automation::AutomationDefinition;
use driphub_domain::error::{DripHubError, NotFoundError};
use driphub_domain::id::AutomationId;

use crate::ports::AutomationRepository;

/// Application service for automation CRUD operations.
pub struct AutomationService<R> {
    repo: R,
}

impl<R: AutomationRepository> AutomationService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a new automation after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, automation), fields(automation_name = %automation.name))]
    pub async fn create_automation(
        &self,
        automation: AutomationDefinition,
    ) -> Result<AutomationDefinition, DripHubError> {
        automation.validate()?;
        self.repo.create(automation).await
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::NotFound`] when no automation with `id`
    /// exists, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_automation(
        &self,
        id: AutomationId,
    ) -> Result<AutomationDefinition, DripHubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_automations(&self) -> Result<Vec<AutomationDefinition>, DripHubError> {
        self.repo.get_all().await
    }

    /// Update an existing automation.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::Validation`] if invariants fail, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, automation))]
    pub async fn update_automation(
        &self,
        automation: AutomationDefinition,
    ) -> Result<AutomationDefinition, DripHubError> {
        automation.validate()?;
        self.repo.update(automation).await
    }

    /// Delete an automation by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_automation(&self, id: AutomationId) -> Result<(), DripHubError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryAutomationRepo;
    use driphub_domain::automation::{ActionKind, ActionStep, Trigger};
    use driphub_domain::error::ValidationError;
    use driphub_domain::event::{Topic, types};
    use driphub_domain::id::MerchantId;

    fn make_service() -> AutomationService<InMemoryAutomationRepo> {
        AutomationService::new(InMemoryAutomationRepo::with(Vec::new()))
    }

    fn valid_automation() -> AutomationDefinition {
        AutomationDefinition::builder(MerchantId::new())
            .name("Cart recovery")
            .trigger(Trigger::EventType {
                topic: Topic::Cart,
                event_type: types::CART_ABANDONED.to_string(),
            })
            .step(ActionStep::new(ActionKind::email("cart-abandoned"), 0))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_automation_when_valid() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;

        let created = svc.create_automation(auto).await.unwrap();
        assert_eq!(created.id, id);

        let fetched = svc.get_automation(id).await.unwrap();
        assert_eq!(fetched.name, "Cart recovery");
    }

    #[tokio::test]
    async fn should_reject_create_when_name_is_empty() {
        let svc = make_service();
        let mut auto = valid_automation();
        auto.name = String::new();

        let result = svc.create_automation(auto).await;
        assert!(matches!(
            result,
            Err(DripHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_reject_update_that_drops_every_step() {
        let svc = make_service();
        let auto = valid_automation();
        svc.create_automation(auto.clone()).await.unwrap();

        let mut updated = auto;
        updated.steps.clear();
        let result = svc.update_automation(updated).await;
        assert!(matches!(
            result,
            Err(DripHubError::Validation(ValidationError::NoSteps))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_automation_missing() {
        let svc = make_service();
        let result = svc.get_automation(AutomationId::new()).await;
        assert!(matches!(result, Err(DripHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_all_automations() {
        let svc = make_service();
        svc.create_automation(valid_automation()).await.unwrap();
        let mut auto2 = valid_automation();
        auto2.name = "Second".to_string();
        svc.create_automation(auto2).await.unwrap();

        let all = svc.list_automations().await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn should_update_automation() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;
        svc.create_automation(auto).await.unwrap();

        let mut updated = svc.get_automation(id).await.unwrap();
        updated.name = "Updated name".to_string();
        updated.enabled = false;
        let saved = svc.update_automation(updated).await.unwrap();
        assert_eq!(saved.name, "Updated name");
        assert!(!saved.enabled);
    }

    #[tokio::test]
    async fn should_delete_automation() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;
        svc.create_automation(auto).await.unwrap();

        svc.delete_automation(id).await.unwrap();

        let result = svc.get_automation(id).await;
        assert!(matches!(result, Err(DripHubError::NotFound(_))));
    }
}
