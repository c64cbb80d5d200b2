//! Automation — trigger → condition → delayed action rules.
//!
//! An automation reacts to platform events on behalf of one merchant.
//! Its [`Trigger`] decides which events activate it, optional
//! [`Condition`]s must all hold against the event payload, and its
//! [`ActionStep`]s describe what to do and how long after the event to
//! do it. Steps are not executed inline; matching an event schedules
//! them durably.

mod condition;
mod step;
mod trigger;

pub mod presets;

pub use condition::Condition;
pub use step::{ActionKind, ActionStep};
pub use trigger::Trigger;

use serde::{Deserialize, Serialize};

use crate::error::{DripHubError, ValidationError};
use crate::event::Event;
use crate::id::{AutomationId, MerchantId};
use crate::time::Timestamp;

/// A rule that reacts to events by scheduling delayed actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationDefinition {
    pub id: AutomationId,
    pub merchant_id: MerchantId,
    pub name: String,
    pub enabled: bool,
    pub trigger: Trigger,
    pub conditions: Vec<Condition>,
    pub steps: Vec<ActionStep>,
    pub created_at: Timestamp,
}

impl AutomationDefinition {
    /// Create a builder scoped to one merchant.
    #[must_use]
    pub fn builder(merchant_id: MerchantId) -> AutomationBuilder {
        AutomationBuilder {
            merchant_id,
            id: None,
            name: None,
            enabled: None,
            trigger: None,
            conditions: Vec::new(),
            steps: Vec::new(),
            created_at: None,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `steps` is empty ([`ValidationError::NoSteps`])
    pub fn validate(&self) -> Result<(), DripHubError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.steps.is_empty() {
            return Err(ValidationError::NoSteps.into());
        }
        Ok(())
    }

    /// Check whether an event belongs to this automation's merchant and
    /// matches its trigger. Condition evaluation is separate.
    #[must_use]
    pub fn matches_event(&self, event: &Event) -> bool {
        self.merchant_id == event.merchant_id && self.trigger.matches_event(event)
    }

    /// Evaluate all conditions against an event payload (logical AND).
    ///
    /// An automation without conditions always passes.
    #[must_use]
    pub fn conditions_hold(&self, payload: &serde_json::Value) -> bool {
        self.conditions.iter().all(|c| c.evaluate(payload))
    }
}

/// Step-by-step builder for [`AutomationDefinition`].
#[derive(Debug)]
pub struct AutomationBuilder {
    merchant_id: MerchantId,
    id: Option<AutomationId>,
    name: Option<String>,
    enabled: Option<bool>,
    trigger: Option<Trigger>,
    conditions: Vec<Condition>,
    steps: Vec<ActionStep>,
    created_at: Option<Timestamp>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn step(mut self, step: ActionStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`DripHubError::Validation`] if required fields are missing
    /// or empty.
    pub fn build(self) -> Result<AutomationDefinition, DripHubError> {
        let automation = AutomationDefinition {
            id: self.id.unwrap_or_default(),
            merchant_id: self.merchant_id,
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            trigger: self.trigger.unwrap_or(Trigger::Manual),
            conditions: self.conditions,
            steps: self.steps,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
        };
        automation.validate()?;
        Ok(automation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Topic, types};
    use crate::id::UserId;

    fn valid_step() -> ActionStep {
        ActionStep::new(ActionKind::email("cart-abandoned"), 0)
    }

    fn cart_trigger() -> Trigger {
        Trigger::EventType {
            topic: Topic::Cart,
            event_type: types::CART_ABANDONED.to_string(),
        }
    }

    fn valid_automation(merchant_id: MerchantId) -> AutomationDefinition {
        AutomationDefinition::builder(merchant_id)
            .name("Cart abandonment")
            .trigger(cart_trigger())
            .step(valid_step())
            .build()
            .unwrap()
    }

    fn cart_event(merchant_id: MerchantId) -> Event {
        Event::new(
            Topic::Cart,
            types::CART_ABANDONED,
            merchant_id,
            UserId::new("shopper-1").unwrap(),
            serde_json::json!({ "total": 59.9 }),
        )
    }

    #[test]
    fn should_build_valid_automation_when_required_fields_provided() {
        let merchant = MerchantId::new();
        let auto = valid_automation(merchant);
        assert_eq!(auto.name, "Cart abandonment");
        assert_eq!(auto.merchant_id, merchant);
        assert!(auto.enabled);
        assert!(auto.conditions.is_empty());
        assert_eq!(auto.steps.len(), 1);
    }

    #[test]
    fn should_default_to_enabled_when_not_specified() {
        let auto = valid_automation(MerchantId::new());
        assert!(auto.enabled);
    }

    #[test]
    fn should_build_disabled_automation_when_enabled_is_false() {
        let auto = AutomationDefinition::builder(MerchantId::new())
            .name("Disabled rule")
            .enabled(false)
            .step(valid_step())
            .build()
            .unwrap();
        assert!(!auto.enabled);
    }

    #[test]
    fn should_default_to_manual_trigger_when_not_specified() {
        let auto = AutomationDefinition::builder(MerchantId::new())
            .name("Manual rule")
            .step(valid_step())
            .build()
            .unwrap();
        assert!(matches!(auto.trigger, Trigger::Manual));
    }

    #[test]
    fn should_return_validation_error_when_name_is_empty() {
        let result = AutomationDefinition::builder(MerchantId::new())
            .step(valid_step())
            .build();
        assert!(matches!(
            result,
            Err(DripHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_steps_is_empty() {
        let result = AutomationDefinition::builder(MerchantId::new())
            .name("No steps")
            .build();
        assert!(matches!(
            result,
            Err(DripHubError::Validation(ValidationError::NoSteps))
        ));
    }

    #[test]
    fn should_accumulate_multiple_conditions() {
        let auto = AutomationDefinition::builder(MerchantId::new())
            .name("Multi-condition")
            .step(valid_step())
            .condition(Condition::NumberAtLeast {
                field: "total".to_string(),
                min: 50.0,
            })
            .condition(Condition::Equals {
                field: "currency".to_string(),
                value: serde_json::json!("EUR"),
            })
            .build()
            .unwrap();
        assert_eq!(auto.conditions.len(), 2);
    }

    #[test]
    fn should_accumulate_multiple_steps_in_order() {
        let auto = AutomationDefinition::builder(MerchantId::new())
            .name("Multi-step")
            .step(ActionStep::new(ActionKind::email("cart-abandoned"), 0))
            .step(ActionStep::new(ActionKind::email("cart-abandoned-reminder"), 86_400))
            .build()
            .unwrap();
        assert_eq!(auto.steps.len(), 2);
        assert_eq!(auto.steps[1].delay_secs, 86_400);
    }

    #[test]
    fn should_set_custom_id_via_builder() {
        let id = AutomationId::new();
        let auto = AutomationDefinition::builder(MerchantId::new())
            .id(id)
            .name("Custom ID")
            .step(valid_step())
            .build()
            .unwrap();
        assert_eq!(auto.id, id);
    }

    #[test]
    fn should_roundtrip_automation_through_serde_json() {
        let auto = valid_automation(MerchantId::new());
        let json = serde_json::to_string(&auto).unwrap();
        let parsed: AutomationDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, auto.id);
        assert_eq!(parsed.merchant_id, auto.merchant_id);
        assert_eq!(parsed.name, auto.name);
        assert_eq!(parsed.steps.len(), auto.steps.len());
    }

    #[test]
    fn should_match_event_for_same_merchant_and_trigger() {
        let merchant = MerchantId::new();
        let auto = valid_automation(merchant);
        assert!(auto.matches_event(&cart_event(merchant)));
    }

    #[test]
    fn should_not_match_event_from_other_merchant() {
        let auto = valid_automation(MerchantId::new());
        assert!(!auto.matches_event(&cart_event(MerchantId::new())));
    }

    #[test]
    fn should_hold_conditions_when_all_pass() {
        let merchant = MerchantId::new();
        let auto = AutomationDefinition::builder(merchant)
            .name("High-value carts")
            .trigger(cart_trigger())
            .condition(Condition::NumberAtLeast {
                field: "total".to_string(),
                min: 50.0,
            })
            .step(valid_step())
            .build()
            .unwrap();

        assert!(auto.conditions_hold(&serde_json::json!({ "total": 59.9 })));
        assert!(!auto.conditions_hold(&serde_json::json!({ "total": 10.0 })));
    }

    #[test]
    fn should_hold_conditions_when_none_defined() {
        let auto = valid_automation(MerchantId::new());
        assert!(auto.conditions_hold(&serde_json::json!({})));
    }
}
