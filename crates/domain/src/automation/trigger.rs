//! Trigger — the event pattern that activates an automation.

use serde::{Deserialize, Serialize};

use crate::event::{Event, Topic};

/// Describes what should activate an automation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires when an event of `event_type` arrives on `topic`.
    EventType { topic: Topic, event_type: String },
    /// Fires only when started manually via the API.
    Manual,
}

impl Trigger {
    /// Check whether this trigger matches a given event.
    ///
    /// `Manual` triggers never match ingested events; they are activated
    /// through the trigger endpoint.
    #[must_use]
    pub fn matches_event(&self, event: &Event) -> bool {
        match self {
            Self::EventType { topic, event_type } => {
                *topic == event.topic && *event_type == event.event_type
            }
            Self::Manual => false,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventType { topic, event_type } => write!(f, "event_type({topic}/{event_type})"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::types;
    use crate::id::{MerchantId, UserId};

    fn cart_event(event_type: &str) -> Event {
        Event::new(
            Topic::Cart,
            event_type,
            MerchantId::new(),
            UserId::new("shopper-1").unwrap(),
            serde_json::json!({}),
        )
    }

    #[test]
    fn should_match_when_topic_and_event_type_match() {
        let trigger = Trigger::EventType {
            topic: Topic::Cart,
            event_type: types::CART_ABANDONED.to_string(),
        };
        assert!(trigger.matches_event(&cart_event(types::CART_ABANDONED)));
    }

    #[test]
    fn should_not_match_when_event_type_differs() {
        let trigger = Trigger::EventType {
            topic: Topic::Cart,
            event_type: types::CART_ABANDONED.to_string(),
        };
        assert!(!trigger.matches_event(&cart_event("cart_updated")));
    }

    #[test]
    fn should_not_match_when_topic_differs() {
        let trigger = Trigger::EventType {
            topic: Topic::Order,
            event_type: types::CART_ABANDONED.to_string(),
        };
        assert!(!trigger.matches_event(&cart_event(types::CART_ABANDONED)));
    }

    #[test]
    fn should_not_match_manual_trigger_against_events() {
        assert!(!Trigger::Manual.matches_event(&cart_event(types::CART_ABANDONED)));
    }

    #[test]
    fn should_display_trigger_variants() {
        let t = Trigger::EventType {
            topic: Topic::Cart,
            event_type: types::CART_ABANDONED.to_string(),
        };
        assert_eq!(t.to_string(), "event_type(cart.events/cart_abandoned)");
        assert_eq!(Trigger::Manual.to_string(), "manual");
    }

    #[test]
    fn should_roundtrip_trigger_through_serde_json() {
        let triggers = vec![
            Trigger::EventType {
                topic: Topic::User,
                event_type: types::USER_CREATED.to_string(),
            },
            Trigger::Manual,
        ];

        for trigger in &triggers {
            let json = serde_json::to_string(trigger).unwrap();
            let parsed: Trigger = serde_json::from_str(&json).unwrap();
            assert_eq!(&parsed, trigger);
        }
    }

    #[test]
    fn should_tag_serialized_trigger_with_type() {
        let trigger = Trigger::EventType {
            topic: Topic::User,
            event_type: types::USER_CREATED.to_string(),
        };
        let json = serde_json::to_value(&trigger).unwrap();
        assert_eq!(json["type"], "event_type");
        assert_eq!(json["topic"], "user.events");
    }
}
