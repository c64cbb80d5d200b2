//! Built-in lifecycle sequences a merchant can start from.
//!
//! Delays and template names mirror the classic e-commerce playbook:
//! immediate touch, a reminder after a day, a last chance after three.

use serde_json::json;

use crate::event::{Topic, types};
use crate::id::MerchantId;
use crate::time;

use super::{ActionKind, ActionStep, AutomationDefinition, Condition, Trigger};

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Recover abandoned carts: nudge now, remind after 24h, discount after 72h.
#[must_use]
pub fn cart_abandonment(merchant_id: MerchantId) -> AutomationDefinition {
    AutomationDefinition {
        id: crate::id::AutomationId::new(),
        merchant_id,
        name: "Cart abandonment".to_string(),
        enabled: true,
        trigger: Trigger::EventType {
            topic: Topic::Cart,
            event_type: types::CART_ABANDONED.to_string(),
        },
        conditions: Vec::new(),
        steps: vec![
            ActionStep::new(ActionKind::email("cart-abandoned"), 0),
            ActionStep::new(ActionKind::email("cart-abandoned-reminder"), DAY)
                .with_data(json!({ "discount": "10%" })),
            ActionStep::new(ActionKind::email("cart-abandoned-final"), 3 * DAY)
                .with_data(json!({ "discount": "15%", "last_chance": true })),
        ],
        created_at: time::now(),
    }
}

/// Welcome new users: greet now, guide after a day, offer after three.
#[must_use]
pub fn welcome(merchant_id: MerchantId) -> AutomationDefinition {
    AutomationDefinition {
        id: crate::id::AutomationId::new(),
        merchant_id,
        name: "Welcome sequence".to_string(),
        enabled: true,
        trigger: Trigger::EventType {
            topic: Topic::User,
            event_type: types::USER_CREATED.to_string(),
        },
        conditions: Vec::new(),
        steps: vec![
            ActionStep::new(ActionKind::email("welcome"), 0),
            ActionStep::new(ActionKind::email("welcome-guide"), DAY),
            ActionStep::new(ActionKind::email("welcome-offer"), 3 * DAY)
                .with_data(json!({ "discount": "10%" })),
        ],
        created_at: time::now(),
    }
}

/// Follow up on paid orders: confirm now, shipping note after two days,
/// review ask after seven.
#[must_use]
pub fn post_purchase(merchant_id: MerchantId) -> AutomationDefinition {
    AutomationDefinition {
        id: crate::id::AutomationId::new(),
        merchant_id,
        name: "Post-purchase follow-up".to_string(),
        enabled: true,
        trigger: Trigger::EventType {
            topic: Topic::Order,
            event_type: types::ORDER_PAID.to_string(),
        },
        conditions: Vec::new(),
        steps: vec![
            ActionStep::new(ActionKind::email("order-confirmation"), 0),
            ActionStep::new(ActionKind::email("order-shipping"), 2 * DAY),
            ActionStep::new(ActionKind::email("order-review"), 7 * DAY),
        ],
        created_at: time::now(),
    }
}

/// Re-engage users inactive for 30 days or more, and feed them into a
/// retargeting audience.
#[must_use]
pub fn win_back(merchant_id: MerchantId) -> AutomationDefinition {
    AutomationDefinition {
        id: crate::id::AutomationId::new(),
        merchant_id,
        name: "Win-back".to_string(),
        enabled: true,
        trigger: Trigger::EventType {
            topic: Topic::User,
            event_type: types::USER_INACTIVE.to_string(),
        },
        conditions: vec![Condition::NumberAtLeast {
            field: "days_inactive".to_string(),
            min: 30.0,
        }],
        steps: vec![
            ActionStep::new(ActionKind::email("win-back"), 0)
                .with_data(json!({ "discount": "20%" })),
            ActionStep::new(ActionKind::sync_audience("facebook", "lapsed-customers"), 0),
        ],
        created_at: time::now(),
    }
}

/// Every preset, for seeding a fresh merchant.
#[must_use]
pub fn all(merchant_id: MerchantId) -> Vec<AutomationDefinition> {
    vec![
        cart_abandonment(merchant_id),
        welcome(merchant_id),
        post_purchase(merchant_id),
        win_back(merchant_id),
    ]
}
