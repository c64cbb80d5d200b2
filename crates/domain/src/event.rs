//! Event — an immutable fact received from the commerce platform.
//!
//! Events arrive on a small, closed set of [`Topic`]s; the `event_type`
//! within a topic is an open string (`"user.created"`, `"cart_abandoned"`,
//! …) so new event kinds never require a schema change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::id::{EventId, MerchantId, UserId};
use crate::time::{self, Timestamp};

/// Well-known event types emitted by the commerce platform.
///
/// This list is not exhaustive; automations may match any string.
pub mod types {
    pub const USER_CREATED: &str = "user.created";
    pub const USER_REGISTERED: &str = "user.registered";
    pub const USER_INACTIVE: &str = "user.inactive";
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_PAID: &str = "order.paid";
    pub const CART_ABANDONED: &str = "cart_abandoned";
}

/// Logical stream an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Account lifecycle: signups, profile changes, inactivity.
    #[serde(rename = "user.events")]
    User,
    /// Order lifecycle: creation, payment, fulfilment.
    #[serde(rename = "order.events")]
    Order,
    /// Catalog interactions: views, searches.
    #[serde(rename = "product.events")]
    Product,
    /// Cart lifecycle, most importantly abandonment.
    #[serde(rename = "cart.events")]
    Cart,
}

impl Topic {
    /// Every topic the platform publishes on, in subscription order.
    pub const ALL: [Self; 4] = [Self::User, Self::Order, Self::Product, Self::Cart];

    /// Wire name of the topic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user.events",
            Self::Order => "order.events",
            Self::Product => "product.events",
            Self::Cart => "cart.events",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown topic name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic: {0}")]
pub struct UnknownTopicError(pub String);

impl FromStr for Topic {
    type Err = UnknownTopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user.events" => Ok(Self::User),
            "order.events" => Ok(Self::Order),
            "product.events" => Ok(Self::Product),
            "cart.events" => Ok(Self::Cart),
            other => Err(UnknownTopicError(other.to_string())),
        }
    }
}

/// An immutable fact about something that happened on the platform.
///
/// Events are append-only inputs: driphub never mutates or re-emits them,
/// it only reacts by scheduling actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, assigned by the producer or on ingest.
    pub id: EventId,
    /// Stream the event arrived on.
    pub topic: Topic,
    /// Producer-defined type within the topic, e.g. `"order.paid"`.
    pub event_type: String,
    /// Tenant that owns the event.
    pub merchant_id: MerchantId,
    /// Shopper the event concerns.
    pub user_id: UserId,
    /// Free-form producer payload (cart contents, order totals, …).
    pub payload: serde_json::Value,
    /// When the fact happened, per the producer.
    pub occurred_at: Timestamp,
}

impl Event {
    /// Create an event with a fresh id, stamped with the current time.
    #[must_use]
    pub fn new(
        topic: Topic,
        event_type: impl Into<String>,
        merchant_id: MerchantId,
        user_id: UserId,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            topic,
            event_type: event_type.into(),
            merchant_id,
            user_id,
            payload,
            occurred_at: time::now(),
        }
    }
}
