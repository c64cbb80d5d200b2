//! # driphub-adapter-mqtt
//!
//! MQTT adapter — consumes platform events from the message broker and
//! feeds them to the event ingestor.
//!
//! ## Responsibilities
//! - Connect to the broker and subscribe to the event topics (QoS 1,
//!   at-least-once; replays are absorbed downstream by the scheduling
//!   idempotency key)
//! - Forward each publish to [`EventIngestor`](driphub_app::event_ingestor::EventIngestor)
//!   — one bad message never stops the consumer
//! - Reconnect with a delay after connection errors, resubscribing on
//!   every connection acknowledgement
//! - Disconnect cleanly when the shutdown signal flips
//!
//! ## Dependency rule
//! Same as other adapters: depends on `driphub-app` and `driphub-domain`.

mod config;
mod consumer;
mod error;

pub use config::MqttConfig;
pub use consumer::EventConsumer;
pub use error::MqttError;
