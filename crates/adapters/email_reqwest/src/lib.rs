//! # driphub-adapter-email-reqwest
//!
//! Email adapter — a real [`NotificationGateway`](driphub_app::ports::NotificationGateway)
//! over HTTP email providers.
//!
//! ## Responsibilities
//! - Render the subject and HTML body for a template id ([`templates`])
//! - Build and send the provider request: JSON for SendGrid, a form
//!   post for Mailgun, both carrying an idempotency key derived from
//!   the scheduled action id
//! - Classify failures for the executor: rate limits, provider 5xx and
//!   transport errors are transient; other 4xx are permanent
//!
//! SMS is not covered here; the virtual gateway stands in for it in
//! development.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `driphub-app` and `driphub-domain`.

mod config;
mod error;
mod gateway;
pub mod templates;

pub use config::{EmailConfig, EmailProvider};
pub use error::EmailError;
pub use gateway::HttpEmailGateway;
