//! # driphub-adapter-virtual
//!
//! Virtual gateways for testing and demonstration. Instead of talking to
//! a real email or ads provider, they accept every call, record it in
//! memory for inspection and log it at `INFO`. Failure injection makes
//! them usable for exercising the executor's retry path.
//!
//! | Gateway | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualNotificationGateway`] | `NotificationGateway` | Records emails and SMS, always succeeds |
//! | [`VirtualAdsGateway`] | `AdsAudienceGateway` | Records audience syncs, always succeeds |
//!
//! [`seed::seed_presets`] installs the preset automations for a demo
//! merchant so a fresh instance has something to trigger.
//!
//! ## Dependency rule
//!
//! Depends on `driphub-app` (port traits) and `driphub-domain` only.

mod gateways;

pub mod seed;

pub use gateways::{
    Channel, RecordedNotification, RecordedSync, VirtualAdsGateway, VirtualNotificationGateway,
};
