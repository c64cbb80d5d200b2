//! # driphub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationRepository` — CRUD + trigger lookup for automation definitions
//!   - `ActionStore` — durable queue of scheduled actions (enqueue, claim, transitions)
//!   - `NotificationGateway` / `AdsAudienceGateway` — outbound providers
//!   - `EnginePublisher` — operator-visible engine events
//! - Define **driving/inbound ports** as use-case structs:
//!   - `EventIngestor` — parse and route bus messages
//!   - `AutomationEngine` — match events, enqueue scheduled actions
//!   - `ActionScheduler` — sweep due actions and dispatch them
//!   - `ActionExecutor` — perform actions with retry and idempotency
//!   - `AutomationService` / `SequenceService` — admin and ops use-cases
//! - Provide **in-process infrastructure** (engine event bus) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `driphub-domain` only (plus `tokio` for channels, timers and
//! task spawning). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod action_executor;
pub mod action_scheduler;
pub mod automation_engine;
pub mod event_bus;
pub mod event_ingestor;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
