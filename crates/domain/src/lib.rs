//! # driphub-domain
//!
//! Pure domain model for the driphub marketing automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Events** (immutable facts emitted by the commerce platform)
//! - Define **Automations** (trigger → condition → delayed action rules)
//! - Define **Scheduled actions** (durable, time-delayed units of work and
//!   their status machine)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod event;
pub mod schedule;
