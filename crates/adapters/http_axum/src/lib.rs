//! # driphub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the admin API for automation definitions (CRUD, manual
//!   trigger, sequence cancellation)
//! - Serve the ops API over the scheduled-action queue (`/api/actions`)
//! - Offer direct event injection (`POST /api/events`) that goes through
//!   the same ingestor as the message bus, for testing and backfill
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `driphub-app` (for port traits and services) and
//! `driphub-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
