//! # driphub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement [`AutomationRepository`](driphub_app::ports::AutomationRepository)
//!   and [`ActionStore`](driphub_app::ports::ActionStore)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! The action store carries the scheduler's durability guarantees: the
//! dedup key is a `UNIQUE` constraint and claims are single `UPDATE`
//! statements, so idempotency and claim exclusivity hold across
//! concurrent workers and restarts.
//!
//! ## Dependency rule
//! Depends on `driphub-app` (for port traits) and `driphub-domain` (for domain
//! types). The `app` and `domain` crates must never reference this adapter.

pub mod action_store;
pub mod automation_repo;
pub mod error;
pub mod pool;

pub use action_store::SqliteActionStore;
pub use automation_repo::SqliteAutomationRepository;
pub use pool::{Config, Database};
