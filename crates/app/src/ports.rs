//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod action_store;
pub mod automation_repo;
pub mod event_bus;
pub mod gateway;

pub use action_store::ActionStore;
pub use automation_repo::AutomationRepository;
pub use event_bus::{EngineEvent, EnginePublisher};
pub use gateway::{AdsAudienceGateway, NotificationGateway, ProviderError, SyncError};
