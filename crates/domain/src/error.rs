//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`DripHubError`] via `#[from]`; adapters box their driver errors into
//! [`DripHubError::Storage`].

/// Top-level error for the driphub workspace.
#[derive(Debug, thiserror::Error)]
pub enum DripHubError {
    /// A domain invariant was violated while constructing or mutating an
    /// aggregate.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A lookup by identifier found nothing.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An inbound event could not be interpreted.
    #[error("malformed event")]
    MalformedEvent(#[from] MalformedEventError),

    /// A scheduled action was asked to make an illegal status change.
    #[error("illegal status transition")]
    Transition(#[from] crate::schedule::TransitionError),

    /// The persistence layer failed. The boxed source carries the
    /// driver-specific detail.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An automation must carry a human-readable name.
    #[error("name must not be empty")]
    EmptyName,

    /// An automation must schedule at least one step.
    #[error("automation must define at least one step")]
    NoSteps,

    /// User identifiers come from the commerce platform and must not be
    /// empty.
    #[error("user id must not be empty")]
    EmptyUserId,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Human-readable entity kind, e.g. `"Automation"`.
    pub entity: &'static str,
    /// The identifier that was looked up.
    pub id: String,
}

/// An inbound event was structurally invalid and has been dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed event on {topic}: {reason}")]
pub struct MalformedEventError {
    /// Topic the event arrived on.
    pub topic: String,
    /// What was missing or wrong.
    pub reason: String,
}
