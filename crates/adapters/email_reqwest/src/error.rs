//! Email adapter error types.

/// Errors building the email gateway.
///
/// Send failures are not here: those surface as
/// [`ProviderError`](driphub_app::ports::ProviderError) through the
/// gateway port so the executor can decide between retry and discard.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// The selected provider is missing credentials.
    #[error("email provider not configured: {reason}")]
    Credentials { reason: String },
    /// The underlying HTTP client could not be built.
    #[error("failed to build the http email client")]
    Client(#[source] reqwest::Error),
}
