//! Email provider configuration.

use serde::Deserialize;

/// Which HTTP email provider to send through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    Sendgrid,
    Mailgun,
}

impl std::fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sendgrid => write!(f, "sendgrid"),
            Self::Mailgun => write!(f, "mailgun"),
        }
    }
}

/// Configuration for the HTTP email gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Provider to send through.
    pub provider: EmailProvider,
    /// Provider API key. Empty means the gateway is unconfigured.
    pub api_key: String,
    /// Sending domain; required by Mailgun, ignored by SendGrid.
    pub domain: String,
    /// Sender address put on every email.
    pub from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: EmailProvider::Sendgrid,
            api_key: String::new(),
            domain: String::new(),
            from: "noreply@driphub.local".to_string(),
        }
    }
}

impl EmailConfig {
    /// Whether the credentials the selected provider needs are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        match self.provider {
            EmailProvider::Sendgrid => !self.api_key.is_empty(),
            EmailProvider::Mailgun => !self.api_key.is_empty() && !self.domain.is_empty(),
        }
    }
}
