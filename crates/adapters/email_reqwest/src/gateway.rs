//! The HTTP email gateway.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};

use driphub_app::ports::{NotificationGateway, ProviderError};
use driphub_domain::id::ActionId;

use crate::config::{EmailConfig, EmailProvider};
use crate::error::EmailError;
use crate::templates::{self, RenderedEmail};

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";
const MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";
const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const BODY_SNIPPET_LEN: usize = 200;

/// Sends templated emails through SendGrid or Mailgun.
///
/// Every request carries the scheduled action id as an idempotency key,
/// so a retried action cannot double-send on a provider that honors it.
pub struct HttpEmailGateway {
    client: Client,
    config: EmailConfig,
}

impl HttpEmailGateway {
    /// Build a gateway for the configured provider.
    ///
    /// # Errors
    /// Fails when the provider credentials are missing or the HTTP
    /// client cannot be constructed.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        if !config.is_configured() {
            let reason = match config.provider {
                EmailProvider::Sendgrid => "sendgrid needs api_key",
                EmailProvider::Mailgun => "mailgun needs api_key and domain",
            };
            return Err(EmailError::Credentials {
                reason: reason.to_string(),
            });
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(EmailError::Client)?;
        Ok(Self { client, config })
    }

    fn email_request(
        &self,
        recipient: &str,
        email: &RenderedEmail,
        dedupe_key: ActionId,
    ) -> RequestBuilder {
        let request = match self.config.provider {
            EmailProvider::Sendgrid => self
                .client
                .post(SENDGRID_ENDPOINT)
                .bearer_auth(&self.config.api_key)
                .json(&sendgrid_body(recipient, &self.config.from, email)),
            EmailProvider::Mailgun => self
                .client
                .post(format!("{MAILGUN_API_BASE}/{}/messages", self.config.domain))
                .basic_auth("api", Some(&self.config.api_key))
                .form(&mailgun_form(recipient, &self.config.from, email)),
        };
        request.header(IDEMPOTENCY_HEADER, dedupe_key.to_string())
    }
}

fn sendgrid_body(recipient: &str, from: &str, email: &RenderedEmail) -> serde_json::Value {
    serde_json::json!({
        "personalizations": [{ "to": [{ "email": recipient }] }],
        "from": { "email": from },
        "subject": email.subject,
        "content": [{ "type": "text/html", "value": email.html }],
    })
}

fn mailgun_form(recipient: &str, from: &str, email: &RenderedEmail) -> Vec<(&'static str, String)> {
    vec![
        ("from", from.to_string()),
        ("to", recipient.to_string()),
        ("subject", email.subject.clone()),
        ("html", email.html.clone()),
    ]
}

fn classify_status(status: StatusCode, body: &str) -> Result<(), ProviderError> {
    if status.is_success() {
        return Ok(());
    }
    let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    let reason = if snippet.is_empty() {
        format!("provider returned {status}")
    } else {
        format!("provider returned {status}: {snippet}")
    };
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        Err(ProviderError::transient(reason))
    } else {
        Err(ProviderError::permanent(reason))
    }
}

// Builder errors are formed before the request leaves the process; the
// rest happen on the wire.
fn classify_send_error(err: &reqwest::Error) -> ProviderError {
    if err.is_builder() {
        ProviderError::permanent(format!("invalid email request: {err}"))
    } else {
        ProviderError::transient(format!("email request failed: {err}"))
    }
}

impl NotificationGateway for HttpEmailGateway {
    async fn send_email(
        &self,
        recipient: &str,
        template_id: &str,
        data: &serde_json::Value,
        dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        let email = templates::render(template_id, data);
        let response = self
            .email_request(recipient, &email, dedupe_key)
            .send()
            .await
            .map_err(|err| classify_send_error(&err))?;

        let status = response.status();
        let body = if status.is_success() {
            String::new()
        } else {
            response.text().await.unwrap_or_default()
        };
        classify_status(status, &body)?;

        tracing::debug!(
            provider = %self.config.provider,
            recipient,
            template_id,
            "email accepted by provider"
        );
        Ok(())
    }

    async fn send_sms(
        &self,
        _recipient: &str,
        _template_id: &str,
        _data: &serde_json::Value,
        _dedupe_key: ActionId,
    ) -> Result<(), ProviderError> {
        Err(ProviderError::permanent(
            "sms is not supported by the email gateway",
        ))
    }
}
