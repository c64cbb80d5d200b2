//! Action step — the effect to perform and how long to wait before it.

use serde::{Deserialize, Serialize};

/// The side effect a step performs once its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Send a templated email to the user.
    Email {
        /// Template name, e.g. `"cart-abandoned"`, `"welcome"`.
        template_id: String,
    },
    /// Send a templated SMS to the user.
    Sms {
        /// Template name.
        template_id: String,
    },
    /// Add the user to an advertising custom audience.
    SyncAudience {
        /// Connected ad account, e.g. `"facebook"`.
        account_id: String,
        /// Audience within that account, e.g. `"lapsed-customers"`.
        audience_id: String,
    },
}

impl ActionKind {
    /// Email step shorthand.
    #[must_use]
    pub fn email(template_id: impl Into<String>) -> Self {
        Self::Email {
            template_id: template_id.into(),
        }
    }

    /// SMS step shorthand.
    #[must_use]
    pub fn sms(template_id: impl Into<String>) -> Self {
        Self::Sms {
            template_id: template_id.into(),
        }
    }

    /// Audience sync step shorthand.
    #[must_use]
    pub fn sync_audience(account_id: impl Into<String>, audience_id: impl Into<String>) -> Self {
        Self::SyncAudience {
            account_id: account_id.into(),
            audience_id: audience_id.into(),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email { template_id } => write!(f, "email({template_id})"),
            Self::Sms { template_id } => write!(f, "sms({template_id})"),
            Self::SyncAudience {
                account_id,
                audience_id,
            } => write!(f, "sync_audience({account_id}/{audience_id})"),
        }
    }
}

/// One step of an automation: what to do, after which delay, with which
/// static data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    /// What to do.
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Seconds to wait after the triggering event before executing.
    #[serde(default)]
    pub delay_secs: u64,
    /// Static data merged over the captured event payload at schedule
    /// time (discount codes, flags, …).
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ActionStep {
    /// Create a step with no static data.
    #[must_use]
    pub fn new(kind: ActionKind, delay_secs: u64) -> Self {
        Self {
            kind,
            delay_secs,
            data: serde_json::Value::Null,
        }
    }

    /// Attach static data to the step.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// The step delay as a signed duration, saturating on overflow.
    #[must_use]
    pub fn delay(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.delay_secs).unwrap_or(i64::MAX))
    }
}

impl std::fmt::Display for ActionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} after {}s", self.kind, self.delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_action_kinds() {
        assert_eq!(ActionKind::email("welcome").to_string(), "email(welcome)");
        assert_eq!(ActionKind::sms("otp").to_string(), "sms(otp)");
        assert_eq!(
            ActionKind::sync_audience("facebook", "lapsed-customers").to_string(),
            "sync_audience(facebook/lapsed-customers)"
        );
    }

    #[test]
    fn should_display_step_with_delay() {
        let step = ActionStep::new(ActionKind::email("cart-abandoned-reminder"), 86_400);
        assert_eq!(
            step.to_string(),
            "email(cart-abandoned-reminder) after 86400s"
        );
    }

    #[test]
    fn should_flatten_kind_when_serializing_step() {
        let step = ActionStep::new(ActionKind::email("welcome"), 0)
            .with_data(serde_json::json!({ "discount": "10%" }));
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["template_id"], "welcome");
        assert_eq!(json["delay_secs"], 0);
        assert_eq!(json["data"]["discount"], "10%");
    }

    #[test]
    fn should_deserialize_step_with_default_delay_and_data() {
        let json = serde_json::json!({
            "type": "sms",
            "template_id": "flash-sale"
        });
        let step: ActionStep = serde_json::from_value(json).unwrap();
        assert_eq!(step.kind, ActionKind::sms("flash-sale"));
        assert_eq!(step.delay_secs, 0);
        assert!(step.data.is_null());
    }

    #[test]
    fn should_roundtrip_steps_through_serde_json() {
        let steps = vec![
            ActionStep::new(ActionKind::email("welcome"), 0),
            ActionStep::new(ActionKind::sms("flash-sale"), 3_600),
            ActionStep::new(ActionKind::sync_audience("google", "buyers"), 172_800)
                .with_data(serde_json::json!({ "source": "post-purchase" })),
        ];

        for step in &steps {
            let json = serde_json::to_string(step).unwrap();
            let parsed: ActionStep = serde_json::from_str(&json).unwrap();
            assert_eq!(&parsed, step);
        }
    }

    #[test]
    fn should_convert_delay_to_duration() {
        let step = ActionStep::new(ActionKind::email("welcome"), 90);
        assert_eq!(step.delay(), chrono::Duration::seconds(90));
    }
}
