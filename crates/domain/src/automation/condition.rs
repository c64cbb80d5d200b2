//! Condition — a guard that must be true for the automation to proceed.

use serde::{Deserialize, Serialize};

/// A predicate over the event payload.
///
/// Conditions are evaluated *after* the trigger matches. All conditions
/// in an automation must be satisfied (logical AND). Evaluation fails
/// closed: a missing field, or a non-numeric value in a numeric
/// comparison, makes the condition false rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Requires a payload field to equal a JSON value exactly.
    Equals {
        field: String,
        value: serde_json::Value,
    },
    /// Requires a numeric payload field to be `>= min`.
    NumberAtLeast { field: String, min: f64 },
    /// Requires a numeric payload field to be `< max`.
    NumberBelow { field: String, max: f64 },
    /// Requires a payload field to equal one of the listed values.
    OneOf {
        field: String,
        values: Vec<serde_json::Value>,
    },
}

impl Condition {
    /// Evaluate this condition against an event payload.
    #[must_use]
    pub fn evaluate(&self, payload: &serde_json::Value) -> bool {
        match self {
            Self::Equals { field, value } => payload.get(field) == Some(value),
            Self::NumberAtLeast { field, min } => {
                matches!(payload.get(field).and_then(serde_json::Value::as_f64), Some(n) if n >= *min)
            }
            Self::NumberBelow { field, max } => {
                matches!(payload.get(field).and_then(serde_json::Value::as_f64), Some(n) if n < *max)
            }
            Self::OneOf { field, values } => {
                payload.get(field).is_some_and(|v| values.contains(v))
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "equals({field}, {value})"),
            Self::NumberAtLeast { field, min } => write!(f, "at_least({field} >= {min})"),
            Self::NumberBelow { field, max } => write!(f, "below({field} < {max})"),
            Self::OneOf { field, values } => write!(f, "one_of({field}, {} values)", values.len()),
        }
    }
}
