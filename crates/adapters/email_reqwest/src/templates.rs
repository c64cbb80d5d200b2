//! Built-in email templates.
//!
//! Rendering is deliberately small: a subject line and a short HTML
//! body per template id, filled from the step and event data merged by
//! the engine. Unknown template ids get a neutral fallback instead of
//! an error, since a typo in an automation must not burn the retry
//! budget of every action it schedules.

use serde_json::Value;

/// A rendered email, ready to hand to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Render the subject and body for a template id.
#[must_use]
pub fn render(template_id: &str, data: &Value) -> RenderedEmail {
    match template_id {
        "welcome" => welcome(data),
        "cart-abandoned" => cart_abandoned(data),
        "order-confirmation" => order_confirmation(data),
        "win-back" => win_back(data),
        _ => fallback(),
    }
}

/// String or number field from the action data.
fn field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn welcome(data: &Value) -> RenderedEmail {
    let name = field(data, "name").unwrap_or_else(|| "there".to_string());
    RenderedEmail {
        subject: "Welcome aboard!".to_string(),
        html: format!("<h1>Welcome, {name}!</h1><p>Thanks for joining us.</p>"),
    }
}

fn cart_abandoned(data: &Value) -> RenderedEmail {
    let body = match field(data, "cart_url") {
        Some(url) => {
            format!("<h1>Your cart is waiting</h1><p><a href=\"{url}\">Pick up where you left off</a>.</p>")
        }
        None => "<h1>Your cart is waiting</h1><p>Your items are still saved.</p>".to_string(),
    };
    RenderedEmail {
        subject: "Did you forget something?".to_string(),
        html: body,
    }
}

fn order_confirmation(data: &Value) -> RenderedEmail {
    match field(data, "order_id") {
        Some(order_id) => RenderedEmail {
            subject: format!("Order confirmation #{order_id}"),
            html: format!(
                "<h1>Order confirmed</h1><p>Your order #{order_id} has been confirmed.</p>"
            ),
        },
        None => RenderedEmail {
            subject: "Your order is confirmed".to_string(),
            html: "<h1>Order confirmed</h1><p>Your order has been confirmed.</p>".to_string(),
        },
    }
}

fn win_back(data: &Value) -> RenderedEmail {
    let body = match field(data, "discount") {
        Some(discount) => {
            format!("<h1>It has been a while</h1><p>Come back and enjoy {discount} off your next order.</p>")
        }
        None => "<h1>It has been a while</h1><p>Come back and see what is new.</p>".to_string(),
    };
    RenderedEmail {
        subject: "We miss you".to_string(),
        html: body,
    }
}

fn fallback() -> RenderedEmail {
    RenderedEmail {
        subject: "New notification".to_string(),
        html: "<p>You have a new message from us.</p>".to_string(),
    }
}
