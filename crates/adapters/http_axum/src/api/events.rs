//! Event injection endpoint.
//!
//! Injected events go through the same ingestor path as bus messages,
//! so envelope validation, replay detection and evaluation behave
//! identically. Useful for trying out an automation and for replaying
//! events the bus lost.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use driphub_app::ports::{ActionStore, AutomationRepository, EnginePublisher};
use driphub_domain::event::Topic;
use driphub_domain::id::AutomationId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body: the target topic plus the message body exactly as a
/// producer would publish it on the bus.
#[derive(Deserialize)]
pub struct InjectEventRequest {
    pub topic: Topic,
    #[serde(flatten)]
    pub body: serde_json::Value,
}

/// What the evaluation did with the injected event.
#[derive(Serialize)]
pub struct InjectEventBody {
    pub matched: Vec<AutomationId>,
    pub scheduled: u32,
}

/// Possible responses from the inject endpoint.
pub enum InjectResponse {
    Accepted(Json<InjectEventBody>),
}

impl IntoResponse for InjectResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /api/events` — inject an event as if it arrived on the bus.
pub async fn inject<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Json(req): Json<InjectEventRequest>,
) -> Result<InjectResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let outcome = state.ingestor.handle_envelope(req.topic, req.body).await?;
    Ok(InjectResponse::Accepted(Json(InjectEventBody {
        matched: outcome.matched,
        scheduled: outcome.scheduled,
    })))
}
