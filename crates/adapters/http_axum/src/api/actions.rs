//! JSON REST handlers for the scheduled-action queue.
//!
//! Read-only ops surface: the queue is written by the engine and the
//! scheduler, never directly over HTTP.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use driphub_app::ports::{ActionStore, AutomationRepository, EnginePublisher};
use driphub_domain::id::ActionId;
use driphub_domain::schedule::{ActionStatus, ScheduledAction};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 50;

/// Query parameters accepted by the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<ActionStatus>,
    pub limit: Option<u32>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ScheduledAction>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<ScheduledAction>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/actions` — list scheduled actions, newest first, optionally
/// filtered by `?status=`.
pub async fn list<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let actions = state
        .sequence_service
        .list_actions(query.status, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(ListResponse::Ok(Json(actions)))
}

/// `GET /api/actions/{id}` — get one scheduled action by ID.
pub async fn get<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let action_id =
        ActionId::from_str(&id).map_err(|_| ApiError::unknown_resource("Action", &id))?;
    let action = state.sequence_service.get_action(action_id).await?;
    Ok(GetResponse::Ok(Json(action)))
}
