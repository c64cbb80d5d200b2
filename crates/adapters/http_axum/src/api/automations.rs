//! JSON REST handlers for automation definitions.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use driphub_app::ports::{ActionStore, AutomationRepository, EnginePublisher};
use driphub_domain::automation::{ActionStep, AutomationDefinition, Condition, Trigger};
use driphub_domain::error::DripHubError;
use driphub_domain::id::{AutomationId, MerchantId, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an automation.
///
/// `trigger` may be omitted for sequences that are only ever started by
/// hand through the trigger endpoint.
#[derive(Deserialize)]
pub struct CreateAutomationRequest {
    pub merchant_id: MerchantId,
    pub name: String,
    pub enabled: Option<bool>,
    pub trigger: Option<Trigger>,
    pub conditions: Option<Vec<Condition>>,
    pub steps: Vec<ActionStep>,
}

/// Request body for updating an automation. `PUT` replaces the whole
/// definition; the merchant and creation time are kept from the stored
/// one.
#[derive(Deserialize)]
pub struct UpdateAutomationRequest {
    pub name: String,
    pub enabled: bool,
    pub trigger: Trigger,
    pub conditions: Vec<Condition>,
    pub steps: Vec<ActionStep>,
}

/// Request body for starting a sequence by hand.
#[derive(Deserialize)]
pub struct TriggerRequest {
    pub user_id: String,
    /// Payload the automation's conditions are evaluated against.
    #[serde(default)]
    pub context: serde_json::Value,
}

/// Request body for withdrawing a user's pending sequence.
#[derive(Deserialize)]
pub struct CancelRequest {
    pub user_id: String,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationDefinition>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<AutomationDefinition>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationDefinition>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// What a manual trigger did.
#[derive(Serialize)]
pub struct TriggerBody {
    /// Whether a sequence was started. `false` when the automation is
    /// disabled or its conditions did not hold for `context`.
    pub started: bool,
    pub scheduled: u32,
}

/// Possible responses from the trigger endpoint.
pub enum TriggerResponse {
    Ok(Json<TriggerBody>),
}

impl IntoResponse for TriggerResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// How many actions a cancellation withdrew.
#[derive(Serialize)]
pub struct CancelBody {
    pub cancelled: u32,
}

/// Possible responses from the cancel endpoint.
pub enum CancelResponse {
    Ok(Json<CancelBody>),
}

impl IntoResponse for CancelResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/automations` — list all automations.
pub async fn list<R, S, P>(
    State(state): State<AppState<R, S, P>>,
) -> Result<ListResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let automations = state.automation_service.list_automations().await?;
    Ok(ListResponse::Ok(Json(automations)))
}

/// `GET /api/automations/{id}` — get automation by ID.
pub async fn get<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let automation_id = AutomationId::from_str(&id)
        .map_err(|_| ApiError::unknown_resource("Automation", &id))?;
    let automation = state
        .automation_service
        .get_automation(automation_id)
        .await?;
    Ok(GetResponse::Ok(Json(automation)))
}

/// `POST /api/automations` — create a new automation.
pub async fn create<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Json(req): Json<CreateAutomationRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let mut builder = AutomationDefinition::builder(req.merchant_id).name(req.name);

    if let Some(enabled) = req.enabled {
        builder = builder.enabled(enabled);
    }
    if let Some(trigger) = req.trigger {
        builder = builder.trigger(trigger);
    }
    if let Some(conditions) = req.conditions {
        for c in conditions {
            builder = builder.condition(c);
        }
    }
    for step in req.steps {
        builder = builder.step(step);
    }

    let automation = builder.build()?;
    let created = state
        .automation_service
        .create_automation(automation)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/automations/{id}` — update an existing automation.
pub async fn update<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAutomationRequest>,
) -> Result<GetResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let automation_id = AutomationId::from_str(&id)
        .map_err(|_| ApiError::unknown_resource("Automation", &id))?;

    let existing = state
        .automation_service
        .get_automation(automation_id)
        .await?;

    let mut builder = AutomationDefinition::builder(existing.merchant_id)
        .id(automation_id)
        .created_at(existing.created_at)
        .name(req.name)
        .enabled(req.enabled)
        .trigger(req.trigger);

    for c in req.conditions {
        builder = builder.condition(c);
    }
    for step in req.steps {
        builder = builder.step(step);
    }

    let automation = builder.build()?;
    let updated = state
        .automation_service
        .update_automation(automation)
        .await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `DELETE /api/automations/{id}` — delete an automation.
pub async fn delete<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let automation_id = AutomationId::from_str(&id)
        .map_err(|_| ApiError::unknown_resource("Automation", &id))?;
    state
        .automation_service
        .delete_automation(automation_id)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/automations/{id}/trigger` — start a sequence by hand for
/// one user, bypassing trigger matching. Conditions still apply.
pub async fn trigger<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Path(id): Path<String>,
    Json(req): Json<TriggerRequest>,
) -> Result<TriggerResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let automation_id = AutomationId::from_str(&id)
        .map_err(|_| ApiError::unknown_resource("Automation", &id))?;
    let user_id = UserId::new(req.user_id).map_err(DripHubError::from)?;

    let outcome = state
        .engine
        .trigger(automation_id, user_id, req.context)
        .await?;
    Ok(TriggerResponse::Ok(Json(TriggerBody {
        started: !outcome.matched.is_empty(),
        scheduled: outcome.scheduled,
    })))
}

/// `POST /api/automations/{id}/cancel` — withdraw every still-pending
/// action of this automation for one user.
pub async fn cancel<R, S, P>(
    State(state): State<AppState<R, S, P>>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Result<CancelResponse, ApiError>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    let automation_id = AutomationId::from_str(&id)
        .map_err(|_| ApiError::unknown_resource("Automation", &id))?;
    let user_id = UserId::new(req.user_id).map_err(DripHubError::from)?;

    let cancelled = state
        .sequence_service
        .cancel_sequence(automation_id, &user_id)
        .await?;
    Ok(CancelResponse::Ok(Json(CancelBody { cancelled })))
}
