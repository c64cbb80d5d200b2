//! JSON REST API route handlers.
//!
//! Each submodule owns one resource: request DTOs, response enums and
//! the axum handlers that glue them to the application services.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod events;

use axum::Router;
use axum::routing::{get, post};

use driphub_app::ports::{ActionStore, AutomationRepository, EnginePublisher};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, S, P>() -> Router<AppState<R, S, P>>
where
    R: AutomationRepository + Send + Sync + 'static,
    S: ActionStore + Send + Sync + 'static,
    P: EnginePublisher + Send + Sync + 'static,
{
    Router::new()
        // Automations
        .route(
            "/automations",
            get(automations::list::<R, S, P>).post(automations::create::<R, S, P>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<R, S, P>)
                .put(automations::update::<R, S, P>)
                .delete(automations::delete::<R, S, P>),
        )
        .route(
            "/automations/{id}/trigger",
            post(automations::trigger::<R, S, P>),
        )
        .route(
            "/automations/{id}/cancel",
            post(automations::cancel::<R, S, P>),
        )
        // Scheduled actions
        .route("/actions", get(actions::list::<R, S, P>))
        .route("/actions/{id}", get(actions::get::<R, S, P>))
        // Event injection
        .route("/events", post(events::inject::<R, S, P>))
}
