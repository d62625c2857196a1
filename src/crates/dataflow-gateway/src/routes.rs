//! Router construction: `GET /<action>`, dispatching on the path segment the
//! way `gateway_service.py`'s single `@http("GET", "/<string:action>")`
//! handler matched on `action`.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::error::GatewayError;
use crate::handlers;
use crate::middleware::logging_layer;
use crate::response;
use crate::state::AppState;

/// Build the gateway's router: a single `/:action` route plus a bare
/// liveness check, mirroring the original service's one-endpoint surface,
/// wrapped in the same request-logging `TraceLayer` every axum router in
/// the teacher's orchestrator is built with.
pub fn create_router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).route("/:action", get(route_action)).layer(logging_layer()).with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// `route_get` from `gateway_service.py`: authenticate the token, authorize
/// the action, then dispatch to the matching handler.
async fn route_action(State(state): State<AppState>, Path(action): Path<String>, body: Option<Json<Value>>) -> Response {
    match dispatch(&state, &action, body).await {
        Ok(data) => response::ok(data),
        Err(err) => err.into_response(),
    }
}

async fn dispatch(state: &AppState, action: &str, body: Option<Json<Value>>) -> Result<Value, GatewayError> {
    let Some(Json(payload)) = body else {
        return Err(GatewayError::BadRequest("Request must be JSON".to_string()));
    };

    let token = payload.get("token").and_then(Value::as_str).unwrap_or_default();
    tracing::info!(%action, "got gateway request");

    let username = state.auth.authenticate(token).await.ok_or(GatewayError::AuthenticationFailed)?;

    let (auth_ok, authorized) = state.auth.authorize(&username, action, &payload).await;
    if !auth_ok {
        return Err(GatewayError::AuthorizationFailed);
    }
    if !authorized {
        let graph_id = payload.get("graph_id").and_then(Value::as_str).unwrap_or("").to_string();
        return Err(GatewayError::Forbidden { user: username, action: action.to_string(), graph_id });
    }

    match action {
        "create" => handlers::handle_create(state, &username).await,
        "view" => handlers::handle_view(state, &payload).await,
        "edit" => handlers::handle_edit(state, &payload).await,
        "delete" => handlers::handle_delete(state, &payload).await,
        "list" => handlers::handle_list(state, &username).await,
        "run" => handlers::handle_run(state, &payload).await,
        "share" => handlers::handle_share(state, &payload).await,
        other => Err(GatewayError::UnknownAction(other.to_string())),
    }
}
