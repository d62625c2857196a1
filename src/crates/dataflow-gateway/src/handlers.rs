//! Action dispatch: one function per `case` arm of `gateway_service.py`'s
//! `route_get` match, reading/writing the graph registry and engine.

use std::sync::Arc;

use dataflow_graph::serialization::{self, SerializedGraph};
use serde_json::{json, Value};

use crate::error::{GatewayError, Result};
use crate::state::AppState;

fn require_str<'a>(payload: &'a Value, field: &str) -> Result<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::BadRequest(format!("missing required field '{field}'")))
}

pub async fn handle_create(state: &AppState, username: &str) -> Result<Value> {
    let graph_id = state.registry.create_graph(username).await?;
    Ok(json!({ "graph_id": graph_id }))
}

pub async fn handle_view(state: &AppState, payload: &Value) -> Result<Value> {
    let graph_id = require_str(payload, "graph_id")?;
    let serialized = state
        .registry
        .get_serialized_graph(graph_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("graph '{graph_id}' has no stored payload")))?;
    Ok(json!({ "graph_id": graph_id, "serialized_graph": serialized }))
}

pub async fn handle_edit(state: &AppState, payload: &Value) -> Result<Value> {
    let graph_id = require_str(payload, "graph_id")?;
    let serialized_graph = require_str(payload, "serialized_graph")?;
    state.registry.store_serialized_graph(graph_id, serialized_graph.to_string()).await?;
    Ok(json!({ "graph_id": graph_id }))
}

pub async fn handle_delete(state: &AppState, payload: &Value) -> Result<Value> {
    let graph_id = require_str(payload, "graph_id")?;
    state.registry.delete_graph(graph_id).await?;
    Ok(json!({ "graph_id": graph_id }))
}

pub async fn handle_list(state: &AppState, username: &str) -> Result<Value> {
    let graphs = state.registry.list_graphs(username).await?;
    Ok(json!({ "graphs": graphs }))
}

/// Deserialize the stored graph, run every block in evaluation order, then
/// persist the post-run state back under the same id.
pub async fn handle_run(state: &AppState, payload: &Value) -> Result<Value> {
    let graph_id = require_str(payload, "graph_id")?;
    let stored = state
        .registry
        .get_serialized_graph(graph_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("graph '{graph_id}' has no stored payload")))?;

    let view = SerializedGraph::from_json(&stored).map_err(|e| GatewayError::BadRequest(e.to_string()))?;
    let mut graph = serialization::deserialize(&view, Arc::clone(&state.exec_env))?;
    graph.run_all_blocks().await?;

    let result = serialization::serialize(&graph);
    let result_json = result.to_json().map_err(|e| GatewayError::Internal(e.to_string()))?;
    state.registry.store_serialized_graph(graph_id, result_json).await?;

    Ok(json!({ "graph_id": graph_id }))
}

pub async fn handle_share(state: &AppState, payload: &Value) -> Result<Value> {
    let graph_id = require_str(payload, "graph_id")?;
    let target_user = require_str(payload, "target_user")?;
    let bits = payload
        .get("permissions")
        .and_then(Value::as_u64)
        .ok_or_else(|| GatewayError::BadRequest("missing required field 'permissions'".to_string()))?;
    state.registry.share_graph(graph_id, target_user, bits as u32).await?;
    Ok(json!({ "graph_id": graph_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryAuthProvider;
    use dataflow_sandbox::LocalCodeRunner;
    use dataflow_store::{GraphRegistry, InMemoryKvStore};

    fn state() -> AppState {
        let registry = Arc::new(GraphRegistry::new(Arc::new(InMemoryKvStore::new())));
        let exec_env: Arc<dyn dataflow_graph::ExecutionEnvironment> = Arc::new(LocalCodeRunner::offline_default());
        let auth = Arc::new(InMemoryAuthProvider::new(Arc::clone(&registry)));
        AppState::new(registry, exec_env, auth)
    }

    #[tokio::test]
    async fn create_then_view_round_trips_empty_graph() {
        let state = state();
        let created = handle_create(&state, "alice").await.unwrap();
        let graph_id = created["graph_id"].as_str().unwrap().to_string();

        let graph = dataflow_graph::Graph::new("g", Arc::clone(&state.exec_env));
        let serialized = serialization::serialize(&graph).to_json().unwrap();
        handle_edit(&state, &json!({ "graph_id": graph_id, "serialized_graph": serialized })).await.unwrap();

        let viewed = handle_view(&state, &json!({ "graph_id": graph_id })).await.unwrap();
        assert_eq!(viewed["graph_id"], graph_id);
    }

    #[tokio::test]
    async fn list_reflects_created_graphs() {
        let state = state();
        let created = handle_create(&state, "alice").await.unwrap();
        let graph_id = created["graph_id"].as_str().unwrap().to_string();
        let listed = handle_list(&state, "alice").await.unwrap();
        assert!(listed["graphs"].as_array().unwrap().contains(&json!(graph_id)));
    }

    #[tokio::test]
    async fn view_missing_graph_is_not_found() {
        let state = state();
        let err = handle_view(&state, &json!({ "graph_id": "nope" })).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_graph() {
        let state = state();
        let created = handle_create(&state, "alice").await.unwrap();
        let graph_id = created["graph_id"].as_str().unwrap().to_string();
        handle_delete(&state, &json!({ "graph_id": graph_id })).await.unwrap();
        let listed = handle_list(&state, "alice").await.unwrap();
        assert!(listed["graphs"].as_array().unwrap().is_empty());
    }
}
