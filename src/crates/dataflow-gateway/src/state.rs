//! Shared state threaded through every `/<action>` handler.

use std::sync::Arc;

use dataflow_graph::ExecutionEnvironment;
use dataflow_store::GraphRegistry;

use crate::auth::AuthProvider;

/// Everything a handler needs: the graph registry, the execution
/// environment graphs are deserialized against to run them, and the auth
/// provider that gates every action.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<GraphRegistry>,
    pub exec_env: Arc<dyn ExecutionEnvironment>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Wire the three collaborators together.
    pub fn new(registry: Arc<GraphRegistry>, exec_env: Arc<dyn ExecutionEnvironment>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { registry, exec_env, auth }
    }
}
