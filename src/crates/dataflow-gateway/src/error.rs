//! Error type for the gateway's HTTP boundary.

use axum::http::StatusCode;
use thiserror::Error;

/// Result alias for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Everything that can go wrong servicing a `GET /<action>` request, each
/// variant carrying the HTTP status `gateway_service.py`'s `json_response`
/// would have attached to it.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request body was not JSON, or was missing a required field.
    #[error("{0}")]
    BadRequest(String),

    /// `authenticate(token)` returned no user.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// `authorize` itself errored (distinct from a clean "not permitted").
    #[error("authorization failed")]
    AuthorizationFailed,

    /// `authorize` succeeded but returned `permitted = false`.
    #[error("{user} is not authorized for {action} on graph {graph_id}")]
    Forbidden {
        /// The authenticated username.
        user: String,
        /// The action they attempted.
        action: String,
        /// The graph they attempted it on.
        graph_id: String,
    },

    /// The `/<action>` path segment didn't match a known action.
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    /// The requested graph, or a named dependency of it, does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The registry or graph engine failed.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// The HTTP status `gateway_service.py`'s `json_response` used for the
    /// matching Python-side condition.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::AuthenticationFailed => StatusCode::FORBIDDEN,
            GatewayError::AuthorizationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Forbidden { .. } => StatusCode::FORBIDDEN,
            GatewayError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<dataflow_store::StoreError> for GatewayError {
    fn from(err: dataflow_store::StoreError) -> Self {
        match err {
            dataflow_store::StoreError::NotFound(id) => GatewayError::NotFound(format!("no such graph '{id}'")),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<dataflow_graph::GraphError> for GatewayError {
    fn from(err: dataflow_graph::GraphError) -> Self {
        GatewayError::Internal(err.to_string())
    }
}
