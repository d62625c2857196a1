//! # dataflow-gateway
//!
//! The HTTP surface the original exposed through a single nameko
//! `@http("GET", "/<string:action>")` handler (`gateway_service.py`),
//! rebuilt as an axum router: authenticate, authorize, dispatch to a
//! `dataflow-store`/`dataflow-graph` operation, and answer with the
//! `{"status", "message"?, "data"?}` envelope the original always returned.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use auth::{AuthProvider, InMemoryAuthProvider};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use routes::create_router;
pub use state::AppState;
