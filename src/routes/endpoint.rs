//! Dynamic-endpoint routes: one static registration route plus a single
//! catch-all that resolves registered names at request time. Registration
//! never mutates this table.

use crate::handlers::endpoint::{create_endpoint, list_endpoints, run_custom};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn endpoint_routes(state: AppState) -> Router {
    Router::new()
        .route("/create-endpoint", post(create_endpoint))
        .route("/endpoints", get(list_endpoints))
        .route("/custom/:name", get(run_custom))
        .with_state(state)
}
