//! Entity routes built on parameterized paths; handlers resolve the segment
//! against the model, so unknown segments 404 without touching the database.

use crate::handlers::entity::{create, list, read};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:segment", get(list).post(create))
        .route("/:segment/:id", get(read))
        .with_state(state)
}
