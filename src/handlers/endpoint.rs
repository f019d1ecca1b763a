//! Dynamic endpoint handlers: registration, execution, listing.

use crate::error::AppError;
use crate::service::QueryService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Deserialize)]
pub struct EndpointRequest {
    pub name: String,
    pub sql: String,
}

#[derive(Serialize)]
pub struct EndpointCreated {
    pub message: String,
    pub path: String,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub name: String,
    pub path: String,
    pub sql: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// POST /create-endpoint — register a (name, sql) pair. Duplicate names fail
/// with Conflict and leave the registry untouched.
pub async fn create_endpoint(
    State(state): State<AppState>,
    Json(req): Json<EndpointRequest>,
) -> Result<(StatusCode, Json<EndpointCreated>), AppError> {
    let path = state.registry.register(&req.name, &req.sql).await?;
    Ok((
        StatusCode::CREATED,
        Json(EndpointCreated {
            message: format!("dynamic GET endpoint created at {}", path),
            path,
        }),
    ))
}

/// GET /custom/:name — execute the stored template with the request's query
/// parameters bound by name. Rows come back as a bare JSON array in database
/// result order.
pub async fn run_custom(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, AppError> {
    let endpoint = state
        .registry
        .get(&name)
        .await
        .ok_or_else(|| AppError::NotFound(format!("no endpoint named '{}'", name)))?;
    let rows = QueryService::run(&state.pool, &endpoint.sql, &params).await?;
    Ok(Json(rows))
}

/// GET /endpoints — list all registrations.
pub async fn list_endpoints(State(state): State<AppState>) -> Json<Vec<EndpointInfo>> {
    let all = state.registry.snapshot().await;
    Json(
        all.iter()
            .map(|e| EndpointInfo {
                name: e.name.clone(),
                path: e.path.clone(),
                sql: e.sql.clone(),
                created_at: e.created_at,
            })
            .collect(),
    )
}
