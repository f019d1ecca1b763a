//! Common routes: liveness, readiness, version, docs index.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct RootBody {
    message: String,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn root(State(state): State<AppState>) -> Json<RootBody> {
    Json(RootBody {
        message: format!("{} is running", state.settings.app_name),
    })
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if sqlx::query("SELECT 1").fetch_optional(&state.pool).await.is_err() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: "unavailable",
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: "ok",
    }))
}

async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": state.settings.app_name,
        "version": state.settings.app_version,
    }))
}

/// JSON API index: app metadata, entity routes, registered dynamic endpoints.
async fn docs(State(state): State<AppState>) -> Json<serde_json::Value> {
    let prefix = &state.settings.api_prefix;
    let entities: Vec<serde_json::Value> = state
        .model
        .entities
        .iter()
        .map(|e| {
            json!({
                "path": format!("{}/{}", prefix, e.path_segment),
                "table": format!("{}.{}", state.model.schema, e.table),
                "operations": ["create", "list", "read"],
            })
        })
        .collect();
    let endpoints: Vec<serde_json::Value> = state
        .registry
        .snapshot()
        .await
        .iter()
        .map(|e| json!({ "name": e.name, "path": e.path }))
        .collect();
    Json(json!({
        "name": state.settings.app_name,
        "version": state.settings.app_version,
        "description": state.settings.app_description,
        "entities": entities,
        "dynamic_endpoints": endpoints,
    }))
}

/// Routes mounted at the root, outside the API prefix.
pub fn common_routes(state: AppState) -> Router {
    let docs_url = state.settings.docs_url.clone();
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route(&docs_url, get(docs))
        .with_state(state)
}
