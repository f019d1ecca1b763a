//! Entity handlers: create, list, read. Paths are parameterized; the segment
//! resolves against the model at request time.

use crate::error::AppError;
use crate::model::{ColumnType, EntityDef};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Coerce a query-string filter value by its column's type; unparsable values
/// fall back to the raw string and fail in the database instead.
fn filter_value(entity: &EntityDef, col: &str, s: &str) -> Value {
    match entity.column(col).map(|c| c.ty) {
        Some(ColumnType::Int) => s
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .unwrap_or_else(|_| Value::String(s.to_string())),
        _ => Value::String(s.to_string()),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entity = state
        .model
        .entity_by_path(&segment)
        .ok_or_else(|| AppError::NotFound(segment))?;
    let body = body_to_map(body)?;
    RequestValidator::validate_create(entity, &body)?;
    let row = CrudService::create(&state.pool, state.model.schema, entity, &body).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Value>>, AppError> {
    let entity = state
        .model
        .entity_by_path(&segment)
        .ok_or_else(|| AppError::NotFound(segment))?;

    let mut limit: Option<u32> = None;
    let mut offset: Option<u32> = None;
    let mut filters: Vec<(String, Value)> = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => limit = v.parse().ok(),
            "offset" => offset = v.parse().ok(),
            _ => {
                if entity.column(&k).is_some() {
                    let val = filter_value(entity, &k, &v);
                    filters.push((k, val));
                }
            }
        }
    }

    let rows =
        CrudService::list(&state.pool, state.model.schema, entity, &filters, limit, offset).await?;
    Ok(Json(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let entity = state
        .model
        .entity_by_path(&segment)
        .ok_or_else(|| AppError::NotFound(segment))?;
    let id: i64 = id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))?;
    let row = CrudService::read(&state.pool, state.model.schema, entity, id)
        .await?
        .ok_or_else(|| AppError::NotFound(id_str))?;
    Ok(Json(row))
}
