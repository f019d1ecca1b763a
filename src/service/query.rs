//! Dynamic template execution: named parameters from the query string.

use crate::error::AppError;
use crate::sql::{rows_to_json, to_positional, PgBindValue};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct QueryService;

impl QueryService {
    /// Execute a stored template with request query parameters bound by name.
    /// Extra parameters are ignored; a missing referenced parameter and every
    /// database failure surface as Execution errors carrying the raw message.
    pub async fn run(
        pool: &PgPool,
        template: &str,
        params: &HashMap<String, String>,
    ) -> Result<Vec<Value>, AppError> {
        let named = to_positional(template);
        let mut query = sqlx::query(&named.sql);
        for name in &named.params {
            let raw = params
                .get(name)
                .ok_or_else(|| AppError::Execution(format!("missing query parameter '{}'", name)))?;
            query = query.bind(PgBindValue::from_query_param(raw));
        }
        tracing::debug!(sql = %named.sql, params = ?named.params, "dynamic query");
        let rows = query
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::Execution(e.to_string()))?;
        Ok(rows_to_json(&rows))
    }
}
