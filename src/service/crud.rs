//! Entity create/read execution against PostgreSQL.

use crate::error::AppError;
use crate::model::EntityDef;
use crate::sql::{insert, row_to_json, rows_to_json, select_by_id, select_list, PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// Insert one row and return it. The body has already passed validation.
    pub async fn create(
        pool: &PgPool,
        schema: &str,
        entity: &EntityDef,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = insert(schema, entity, body);
        let row = Self::fetch_optional(pool, &q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))?;
        Ok(row)
    }

    /// List rows with exact-match filters, limit (default 100, max 1000) and offset.
    pub async fn list(
        pool: &PgPool,
        schema: &str,
        entity: &EntityDef,
        filters: &[(String, Value)],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Value>, AppError> {
        const DEFAULT_LIMIT: u32 = 100;
        let q = select_list(
            schema,
            entity,
            filters,
            limit.unwrap_or(DEFAULT_LIMIT),
            offset.unwrap_or(0),
        );
        Self::fetch_all(pool, &q).await
    }

    /// Fetch one row by primary key.
    pub async fn read(
        pool: &PgPool,
        schema: &str,
        entity: &EntityDef,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let mut q = select_by_id(schema, entity);
        q.params.push(Value::Number(id.into()));
        Self::fetch_optional(pool, &q).await
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows_to_json(&rows))
    }
}
