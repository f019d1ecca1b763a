//! Durable backing table for endpoint registrations.
//!
//! Registrations must survive restarts, so the table is the source of truth;
//! the in-memory registry is rebuilt from it at startup. The table lives in a
//! service-private schema named from `GRIDNET_SCHEMA` (default `gridnet`).

use crate::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const ENDPOINTS_TABLE: &str = "registered_endpoints";

/// Schema name for service-private tables. Must be a valid PostgreSQL identifier.
pub fn registry_schema() -> String {
    std::env::var("GRIDNET_SCHEMA").unwrap_or_else(|_| "gridnet".into())
}

fn qualified_endpoints_table() -> String {
    format!("{}.{}", registry_schema(), ENDPOINTS_TABLE)
}

pub async fn ensure_endpoint_table(pool: &PgPool) -> Result<(), AppError> {
    let schema = registry_schema();
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
        .execute(pool)
        .await?;
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            name TEXT PRIMARY KEY,
            sql_template TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        qualified_endpoints_table()
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

pub async fn load_endpoints(pool: &PgPool) -> Result<Vec<(String, String, DateTime<Utc>)>, AppError> {
    let rows: Vec<(String, String, DateTime<Utc>)> = sqlx::query_as(&format!(
        "SELECT name, sql_template, created_at FROM {} ORDER BY name",
        qualified_endpoints_table()
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Insert one registration. Returns false when the name already exists; the
/// primary key makes concurrent duplicate inserts lose cleanly.
pub async fn insert_endpoint(pool: &PgPool, name: &str, sql: &str) -> Result<bool, AppError> {
    let res = sqlx::query(&format!(
        "INSERT INTO {} (name, sql_template) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        qualified_endpoints_table()
    ))
    .bind(name)
    .bind(sql)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}
