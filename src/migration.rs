//! First-boot DDL derived from the entity model.
//!
//! Tables are created parent-first so foreign keys can be declared inline.
//! Everything is CREATE .. IF NOT EXISTS; re-running against an existing
//! database is a no-op.

use crate::error::AppError;
use crate::model::{ColumnDef, EntityDef, NetworkModel};
use sqlx::PgPool;

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_ddl(schema: &str, c: &ColumnDef) -> String {
    let mut def = if c.primary_key {
        format!("{} INTEGER GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY", quoted(c.name))
    } else {
        format!("{} {}", quoted(c.name), c.ty.sql_type())
    };
    if !c.primary_key && !c.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(expr) = c.default {
        def.push_str(" DEFAULT ");
        def.push_str(expr);
    }
    if c.unique {
        def.push_str(" UNIQUE");
    }
    if let Some(r) = c.references {
        def.push_str(&format!(
            " REFERENCES {}.{} ({}) ON DELETE {}",
            quoted(schema),
            quoted(r.table),
            quoted(r.column),
            r.on_delete.sql()
        ));
    }
    def
}

pub fn create_table_sql(schema: &str, entity: &EntityDef) -> String {
    let cols: Vec<String> = entity.columns.iter().map(|c| column_ddl(schema, c)).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (\n    {}\n)",
        quoted(schema),
        quoted(entity.table),
        cols.join(",\n    ")
    )
}

/// Create the network schema and all entity tables.
pub async fn apply_migrations(pool: &PgPool, model: &NetworkModel) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(model.schema)))
        .execute(pool)
        .await?;
    // Geometry columns need PostGIS; creating the extension takes elevated
    // rights, so a failure here only surfaces later if it was actually missing.
    let _ = sqlx::query("CREATE EXTENSION IF NOT EXISTS postgis")
        .execute(pool)
        .await;

    for entity in &model.entities {
        let ddl = create_table_sql(model.schema, entity);
        tracing::debug!(table = entity.table, "create table");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}
