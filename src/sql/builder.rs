//! Builds parameterized INSERT and SELECT statements from the entity model.

use crate::model::{ColumnDef, ColumnType, EntityDef, SRID};
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: names come from the model only).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Fully qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT expression per column: geometry as WKT, numeric as text (sqlx has no
/// default numeric decode), everything else as-is.
fn select_expr(c: &ColumnDef) -> String {
    let q = quoted(c.name);
    match c.ty {
        ColumnType::Geometry(_) => format!("ST_AsText({}) AS {}", q, q),
        ColumnType::Numeric => format!("{}::text AS {}", q, q),
        _ => q,
    }
}

fn select_column_list(entity: &EntityDef) -> String {
    entity
        .columns
        .iter()
        .map(select_expr)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Placeholder for a bound value of the column's type: geometry goes through
/// ST_GeomFromText, typed columns get an explicit cast.
fn placeholder(c: &ColumnDef, param_num: usize) -> String {
    if c.ty.is_geometry() {
        return format!("ST_GeomFromText(${}, {})", param_num, SRID);
    }
    match c.ty.cast() {
        Some(t) => format!("${}::{}", param_num, t),
        None => format!("${}", param_num),
    }
}

/// SELECT by primary key. Caller binds the id as the sole parameter.
pub fn select_by_id(schema: &str, entity: &EntityDef) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, entity.table);
    let pk = entity.pk_column().name;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(entity),
        table,
        quoted(pk)
    );
    q
}

/// SELECT list with optional exact-match filters, ORDER BY pk, LIMIT/OFFSET.
/// Filters on unknown or geometry columns are dropped by the caller.
pub fn select_list(
    schema: &str,
    entity: &EntityDef,
    filters: &[(String, Value)],
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, entity.table);
    let pk = entity.pk_column().name;

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        let Some(c) = entity.column(col) else { continue };
        if c.ty.is_geometry() {
            continue;
        }
        let param_num = q.push_param(val.clone());
        where_parts.push(format!("{} = {}", quoted(col), placeholder(c, param_num)));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(entity),
        table,
        where_clause,
        quoted(pk),
        limit.min(1000),
        offset
    );
    q
}

/// INSERT from body: skips the generated primary key unless the body provides
/// one, and omits defaulted columns the body leaves out so the database fills
/// them in. Returns the created row.
pub fn insert(schema: &str, entity: &EntityDef, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, entity.table);
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &entity.columns {
        let val = body.get(c.name).cloned();
        if c.primary_key && val.is_none() {
            continue;
        }
        if val.is_none() && c.default.is_some() {
            continue;
        }
        let param_num = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(c.name));
        placeholders.push(placeholder(c, param_num));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(entity)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network_model;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn select_by_id_uses_pk_and_wkt_geometry() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let q = select_by_id(model.schema, subs);
        assert_eq!(
            q.sql,
            "SELECT \"substation_id\", \"substation_name\", \"voltage_level_kv\"::text AS \"voltage_level_kv\", \
             \"status\", ST_AsText(\"geom\") AS \"geom\", \"created_at\" \
             FROM \"network\".\"substations\" WHERE \"substation_id\" = $1"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_list_filters_known_columns_only() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let filters = vec![
            ("status".to_string(), json!("Active")),
            ("geom".to_string(), json!("POINT(0 0)")),
            ("no_such_column".to_string(), json!(1)),
        ];
        let q = select_list(model.schema, subs, &filters, 100, 0);
        assert!(q.sql.contains("WHERE \"status\" = $1"));
        assert!(!q.sql.contains("geom\" ="));
        assert!(q.sql.ends_with("ORDER BY \"substation_id\" LIMIT 100 OFFSET 0"));
        assert_eq!(q.params, vec![json!("Active")]);
    }

    #[test]
    fn select_list_caps_limit() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let q = select_list(model.schema, subs, &[], 50_000, 10);
        assert!(q.sql.ends_with("LIMIT 1000 OFFSET 10"));
    }

    #[test]
    fn insert_binds_geometry_through_st_geomfromtext() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let body: HashMap<String, Value> = [
            ("substation_name".to_string(), json!("North Yard")),
            ("voltage_level_kv".to_string(), json!(110)),
            ("geom".to_string(), json!("POINT(77.59 12.97)")),
        ]
        .into_iter()
        .collect();
        let q = insert(model.schema, subs, &body);
        assert_eq!(
            q.sql,
            "INSERT INTO \"network\".\"substations\" \
             (\"substation_name\", \"voltage_level_kv\", \"geom\") \
             VALUES ($1, $2::numeric, ST_GeomFromText($3, 4326)) \
             RETURNING \"substation_id\", \"substation_name\", \
             \"voltage_level_kv\"::text AS \"voltage_level_kv\", \"status\", \
             ST_AsText(\"geom\") AS \"geom\", \"created_at\""
        );
        assert_eq!(
            q.params,
            vec![json!("North Yard"), json!(110), json!("POINT(77.59 12.97)")]
        );
    }

    #[test]
    fn insert_omits_defaulted_columns_without_values() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let body: HashMap<String, Value> = [
            ("substation_name".to_string(), json!("n")),
            ("voltage_level_kv".to_string(), json!(11)),
            ("geom".to_string(), json!("POINT(0 0)")),
        ]
        .into_iter()
        .collect();
        let q = insert(model.schema, subs, &body);
        // status and created_at have DB defaults; the generated pk is skipped.
        // Only the column list matters here, RETURNING always lists everything.
        let cols = q.sql.split("VALUES").next().unwrap();
        assert!(!cols.contains("\"status\""));
        assert!(!cols.contains("created_at"));
        assert!(!cols.contains("substation_id"));
    }

    #[test]
    fn insert_keeps_explicit_status_and_date_cast() {
        let model = network_model();
        let meters = model.entity_by_path("meters").unwrap();
        let body: HashMap<String, Value> = [
            ("meter_number".to_string(), json!("M-1001")),
            ("installation_date".to_string(), json!("2024-06-01")),
            ("geom".to_string(), json!("POINT(1 2)")),
        ]
        .into_iter()
        .collect();
        let q = insert(model.schema, meters, &body);
        // pole_id has no default, so an absent value binds NULL explicitly:
        // $1 = pole_id, $2 = meter_number, $3 = installation_date, $4 = geom.
        assert!(q.sql.contains("$3::date"));
        assert_eq!(q.params[0], Value::Null);
        assert_eq!(q.params.len(), 4);
    }
}
