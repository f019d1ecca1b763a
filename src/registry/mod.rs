//! Dynamic endpoint registry: name → SQL template, durable and process-wide.
//!
//! Dynamic endpoints are served by one catch-all route that resolves the
//! captured name against this registry at request time, so registering never
//! mutates the router. A registration is written to the backing table first
//! and only then becomes visible in the map; startup replays the table into
//! an empty map.

pub mod store;

use crate::error::AppError;
use chrono::{DateTime, Utc};
use regex::Regex;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Debug)]
pub struct RegisteredEndpoint {
    pub name: String,
    pub sql: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

pub struct EndpointRegistry {
    pool: PgPool,
    prefix: String,
    // Writers hold this across the durable insert; readers only clone the Arc.
    endpoints: RwLock<HashMap<String, Arc<RegisteredEndpoint>>>,
}

impl EndpointRegistry {
    /// Rebuild the registry from the backing table. Entries are unique by
    /// construction (table primary key), so no per-entry check is needed.
    pub async fn load(pool: PgPool, prefix: &str) -> Result<Self, AppError> {
        let rows = store::load_endpoints(&pool).await?;
        let mut endpoints = HashMap::with_capacity(rows.len());
        for (name, sql, created_at) in rows {
            let path = endpoint_path(prefix, &name);
            endpoints.insert(
                name.clone(),
                Arc::new(RegisteredEndpoint {
                    name,
                    sql,
                    path,
                    created_at,
                }),
            );
        }
        tracing::info!(count = endpoints.len(), "loaded dynamic endpoints");
        Ok(EndpointRegistry {
            pool,
            prefix: prefix.to_string(),
            endpoints: RwLock::new(endpoints),
        })
    }

    /// Register a new endpoint and return its path. Exactly one of any set of
    /// concurrent calls with the same name succeeds; the rest observe Conflict.
    pub async fn register(&self, name: &str, sql: &str) -> Result<String, AppError> {
        validate_name(name)?;
        validate_template(sql)?;

        let mut endpoints = self.endpoints.write().await;
        if endpoints.contains_key(name) {
            return Err(AppError::Conflict(format!("endpoint '{}' already exists", name)));
        }
        // The lock is held across the insert so the map never gets ahead of
        // the table; the table PK backstops races with other processes.
        if !store::insert_endpoint(&self.pool, name, sql).await? {
            return Err(AppError::Conflict(format!("endpoint '{}' already exists", name)));
        }
        let path = endpoint_path(&self.prefix, name);
        endpoints.insert(
            name.to_string(),
            Arc::new(RegisteredEndpoint {
                name: name.to_string(),
                sql: sql.to_string(),
                path: path.clone(),
                created_at: Utc::now(),
            }),
        );
        tracing::info!(name, path = %path, "registered dynamic endpoint");
        Ok(path)
    }

    pub async fn get(&self, name: &str) -> Option<Arc<RegisteredEndpoint>> {
        self.endpoints.read().await.get(name).cloned()
    }

    /// Registrations sorted by name, for listing and the docs index.
    pub async fn snapshot(&self) -> Vec<Arc<RegisteredEndpoint>> {
        let mut all: Vec<_> = self.endpoints.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub async fn len(&self) -> usize {
        self.endpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.endpoints.read().await.is_empty()
    }
}

/// Path a registration is served at, derived from the name alone.
pub fn endpoint_path(prefix: &str, name: &str) -> String {
    format!("{}/custom/{}", prefix, name)
}

/// The name becomes a URL path segment, so its shape is restricted.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::Validation("endpoint name must not be empty".into()));
    }
    let re = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$")
        .map_err(|_| AppError::Validation("invalid name pattern".into()))?;
    if !re.is_match(name) {
        return Err(AppError::Validation(
            "endpoint name may only contain letters, digits, '_' and '-'".into(),
        ));
    }
    Ok(())
}

/// Templates are read-only: one statement, starting with SELECT or WITH, and
/// no statement separator other than a trailing one.
pub fn validate_template(sql: &str) -> Result<(), AppError> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("sql template must not be empty".into()));
    }
    let head = trimmed
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    if head != "SELECT" && head != "WITH" {
        return Err(AppError::Validation(
            "sql template must be a single SELECT statement".into(),
        ));
    }
    let body = trimmed.trim_end_matches(';');
    if body.contains(';') {
        return Err(AppError::Validation(
            "sql template must not contain multiple statements".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_path_from_prefix_and_name() {
        assert_eq!(endpoint_path("/api", "active_subs"), "/api/custom/active_subs");
    }

    #[test]
    fn accepts_path_safe_names() {
        for name in ["active_subs", "subs-2024", "A1", "_private"] {
            assert!(validate_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_unsafe_or_empty_names() {
        for name in ["", "has space", "a/b", "semi;colon", "-leading", "perc%ent"] {
            assert!(validate_name(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn accepts_select_and_with_templates() {
        assert!(validate_template("SELECT 1").is_ok());
        assert!(validate_template("  select * from network.meters  ").is_ok());
        assert!(validate_template("WITH x AS (SELECT 1) SELECT * FROM x").is_ok());
        assert!(validate_template("SELECT 1;").is_ok());
    }

    #[test]
    fn rejects_writes_and_stacked_statements() {
        assert!(validate_template("").is_err());
        assert!(validate_template("DELETE FROM network.meters").is_err());
        assert!(validate_template("INSERT INTO t VALUES (1)").is_err());
        assert!(validate_template("DROP TABLE network.meters").is_err());
        assert!(validate_template("SELECT 1; DELETE FROM t").is_err());
    }
}
