//! Convert JSON and query-string values to types that sqlx can bind.

use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value that can be bound to a PostgreSQL query.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(uuid::Uuid),
    Json(Value),
}

impl PgBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => PgBindValue::Null,
            Value::Bool(b) => PgBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PgBindValue::I64(i)
                } else if let Some(f) = n.as_f64() {
                    PgBindValue::F64(f)
                } else {
                    PgBindValue::Null
                }
            }
            Value::String(s) => {
                if let Ok(u) = uuid::Uuid::parse_str(s) {
                    PgBindValue::Uuid(u)
                } else {
                    PgBindValue::String(s.clone())
                }
            }
            Value::Array(_) | Value::Object(_) => PgBindValue::Json(v.clone()),
        }
    }

    /// Coerce a raw query-string value by shape. Templates can force a type
    /// with an explicit SQL cast when the heuristic is not what they want.
    pub fn from_query_param(s: &str) -> Self {
        if s.eq_ignore_ascii_case("true") {
            return PgBindValue::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return PgBindValue::Bool(false);
        }
        if let Ok(n) = s.parse::<i64>() {
            return PgBindValue::I64(n);
        }
        if let Ok(f) = s.parse::<f64>() {
            return PgBindValue::F64(f);
        }
        if let Ok(u) = uuid::Uuid::parse_str(s) {
            return PgBindValue::Uuid(u);
        }
        PgBindValue::String(s.to_string())
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<i32> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => {
                let s_ref: &str = s.as_str();
                <&str as Encode<Postgres>>::encode_by_ref(&s_ref, buf)?
            }
            PgBindValue::Uuid(u) => {
                let u_str = u.to_string();
                <&str as Encode<Postgres>>::encode_by_ref(&u_str.as_str(), buf)?
            }
            PgBindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_params_coerce_by_shape() {
        assert_eq!(PgBindValue::from_query_param("42"), PgBindValue::I64(42));
        assert_eq!(PgBindValue::from_query_param("-7"), PgBindValue::I64(-7));
        assert_eq!(PgBindValue::from_query_param("3.5"), PgBindValue::F64(3.5));
        assert_eq!(PgBindValue::from_query_param("true"), PgBindValue::Bool(true));
        assert_eq!(PgBindValue::from_query_param("False"), PgBindValue::Bool(false));
        assert_eq!(
            PgBindValue::from_query_param("Active"),
            PgBindValue::String("Active".into())
        );
    }

    #[test]
    fn uuid_shaped_params_bind_as_uuid() {
        let u = "8d8ac610-566d-4ef0-9c22-186b2a5ed793";
        match PgBindValue::from_query_param(u) {
            PgBindValue::Uuid(parsed) => assert_eq!(parsed.to_string(), u),
            other => panic!("expected uuid, got {:?}", other),
        }
    }

    #[test]
    fn json_strings_stay_strings_unless_uuid() {
        assert_eq!(
            PgBindValue::from_json(&serde_json::json!("hello")),
            PgBindValue::String("hello".into())
        );
        assert_eq!(PgBindValue::from_json(&serde_json::json!(null)), PgBindValue::Null);
        assert_eq!(PgBindValue::from_json(&serde_json::json!(12)), PgBindValue::I64(12));
    }
}
