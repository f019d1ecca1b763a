//! Create-body validation from the entity model.

use crate::error::AppError;
use crate::model::{ColumnType, EntityDef};
use serde_json::Value;
use std::collections::HashMap;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body: required columns present and non-null, values
    /// shaped for their column type. Unknown keys are rejected so typos fail
    /// loudly instead of silently dropping data.
    pub fn validate_create(entity: &EntityDef, body: &HashMap<String, Value>) -> Result<(), AppError> {
        for key in body.keys() {
            if entity.column(key).is_none() {
                return Err(AppError::Validation(format!(
                    "unknown field '{}' for {}",
                    key, entity.path_segment
                )));
            }
        }
        for c in &entity.columns {
            let val = body.get(c.name);
            if c.required_on_create() && (val.is_none() || val == Some(&Value::Null)) {
                return Err(AppError::Validation(format!("{} is required", c.name)));
            }
            if let Some(v) = val {
                validate_shape(c.name, c.ty, v)?;
            }
        }
        Ok(())
    }
}

fn validate_shape(name: &str, ty: ColumnType, v: &Value) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    let ok = match ty {
        ColumnType::Int => v.is_i64() || v.is_u64(),
        ColumnType::Numeric => v.is_number() || v.is_string(),
        ColumnType::Text | ColumnType::VarChar(_) => v.is_string(),
        // Geometry crosses the API as WKT text.
        ColumnType::Geometry(_) => v.is_string(),
        ColumnType::Date | ColumnType::Timestamptz => v.is_string(),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{} has the wrong type", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::network_model;
    use serde_json::json;

    fn body(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn complete_substation_body_passes() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let b = body(&[
            ("substation_name", json!("North Yard")),
            ("voltage_level_kv", json!(110)),
            ("geom", json!("POINT(77.59 12.97)")),
        ]);
        assert!(RequestValidator::validate_create(subs, &b).is_ok());
    }

    #[test]
    fn missing_required_geometry_is_rejected() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let b = body(&[
            ("substation_name", json!("North Yard")),
            ("voltage_level_kv", json!(110)),
        ]);
        let err = RequestValidator::validate_create(subs, &b).unwrap_err();
        assert!(err.to_string().contains("geom"));
    }

    #[test]
    fn null_required_field_is_rejected() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let b = body(&[
            ("substation_name", json!(null)),
            ("voltage_level_kv", json!(110)),
            ("geom", json!("POINT(0 0)")),
        ]);
        assert!(RequestValidator::validate_create(subs, &b).is_err());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let model = network_model();
        let subs = model.entity_by_path("substations").unwrap();
        let b = body(&[
            ("substation_name", json!("n")),
            ("voltage_level_kv", json!(11)),
            ("geom", json!("POINT(0 0)")),
            ("substationname", json!("typo")),
        ]);
        assert!(RequestValidator::validate_create(subs, &b).is_err());
    }

    #[test]
    fn defaulted_columns_may_be_omitted() {
        let model = network_model();
        let switches = model.entity_by_path("switches").unwrap();
        // operational_status and created_at default; conductor_id is nullable.
        let b = body(&[("geom", json!("POINT(1 1)"))]);
        assert!(RequestValidator::validate_create(switches, &b).is_ok());
    }

    #[test]
    fn wrong_scalar_shape_is_rejected() {
        let model = network_model();
        let poles = model.entity_by_path("poles").unwrap();
        let b = body(&[
            ("geom", json!("POINT(0 0)")),
            ("installation_year", json!("nineteen-eighty")),
        ]);
        assert!(RequestValidator::validate_create(poles, &b).is_err());
    }
}
