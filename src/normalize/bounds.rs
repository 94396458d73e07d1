use crate::helpers::{replace, types::PrimitiveTypesBitMap};
use crate::primitive_type::PrimitiveType;
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::Value;

fn cleanup_incongruent_keywords(
    schema: &mut Value,
    schema_primitive_types: &mut PrimitiveTypesBitMap,
    primitive_types_to_remove: PrimitiveTypesBitMap,
    keywords_to_remove: &[&str],
) -> bool {
    schema_primitive_types.remove_all(primitive_types_to_remove);
    if schema_primitive_types.is_empty() {
        replace::with_false_schema(schema)
    } else if let Value::Object(schema_object) = schema {
        let mut updated_schema = false;
        for keyword_to_remove in keywords_to_remove {
            updated_schema |= schema_object.remove(*keyword_to_remove).is_some();
        }
        updated_schema
    } else {
        false
    }
}

fn update_exclusive_maximum_minimum(
    schema: &mut Value,
    schema_primitive_types: &mut PrimitiveTypesBitMap,
) -> bool {
    if schema_primitive_types.contains(PrimitiveType::Integer) {
        match (
            schema.get("exclusiveMaximum").and_then(Value::as_f64),
            schema.get("exclusiveMinimum").and_then(Value::as_f64),
        ) {
            (Some(max_), Some(min_)) if max_ < min_ => cleanup_incongruent_keywords(
                schema,
                schema_primitive_types,
                PrimitiveTypesBitMap::from(&[PrimitiveType::Integer, PrimitiveType::Number]),
                &["exclusiveMaximum", "exclusiveMinimum"],
            ),
            _ => false,
        }
    } else {
        false
    }
}

fn update_max_min_items(
    schema: &mut Value,
    schema_primitive_types: &mut PrimitiveTypesBitMap,
) -> bool {
    if schema_primitive_types.contains(PrimitiveType::Array) {
        match (
            schema.get("maxItems").and_then(Value::as_f64),
            schema.get("minItems").and_then(Value::as_f64),
        ) {
            (Some(max_), Some(min_)) if max_ < min_ => cleanup_incongruent_keywords(
                schema,
                schema_primitive_types,
                PrimitiveTypesBitMap::from(PrimitiveType::Array),
                &["maxItems", "minItems"],
            ),
            (_, Some(min_)) if min_ <= 0. => {
                if let Value::Object(schema_object) = schema {
                    let _ = schema_object.remove("minItems");
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    } else {
        false
    }
}

fn update_max_min_length(
    schema: &mut Value,
    schema_primitive_types: &mut PrimitiveTypesBitMap,
) -> bool {
    if schema_primitive_types.contains(PrimitiveType::String) {
        match (
            schema.get("maxLength").and_then(Value::as_f64),
            schema.get("minLength").and_then(Value::as_f64),
        ) {
            (Some(max_), Some(min_)) if max_ < min_ => cleanup_incongruent_keywords(
                schema,
                schema_primitive_types,
                PrimitiveTypesBitMap::from(PrimitiveType::String),
                &["maxLength", "minLength"],
            ),
            (_, Some(min_)) if min_ <= 0. => {
                if let Value::Object(schema_object) = schema {
                    let _ = schema_object.remove("minLength");
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    } else {
        false
    }
}

fn update_max_min_properties(
    schema: &mut Value,
    schema_primitive_types: &mut PrimitiveTypesBitMap,
) -> bool {
    if schema_primitive_types.contains(PrimitiveType::Object) {
        match (
            schema.get("maxProperties").and_then(Value::as_f64),
            schema.get("minProperties").and_then(Value::as_f64),
        ) {
            (Some(max_), Some(min_)) if max_ < min_ => cleanup_incongruent_keywords(
                schema,
                schema_primitive_types,
                PrimitiveType::Object.into(),
                &["maxProperties", "minProperties"],
            ),
            (_, Some(min_)) if min_ <= 0. => {
                if let Value::Object(schema_object) = schema {
                    let _ = schema_object.remove("minProperties");
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    } else {
        false
    }
}

fn update_maximum_minimum(
    schema: &mut Value,
    schema_primitive_types: &mut PrimitiveTypesBitMap,
) -> bool {
    if schema_primitive_types.contains(PrimitiveType::Integer) {
        match (
            schema.get("maximum").and_then(Value::as_f64),
            schema.get("minimum").and_then(Value::as_f64),
        ) {
            (Some(max_), Some(min_)) if max_ < min_ => cleanup_incongruent_keywords(
                schema,
                schema_primitive_types,
                PrimitiveTypesBitMap::from(&[PrimitiveType::Integer, PrimitiveType::Number]),
                &["maximum", "minimum"],
            ),
            _ => false,
        }
    } else {
        false
    }
}

/// Ensure that every max/min keyword pair is satisfiable, given the schema's current `type`
/// constraint. Replaces the schema with `false` when no allowed type can satisfy its bounds,
/// and narrows `type` when only some of the allowed types are incongruent.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn update_max_min_related_keywords(schema: &mut Value) -> bool {
    let mut updated_schema = false;
    let mut schema_primitive_types = PrimitiveTypesBitMap::from_schema(schema);

    for method in &[
        update_max_min_items,
        update_max_min_length,
        update_max_min_properties,
        update_exclusive_maximum_minimum,
        update_maximum_minimum,
    ] {
        updated_schema |= method(schema, &mut schema_primitive_types);
    }

    if updated_schema {
        if let Value::Object(schema_object) = schema {
            let _ = replace::type_with(schema_object, schema_primitive_types);
        }
    }
    updated_schema
}

#[cfg(test)]
mod tests {
    use super::update_max_min_related_keywords;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"type": "integer", "maximum": 2, "minimum": 1}) => json!({"type": "integer", "maximum": 2, "minimum": 1}))]
    #[test_case(&json!({"type": "integer", "maximum": 1, "minimum": 2}) => json!(false))]
    #[test_case(&json!({"type": ["integer", "null"], "maximum": 1, "minimum": 2}) => json!({"type": "null"}))]
    #[test_case(&json!({"type": "array", "minItems": 0}) => json!({"type": "array"}))]
    #[test_case(&json!({"type": "string", "maxLength": 1, "minLength": 2}) => json!(false))]
    #[test_case(&json!({"type": "object", "maxProperties": 1, "minProperties": 2}) => json!(false))]
    #[test_case(&json!({"type": "integer", "exclusiveMaximum": 1, "exclusiveMinimum": 2}) => json!(false))]
    #[test_case(&json!({}) => json!({}))]
    fn test_update_max_min_related_keywords(schema: &Value) -> Value {
        let mut schema = schema.clone();
        let _ = update_max_min_related_keywords(&mut schema);
        schema
    }
}
