use crate::helpers::replace;
use crate::helpers::types::PrimitiveTypesBitMap;
use crate::primitive_type::PrimitiveType;
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::Value;

/// A `const` keyword pins the schema to a single value, which in turn pins its `type`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn infer_type_from_const(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let const_value = if let Some(value) = schema_object.get("const") {
        value.clone()
    } else {
        return false;
    };
    let inferred = PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::from_serde_value(&const_value));
    let current = PrimitiveTypesBitMap::from_schema_value(schema_object.get("type"));
    replace::type_with(schema_object, current & inferred)
}

/// Every member of an `enum` keyword must be of a type compatible with it; if they all share
/// the same type that type can be inferred onto the `type` keyword.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn infer_type_from_enum(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let enum_values = if let Some(value) = schema_object.get("enum").and_then(Value::as_array) {
        value.clone()
    } else {
        return false;
    };
    if enum_values.is_empty() {
        return false;
    }
    let inferred = enum_values
        .iter()
        .fold(PrimitiveTypesBitMap::default(), |acc, value| {
            acc | PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::from_serde_value(value))
        });
    let current = PrimitiveTypesBitMap::from_schema_value(schema_object.get("type"));
    replace::type_with(schema_object, current & inferred)
}

/// An `enum` with a single member is equivalent to (and more verbose than) `const`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn collapse_single_member_enum(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    if schema_object.contains_key("const") {
        return false;
    }
    let single_value = match schema_object.get("enum").and_then(Value::as_array) {
        Some(values) if values.len() == 1 => values[0].clone(),
        _ => return false,
    };
    let _ = schema_object.remove("enum");
    let _ = schema_object.insert("const".to_string(), single_value);
    true
}

/// If both `const` and `enum` are present, `enum` is redundant with `const`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn drop_enum_redundant_with_const(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    if !schema_object.contains_key("const") {
        return false;
    }
    if schema_object.remove("enum").is_some() {
        true
    } else {
        false
    }
}

/// Drops a `const` value incompatible with the current `type` keyword, collapsing to `false`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn prune_const_incompatible_with_type(schema: &mut Value) -> bool {
    let const_value = if let Some(value) = schema.get("const") {
        value.clone()
    } else {
        return false;
    };
    let const_type = PrimitiveType::from_serde_value(&const_value);
    let allowed = PrimitiveTypesBitMap::from_schema_value(schema.get("type"));
    if allowed.contains(const_type) {
        false
    } else {
        replace::with_false_schema(schema)
    }
}

/// Removes `enum` members incompatible with the current `type` keyword; collapses to `false`
/// if no member survives.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn prune_enum_incompatible_with_type(schema: &mut Value) -> bool {
    let allowed = PrimitiveTypesBitMap::from_schema_value(schema.get("type"));
    let schema_object = if let Some(value) = schema.as_object() {
        value
    } else {
        return false;
    };
    let enum_values = if let Some(value) = schema_object.get("enum").and_then(Value::as_array) {
        value.clone()
    } else {
        return false;
    };
    let retained: Vec<Value> = enum_values
        .iter()
        .filter(|value| allowed.contains(PrimitiveType::from_serde_value(value)))
        .cloned()
        .collect();
    if retained.len() == enum_values.len() {
        return false;
    }
    if retained.is_empty() {
        return replace::with_false_schema(schema);
    }
    let schema_object = schema.as_object_mut().expect("checked above");
    let _ = schema_object.insert("enum".to_string(), Value::Array(retained));
    true
}

#[cfg(test)]
mod tests {
    use super::{
        collapse_single_member_enum, drop_enum_redundant_with_const, infer_type_from_const,
        infer_type_from_enum, prune_const_incompatible_with_type, prune_enum_incompatible_with_type,
    };
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(json!({"const": 42}) => json!({"const": 42, "type": "integer"}))]
    #[test_case(json!({"const": "a"}) => json!({"const": "a", "type": "string"}))]
    #[test_case(json!({"const": null}) => json!({"const": null, "type": "null"}))]
    #[test_case(json!({}) => json!({}))]
    fn test_infer_type_from_const(mut schema: Value) -> Value {
        let _ = infer_type_from_const(&mut schema);
        schema
    }

    #[test_case(json!({"enum": ["a", "b"]}) => json!({"enum": ["a", "b"], "type": "string"}))]
    #[test_case(json!({"enum": [1, "a"]}) => json!({"enum": [1, "a"]}))]
    #[test_case(json!({"enum": []}) => json!({"enum": []}))]
    fn test_infer_type_from_enum(mut schema: Value) -> Value {
        let _ = infer_type_from_enum(&mut schema);
        schema
    }

    #[test_case(json!({"enum": ["a"]}) => json!({"const": "a"}))]
    #[test_case(json!({"enum": ["a", "b"]}) => json!({"enum": ["a", "b"]}))]
    #[test_case(json!({"enum": ["a"], "const": "b"}) => json!({"enum": ["a"], "const": "b"}))]
    fn test_collapse_single_member_enum(mut schema: Value) -> Value {
        let _ = collapse_single_member_enum(&mut schema);
        schema
    }

    #[test_case(json!({"const": "a", "enum": ["a", "b"]}) => json!({"const": "a"}))]
    #[test_case(json!({"enum": ["a", "b"]}) => json!({"enum": ["a", "b"]}))]
    fn test_drop_enum_redundant_with_const(mut schema: Value) -> Value {
        let _ = drop_enum_redundant_with_const(&mut schema);
        schema
    }

    #[test_case(json!({"const": "a", "type": "integer"}) => json!(false))]
    #[test_case(json!({"const": "a", "type": "string"}) => json!({"const": "a", "type": "string"}))]
    #[test_case(json!({"const": "a"}) => json!({"const": "a"}))]
    fn test_prune_const_incompatible_with_type(mut schema: Value) -> Value {
        let _ = prune_const_incompatible_with_type(&mut schema);
        schema
    }

    #[test_case(json!({"enum": [1, "a"], "type": "string"}) => json!({"enum": ["a"], "type": "string"}))]
    #[test_case(json!({"enum": [1], "type": "string"}) => json!(false))]
    #[test_case(json!({"enum": ["a", "b"], "type": "string"}) => json!({"enum": ["a", "b"], "type": "string"}))]
    fn test_prune_enum_incompatible_with_type(mut schema: Value) -> Value {
        let _ = prune_enum_incompatible_with_type(&mut schema);
        schema
    }
}
