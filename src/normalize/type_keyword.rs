use crate::error::SchemaShapeError;
use crate::helpers::{replace, types::PrimitiveTypesBitMap};
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::{Map, Value};

/// Removes every schema keyword that is irrelevant/incongruent with a concrete `type`
/// keyword (eg. `pattern` has no effect once `type` is restricted to `"integer"`).
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn remove_extraneous_keys_keyword_type(schema: &mut Value) -> bool {
    let keys_to_preserve: &[&str] = match schema.get("type").and_then(Value::as_str) {
        Some("array") => &[
            "additionalItems",
            "contains",
            "const",
            "enum",
            "items",
            "maxItems",
            "minItems",
            "type",
            "uniqueItems",
        ],
        Some("boolean") | Some("null") => &["const", "enum", "type"],
        Some("integer") | Some("number") => &[
            "const",
            "enum",
            "exclusiveMaximum",
            "exclusiveMinimum",
            "format",
            "maximum",
            "minimum",
            "multipleOf",
            "type",
        ],
        Some("object") => &[
            "additionalProperties",
            "allOf",
            "anyOf",
            "dependencies",
            "const",
            "enum",
            "maxProperties",
            "minProperties",
            "not",
            "oneOf",
            "patternProperties",
            "properties",
            "propertyNames",
            "required",
            "type",
        ],
        Some("string") => &[
            "contentMediaType",
            "contentEncoding",
            "const",
            "enum",
            "format",
            "maxLength",
            "minLength",
            "pattern",
            "type",
        ],
        _ => return false,
    };
    if schema.as_object().is_none() {
        panic!(
            "{}",
            SchemaShapeError::not_an_object("<schema carrying `type`>", schema)
        );
    }
    let schema_object = schema
        .as_object_mut()
        .expect("checked above: schema is an object");
    preserve_keys(schema_object, keys_to_preserve)
}

/// Removes every key of `map` not present in `keys_to_preserve`.
fn preserve_keys(map: &mut Map<String, Value>, keys_to_preserve: &[&str]) -> bool {
    let keys_to_remove: Vec<String> = map
        .keys()
        .filter(|key| !keys_to_preserve.contains(&key.as_str()))
        .cloned()
        .collect();
    let removed_any = !keys_to_remove.is_empty();
    for key in keys_to_remove {
        let _ = map.remove(&key);
    }
    removed_any
}

/// Collapse the `type` keyword to its smallest equivalent JSON representation, dropping it
/// entirely once every primitive type is allowed.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn optimise_keyword_type(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    if !schema_object.contains_key("type") {
        return false;
    }
    let bit_map = PrimitiveTypesBitMap::from_schema_value(schema_object.get("type"));
    replace::type_with(schema_object, bit_map)
}

#[cfg(test)]
mod tests {
    use super::{optimise_keyword_type, remove_extraneous_keys_keyword_type};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(json!({}); "do nothing if type keyword is not present")]
    #[test_case(json!({"type": "array", "minItems": 1}))]
    #[test_case(json!({"type": "integer", "minimum": 1}))]
    #[test_case(json!({"type": "string", "minLength": 1}))]
    #[test_case(json!({"type": "object", "minProperties": 1}))]
    fn test_remove_extraneous_keys_keyword_type_does_not_remove_keys(schema: Value) {
        let mut cloned_schema = schema.clone();
        let _ = remove_extraneous_keys_keyword_type(&mut cloned_schema);
        assert_eq!(schema, cloned_schema);
    }

    #[test_case(json!({"type": "string", "minimum": 1}) => json!({"type": "string"}))]
    #[test_case(json!({"type": "integer", "pattern": "a+"}) => json!({"type": "integer"}))]
    fn test_remove_extraneous_keys_keyword_type_does_remove_keys(mut schema: Value) -> Value {
        let _ = remove_extraneous_keys_keyword_type(&mut schema);
        schema
    }

    #[test_case(json!({}) => json!({}))]
    #[test_case(json!({"type": "string"}) => json!({"type": "string"}))]
    #[test_case(json!({"type": ["string", "integer", "number"]}) => json!({"type": ["number", "string"]}))]
    fn test_optimise_keyword_type(mut schema: Value) -> Value {
        let _ = optimise_keyword_type(&mut schema);
        schema
    }
}
