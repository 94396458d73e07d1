use crate::helpers::is;
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::Value;

/// Dedupe the `required` array (preserving the first occurrence's position) and remove the
/// keyword entirely once it becomes empty.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn remove_empty_required(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let required = if let Some(Value::Array(required)) = schema_object.get("required") {
        required.clone()
    } else {
        return false;
    };
    let mut deduped: Vec<Value> = Vec::with_capacity(required.len());
    for item in &required {
        if !deduped.contains(item) {
            deduped.push(item.clone());
        }
    }
    if deduped.is_empty() {
        let _ = schema_object.remove("required");
        return true;
    }
    if deduped.len() == required.len() {
        return false;
    }
    let _ = schema_object.insert("required".to_string(), Value::Array(deduped));
    true
}

/// A `properties` entry whose subschema is the `true` schema adds no constraint beyond what
/// `additionalProperties` already allows once `additionalProperties` is itself unconstrained;
/// such entries are dropped.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn remove_empty_additional_properties(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let additional_properties_is_unconstrained = schema_object
        .get("additionalProperties")
        .map_or(true, is::true_schema);
    if !additional_properties_is_unconstrained {
        return false;
    }
    let properties = if let Some(Value::Object(properties)) = schema_object.get_mut("properties")
    {
        properties
    } else {
        return false;
    };
    let keys_to_remove: Vec<String> = properties
        .iter()
        .filter(|(_, subschema)| is::true_schema(subschema))
        .map(|(key, _)| key.clone())
        .collect();
    if keys_to_remove.is_empty() {
        return false;
    }
    for key in &keys_to_remove {
        let _ = properties.remove(key);
    }
    if properties.is_empty() {
        let _ = schema_object.remove("properties");
    }
    true
}

/// `propertyNames` pinned to a `const`/single-valued `enum` makes every `properties` entry
/// whose key doesn't match unreachable; such entries can never validate and are dropped.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn optimise_property_names(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let allowed_names: Vec<String> = match schema_object.get("propertyNames") {
        Some(Value::Object(property_names)) => {
            if let Some(Value::String(name)) = property_names.get("const") {
                vec![name.clone()]
            } else if let Some(Value::Array(names)) = property_names.get("enum") {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            } else {
                return false;
            }
        }
        _ => return false,
    };

    let properties = if let Some(Value::Object(properties)) = schema_object.get_mut("properties")
    {
        properties
    } else {
        return false;
    };
    let keys_to_remove: Vec<String> = properties
        .keys()
        .filter(|key| !allowed_names.contains(key))
        .cloned()
        .collect();
    if keys_to_remove.is_empty() {
        return false;
    }
    for key in &keys_to_remove {
        let _ = properties.remove(key);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{
        optimise_property_names, remove_empty_additional_properties, remove_empty_required,
    };
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(json!({"required": ["a", "a", "b"]}) => json!({"required": ["a", "b"]}))]
    #[test_case(json!({"required": ["a"]}) => json!({"required": ["a"]}))]
    #[test_case(json!({"required": ["a", "a"]}) => json!({"required": ["a"]}))]
    fn test_remove_empty_required(mut schema: Value) -> Value {
        let _ = remove_empty_required(&mut schema);
        schema
    }

    #[test_case(json!({"properties": {"a": {}, "b": {"type": "string"}}}) => json!({"properties": {"b": {"type": "string"}}}))]
    #[test_case(json!({"properties": {"a": {}}}) => json!({}))]
    #[test_case(json!({"properties": {"a": {}}, "additionalProperties": false}) => json!({"properties": {"a": {}}, "additionalProperties": false}))]
    fn test_remove_empty_additional_properties(mut schema: Value) -> Value {
        let _ = remove_empty_additional_properties(&mut schema);
        schema
    }

    #[test_case(json!({"propertyNames": {"const": "a"}, "properties": {"a": {}, "b": {}}}) => json!({"propertyNames": {"const": "a"}, "properties": {"a": {}}}))]
    #[test_case(json!({"propertyNames": {"enum": ["a", "b"]}, "properties": {"a": {}, "c": {}}}) => json!({"propertyNames": {"enum": ["a", "b"]}, "properties": {"a": {}}}))]
    #[test_case(json!({"properties": {"a": {}}}) => json!({"properties": {"a": {}}}))]
    fn test_optimise_property_names(mut schema: Value) -> Value {
        let _ = optimise_property_names(&mut schema);
        schema
    }
}
