use crate::helpers::is;
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::Value;

/// Simplifies the `items` keyword:
/// - a tuple (`items: [...]`) whose trailing entries are all the `true` schema and whose
///   `additionalItems` is itself `true`/absent can have those trailing entries dropped, since
///   they add no constraint beyond what `additionalItems` already allows;
/// - a tuple made up entirely of `true` schemas collapses to the `true` schema itself.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn simplify_items(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let additional_items_is_unconstrained = schema_object
        .get("additionalItems")
        .map_or(true, is::true_schema);

    let tuple = if let Some(Value::Array(tuple)) = schema_object.get_mut("items") {
        tuple
    } else {
        return false;
    };

    let mut updated_schema = false;
    if additional_items_is_unconstrained {
        while tuple.last().map_or(false, is::true_schema) {
            let _ = tuple.pop();
            updated_schema = true;
        }
    }
    if tuple.is_empty() {
        let _ = schema_object.insert("items".to_string(), Value::Bool(true));
        return true;
    }
    if tuple.iter().all(is::true_schema) {
        let _ = schema_object.insert("items".to_string(), Value::Bool(true));
        updated_schema = true;
    }
    updated_schema
}

/// `additionalItems` only has meaning when `items` is a tuple; drop it otherwise.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn simplify_additional_items(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    if !schema_object.contains_key("additionalItems") {
        return false;
    }
    let items_is_tuple = matches!(schema_object.get("items"), Some(Value::Array(_)));
    if items_is_tuple {
        false
    } else {
        let _ = schema_object.remove("additionalItems");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{simplify_additional_items, simplify_items};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(json!({"items": [true, true]}) => json!({"items": true}))]
    #[test_case(json!({"items": [{"type": "string"}, true]}) => json!({"items": [{"type": "string"}]}))]
    #[test_case(json!({"items": [{"type": "string"}, true], "additionalItems": false}) => json!({"items": [{"type": "string"}, true], "additionalItems": false}))]
    #[test_case(json!({"items": {"type": "string"}}) => json!({"items": {"type": "string"}}))]
    #[test_case(json!({"items": []}) => json!({"items": true}))]
    fn test_simplify_items(mut schema: Value) -> Value {
        let _ = simplify_items(&mut schema);
        schema
    }

    #[test_case(json!({"additionalItems": false, "items": {"type": "string"}}) => json!({"items": {"type": "string"}}))]
    #[test_case(json!({"additionalItems": false}) => json!({}))]
    #[test_case(json!({"additionalItems": false, "items": [{"type": "string"}]}) => json!({"additionalItems": false, "items": [{"type": "string"}]}))]
    fn test_simplify_additional_items(mut schema: Value) -> Value {
        let _ = simplify_additional_items(&mut schema);
        schema
    }
}
