use crate::helpers::is;
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::Value;
use std::collections::HashMap;

/// Removes keywords that only have meaning when a "parent" keyword is also present.
/// Examples: `then`/`else` without `if`; `additionalItems` without `items`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn remove_keywords_in_must_ignore_groups(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };

    let mut updated_schema = false;

    macro_rules! define_parent_child_relation {
        ($($parent: literal => $child: literal),*,) => {
            $(if schema_object.contains_key($child) && !schema_object.contains_key($parent) {
                let _ = schema_object.remove($child);
                updated_schema = true;
            })*
        };
    }
    define_parent_child_relation!(
        "if" => "else",
        "if" => "then",
        "items" => "additionalItems",
    );

    updated_schema
}

#[inline]
fn value_is_zero(value: &Value) -> bool {
    value.as_f64().map_or(false, |number| number == 0.0)
}

#[inline]
fn value_is_empty_array(value: &Value) -> bool {
    matches!(value, Value::Array(array) if array.is_empty())
}

#[inline]
fn value_is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(object) if object.is_empty())
}

lazy_static::lazy_static! {
    static ref KEYWORD_TO_OMIT_CHECK: HashMap<&'static str, for<'r> fn(&'r Value) -> bool> = {
        let mut res: HashMap<&'static str, for<'r> fn(&'r Value) -> bool> = HashMap::new();
        let _ = res.insert("additionalItems", is::true_schema);
        let _ = res.insert("additionalProperties", is::true_schema);
        let _ = res.insert("dependencies", value_is_empty_object);
        let _ = res.insert("else", is::true_schema);
        let _ = res.insert("items", is::true_schema);
        let _ = res.insert("minItems", value_is_zero);
        let _ = res.insert("minLength", value_is_zero);
        let _ = res.insert("minProperties", value_is_zero);
        let _ = res.insert("patternProperties", value_is_empty_object);
        let _ = res.insert("properties", value_is_empty_object);
        let _ = res.insert("propertyNames", value_is_empty_object);
        let _ = res.insert("required", value_is_empty_array);
        let _ = res.insert("then", is::true_schema);
        let _ = res.insert("uniqueItems", is::false_schema);
        res
    };
}

/// Removes keywords whose current value cannot alter the schema's selectivity, eg.
/// `additionalProperties: true`, `minLength: 0`, `required: []`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn omit_keywords_that_do_not_alter_schema_selectivity(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };

    let keywords_to_remove: Vec<&&str> = KEYWORD_TO_OMIT_CHECK
        .iter()
        .filter_map(|(property, omit_check)| {
            schema_object
                .get(*property)
                .filter(|subschema| omit_check(subschema))
                .map(|_| property)
        })
        .collect();

    for keyword_to_remove in &keywords_to_remove {
        let _ = schema_object.remove(**keyword_to_remove);
    }
    !keywords_to_remove.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{
        omit_keywords_that_do_not_alter_schema_selectivity, remove_keywords_in_must_ignore_groups,
    };
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({}) => json!({}))]
    #[test_case(&json!({"additionalItems": true, "items": true}) => json!({"additionalItems": true, "items": true}))]
    #[test_case(&json!({"additionalItems": true}) => json!({}))]
    #[test_case(&json!({"else": true, "if": true}) => json!({"else": true, "if": true}))]
    #[test_case(&json!({"else": true}) => json!({}))]
    #[test_case(&json!({"then": true, "if": true}) => json!({"then": true, "if": true}))]
    #[test_case(&json!({"then": true}) => json!({}))]
    fn test_remove_keywords_in_must_ignore_groups(value: &Value) -> Value {
        let mut schema = value.clone();
        let _ = remove_keywords_in_must_ignore_groups(&mut schema);
        schema
    }

    #[test_case(&json!({"additionalItems": {"type": "string"}}) => json!({"additionalItems": {"type": "string"}}))]
    #[test_case(&json!({"additionalItems": {}}) => json!({}))]
    #[test_case(&json!({"additionalItems": true}) => json!({}))]
    #[test_case(&json!({"dependencies": {"p1": ["p2", "p3"]}}) => json!({"dependencies": {"p1": ["p2", "p3"]}}))]
    #[test_case(&json!({"dependencies": {}}) => json!({}))]
    #[test_case(&json!({"items": {"type": "string"}}) => json!({"items": {"type": "string"}}))]
    #[test_case(&json!({"items": []}) => json!({"items": []}))]
    #[test_case(&json!({"items": {}}) => json!({}))]
    #[test_case(&json!({"minItems": 0}) => json!({}))]
    #[test_case(&json!({"minItems": 1}) => json!({"minItems": 1}))]
    #[test_case(&json!({"required": ["p1"]}) => json!({"required": ["p1"]}))]
    #[test_case(&json!({"required": []}) => json!({}))]
    #[test_case(&json!({"uniqueItems": false}) => json!({}))]
    #[test_case(&json!({"uniqueItems": true}) => json!({"uniqueItems": true}))]
    fn test_omit_keywords_that_do_not_alter_schema_selectivity(value: &Value) -> Value {
        let mut schema = value.clone();
        let _ = omit_keywords_that_do_not_alter_schema_selectivity(&mut schema);
        schema
    }
}
