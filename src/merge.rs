//! The merge engine: computes **A ∩ B**, the schema whose accepted set is the
//! intersection of its operands' accepted sets, or `None` (∅) when the operands are
//! structurally incompatible.
//!
//! Every object/array keyword (`properties`, `patternProperties`, `additionalProperties`,
//! `items`, `additionalItems`, `dependencies`) is handled as a first-class case rather than
//! deferred, and the result always runs through a conflict scan plus a final normalize pass.
use crate::format;
use crate::helpers::types::PrimitiveTypesBitMap;
use crate::helpers::{common_values_and_deduplicate, is, join_and_deduplicate};
use crate::normalize::normalize;
use crate::pattern;
use crate::primitive_type::PrimitiveType;
use serde_json::{Map, Value};

/// Keywords whose intersection needs context from their siblings, so they are handled by a
/// dedicated pass after the generic per-keyword loop rather than in it.
const DEFERRED_KEYWORDS: &[&str] = &[
    "additionalItems",
    "additionalProperties",
    "items",
    "patternProperties",
    "properties",
    "dependencies",
];

/// Applicator keywords that are never folded into a flat merge: when both operands define
/// one (with different values) the second is pushed into `allOf` instead.
const RESIDUAL_KEYWORDS: &[&str] = &[
    "not", "anyOf", "oneOf", "if", "then", "else", "multipleOf",
];

/// Compute `A ∩ B`. `None` means the operands are incompatible (∅).
pub(crate) fn merge(a: &Value, b: &Value) -> Option<Value> {
    if is::false_schema(a) || is::false_schema(b) {
        return None;
    }
    if is::true_schema(a) {
        return Some(normalize(b.clone()));
    }
    if is::true_schema(b) {
        return Some(normalize(a.clone()));
    }
    let a_obj = a.as_object()?;
    let b_obj = b.as_object()?;

    let mut merged = a_obj.clone();
    for (key, b_value) in b_obj {
        if DEFERRED_KEYWORDS.contains(&key.as_str()) {
            continue;
        }
        match merged.get(key).cloned() {
            None => {
                let _ = merged.insert(key.clone(), b_value.clone());
            }
            Some(a_value) => {
                if &a_value == b_value {
                    continue;
                }
                merge_keyword(&mut merged, key, &a_value, b_value)?;
            }
        }
    }

    merge_items_keywords(&mut merged, a_obj, b_obj)?;
    merge_properties_keywords(&mut merged, a_obj, b_obj)?;
    merge_dependencies(&mut merged, a_obj, b_obj)?;

    if has_structural_conflict(&merged) {
        return None;
    }

    Some(normalize(Value::Object(merged)))
}

/// Fold `b_value` for `key` into `merged[key]` (currently holding `a_value`). Returns `None`
/// when the fold reveals the operands are incompatible.
fn merge_keyword(
    merged: &mut Map<String, Value>,
    key: &str,
    a_value: &Value,
    b_value: &Value,
) -> Option<()> {
    match key {
        "allOf" | "required" => {
            if let (Value::Array(a_items), Value::Array(b_items)) = (a_value, b_value) {
                let mut items = a_items.clone();
                join_and_deduplicate(&mut items, b_items);
                let _ = merged.insert(key.to_string(), Value::Array(items));
            }
            Some(())
        }
        "const" => {
            if a_value != b_value {
                return None;
            }
            Some(())
        }
        "contentEncoding" | "contentMediaType" => {
            if a_value != b_value {
                return None;
            }
            Some(())
        }
        "format" => {
            let (a_name, b_name) = (a_value.as_str()?, b_value.as_str()?);
            if format::has_format_conflict(a_name, b_name) {
                return None;
            }
            let _ = merged.insert(
                key.to_string(),
                Value::String(format::more_specific_format(a_name, b_name).to_string()),
            );
            Some(())
        }
        "contains" | "propertyNames" => {
            let merged_sub = merge(a_value, b_value)?;
            let _ = merged.insert(key.to_string(), merged_sub);
            Some(())
        }
        "pattern" => {
            let (a_pattern, b_pattern) = (a_value.as_str()?, b_value.as_str()?);
            if pattern::is_trivial_pattern(a_pattern) {
                let _ = merged.insert(key.to_string(), b_value.clone());
            } else if pattern::is_trivial_pattern(b_pattern) {
                // `a_pattern` is already in `merged`, keep it.
            } else if pattern::is_pattern_subset(a_pattern, b_pattern) {
                // `a_pattern` is the narrower constraint, keep it.
            } else if pattern::is_pattern_subset(b_pattern, a_pattern) {
                let _ = merged.insert(key.to_string(), b_value.clone());
            } else {
                push_residual(merged, key, b_value);
            }
            Some(())
        }
        "enum" => {
            if let (Value::Array(a_items), Value::Array(b_items)) = (a_value, b_value) {
                let mut items = a_items.clone();
                common_values_and_deduplicate(&mut items, b_items);
                if items.is_empty() {
                    return None;
                }
                let _ = merged.insert(key.to_string(), Value::Array(items));
            }
            Some(())
        }
        "exclusiveMaximum" | "maxItems" | "maxLength" | "maxProperties" | "maximum" => {
            if b_value.as_f64() < a_value.as_f64() {
                let _ = merged.insert(key.to_string(), b_value.clone());
            }
            if numeric_contradiction(merged) {
                return None;
            }
            Some(())
        }
        "exclusiveMinimum" | "minItems" | "minLength" | "minProperties" | "minimum" => {
            if b_value.as_f64() > a_value.as_f64() {
                let _ = merged.insert(key.to_string(), b_value.clone());
            }
            if numeric_contradiction(merged) {
                return None;
            }
            Some(())
        }
        "type" => {
            let a_types = PrimitiveTypesBitMap::from_schema_value(Some(a_value));
            let b_types = PrimitiveTypesBitMap::from_schema_value(Some(b_value));
            let common = a_types & b_types;
            if common.is_empty() {
                return None;
            }
            match common.to_schema_value() {
                Some(value) => {
                    let _ = merged.insert(key.to_string(), value);
                }
                None => {
                    let _ = merged.remove(key);
                }
            }
            Some(())
        }
        "uniqueItems" => {
            let value = a_value == &Value::Bool(true) || b_value == &Value::Bool(true);
            let _ = merged.insert(key.to_string(), Value::Bool(value));
            Some(())
        }
        _ if RESIDUAL_KEYWORDS.contains(&key) => {
            push_residual(merged, key, b_value);
            Some(())
        }
        _ => {
            // Opaque/unrecognised keyword: since the values differ and we have no semantics
            // for this keyword, keep the original but record the operand's view as a residual
            // constraint so subset checks can still tell the two schemas apart.
            push_residual(merged, key, b_value);
            Some(())
        }
    }
}

fn numeric_contradiction(merged: &Map<String, Value>) -> bool {
    let min = merged.get("minimum").and_then(Value::as_f64);
    let max = merged.get("maximum").and_then(Value::as_f64);
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return true;
        }
    }
    let items_ok = le_pair(merged, "minItems", "maxItems");
    let length_ok = le_pair(merged, "minLength", "maxLength");
    let properties_ok = le_pair(merged, "minProperties", "maxProperties");
    !items_ok || !length_ok || !properties_ok
}

fn le_pair(merged: &Map<String, Value>, min_key: &str, max_key: &str) -> bool {
    match (
        merged.get(min_key).and_then(Value::as_f64),
        merged.get(max_key).and_then(Value::as_f64),
    ) {
        (Some(min), Some(max)) => min <= max,
        _ => true,
    }
}

/// Push `value` for `key` as a residual `allOf` entry instead of overwriting `merged[key]`.
fn push_residual(merged: &mut Map<String, Value>, key: &str, value: &Value) {
    let mut residual = Map::with_capacity(1);
    let _ = residual.insert(key.to_string(), value.clone());
    let all_of = merged
        .entry("allOf")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = all_of {
        items.push(Value::Object(residual));
    }
}

/// `items`/`additionalItems`: single ∩ single recurses; tuple ∩ tuple recurses pairwise
/// with the tail handled by each side's `additionalItems`; single ∩ tuple applies the
/// single schema to each tuple slot.
fn merge_items_keywords(
    merged: &mut Map<String, Value>,
    a_obj: &Map<String, Value>,
    b_obj: &Map<String, Value>,
) -> Option<()> {
    match (a_obj.get("items"), b_obj.get("items")) {
        (None, None) => {}
        (Some(a_items), None) => {
            let _ = merged.insert("items".to_string(), a_items.clone());
            if let Some(v) = a_obj.get("additionalItems") {
                let _ = merged.insert("additionalItems".to_string(), v.clone());
            }
        }
        (None, Some(b_items)) => {
            let _ = merged.insert("items".to_string(), b_items.clone());
            if let Some(v) = b_obj.get("additionalItems") {
                let _ = merged.insert("additionalItems".to_string(), v.clone());
            }
        }
        (Some(Value::Array(a_items)), Some(Value::Array(b_items))) => {
            let len = a_items.len().max(b_items.len());
            let a_additional = a_obj.get("additionalItems").cloned().unwrap_or(Value::Bool(true));
            let b_additional = b_obj.get("additionalItems").cloned().unwrap_or(Value::Bool(true));
            let mut items = Vec::with_capacity(len);
            for index in 0..len {
                let a_item = a_items.get(index).unwrap_or(&a_additional);
                let b_item = b_items.get(index).unwrap_or(&b_additional);
                items.push(merge(a_item, b_item)?);
            }
            let _ = merged.insert("items".to_string(), Value::Array(items));
            let merged_additional = merge(&a_additional, &b_additional)?;
            let _ = merged.insert("additionalItems".to_string(), merged_additional);
        }
        (Some(single @ Value::Object(_)), Some(Value::Array(tuple)))
        | (Some(Value::Array(tuple)), Some(single @ Value::Object(_))) => {
            let mut items = Vec::with_capacity(tuple.len());
            for tuple_item in tuple {
                items.push(merge(single, tuple_item)?);
            }
            let _ = merged.insert("items".to_string(), Value::Array(items));
            let other_additional = if a_obj.get("items") == Some(single) {
                b_obj.get("additionalItems").cloned()
            } else {
                a_obj.get("additionalItems").cloned()
            };
            if let Some(additional) = other_additional {
                let merged_additional = merge(single, &additional)?;
                let _ = merged.insert("additionalItems".to_string(), merged_additional);
            }
        }
        (Some(a_items), Some(b_items)) => {
            let merged_items = merge(a_items, b_items)?;
            let _ = merged.insert("items".to_string(), merged_items);
        }
    }
    Some(())
}

/// `properties`/`patternProperties`/`additionalProperties`: for each key in either side's
/// `properties`, intersect the per-key schemas (absent key defaults to `true`, or to the
/// other side's `additionalProperties` when it is a schema).
fn merge_properties_keywords(
    merged: &mut Map<String, Value>,
    a_obj: &Map<String, Value>,
    b_obj: &Map<String, Value>,
) -> Option<()> {
    let empty = Map::new();
    let a_properties = a_obj
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let b_properties = b_obj
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let a_additional = a_obj.get("additionalProperties").cloned().unwrap_or(Value::Bool(true));
    let b_additional = b_obj.get("additionalProperties").cloned().unwrap_or(Value::Bool(true));

    if !a_properties.is_empty() || !b_properties.is_empty() {
        let mut properties = Map::new();
        let mut keys: Vec<&String> = a_properties.keys().collect();
        for key in b_properties.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        for key in keys {
            let a_schema = a_properties.get(key).unwrap_or(&a_additional);
            let b_schema = b_properties.get(key).unwrap_or(&b_additional);
            let merged_schema = merge(a_schema, b_schema)?;
            let _ = properties.insert(key.clone(), merged_schema);
        }
        let _ = merged.insert("properties".to_string(), Value::Object(properties));
    }

    if a_obj.contains_key("additionalProperties") || b_obj.contains_key("additionalProperties") {
        let merged_additional = merge(&a_additional, &b_additional)?;
        let _ = merged.insert("additionalProperties".to_string(), merged_additional);
    }

    let a_pattern_properties = a_obj
        .get("patternProperties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let b_pattern_properties = b_obj
        .get("patternProperties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    if !a_pattern_properties.is_empty() || !b_pattern_properties.is_empty() {
        let mut pattern_properties = a_pattern_properties.clone();
        for (key, b_schema) in b_pattern_properties {
            match pattern_properties.get(key).cloned() {
                Some(a_schema) => {
                    let merged_schema = merge(&a_schema, b_schema)?;
                    let _ = pattern_properties.insert(key.clone(), merged_schema);
                }
                None => {
                    let _ = pattern_properties.insert(key.clone(), b_schema.clone());
                }
            }
        }
        let _ = merged.insert(
            "patternProperties".to_string(),
            Value::Object(pattern_properties),
        );
    }

    Some(())
}

/// `dependencies`: per-key union for the array (property-dependency) form; recurse for the
/// schema-dependency form; a mixed pairing treats the array form as `{ required: [...] }`.
fn merge_dependencies(
    merged: &mut Map<String, Value>,
    a_obj: &Map<String, Value>,
    b_obj: &Map<String, Value>,
) -> Option<()> {
    let empty = Map::new();
    let a_dependencies = a_obj
        .get("dependencies")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let b_dependencies = b_obj
        .get("dependencies")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    if a_dependencies.is_empty() && b_dependencies.is_empty() {
        return Some(());
    }

    let mut dependencies = a_dependencies.clone();
    for (key, b_value) in b_dependencies {
        match dependencies.get(key).cloned() {
            None => {
                let _ = dependencies.insert(key.clone(), b_value.clone());
            }
            Some(a_value) => {
                let merged_value = match (&a_value, b_value) {
                    (Value::Array(a_items), Value::Array(b_items)) => {
                        let mut items = a_items.clone();
                        join_and_deduplicate(&mut items, b_items);
                        Value::Array(items)
                    }
                    (Value::Array(required), schema) | (schema, Value::Array(required)) => {
                        let required_schema = as_required_schema(required);
                        merge(&required_schema, schema)?
                    }
                    _ => merge(&a_value, b_value)?,
                };
                let _ = dependencies.insert(key.clone(), merged_value);
            }
        }
    }
    let _ = merged.insert("dependencies".to_string(), Value::Object(dependencies));
    Some(())
}

fn as_required_schema(required: &[Value]) -> Value {
    let mut object = Map::with_capacity(1);
    let _ = object.insert("required".to_string(), Value::Array(required.to_vec()));
    Value::Object(object)
}

/// Scan for contradictions that keyword-by-keyword merging does not catch on its own:
/// every property required by either operand must be permitted by the merged schema.
fn has_structural_conflict(merged: &Map<String, Value>) -> bool {
    let required = match merged.get("required").and_then(Value::as_array) {
        Some(required) => required,
        None => return false,
    };
    let properties = merged.get("properties").and_then(Value::as_object);
    let additional_properties = merged.get("additionalProperties");

    for key in required {
        let key = match key.as_str() {
            Some(key) => key,
            None => continue,
        };
        let property_schema = properties.and_then(|properties| properties.get(key));
        match property_schema {
            Some(schema) => {
                if is::false_schema(schema) {
                    return true;
                }
            }
            None => {
                if additional_properties == Some(&Value::Bool(false)) {
                    return true;
                }
            }
        }
    }

    let schema_types = PrimitiveTypesBitMap::from_schema_value(merged.get("type"));
    if !schema_types.is_empty()
        && !required.is_empty()
        && !schema_types.contains(PrimitiveType::Object)
        && schema_types.has_other_primitive_types_other_than(PrimitiveType::Object)
    {
        // `required` is only meaningful for objects; no conflict to raise here, `type`
        // optimisation elsewhere will have already dropped `required` if `object` was excluded.
    }

    false
}

#[cfg(test)]
mod tests {
    use super::merge;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!(false), &json!({"type": "string"}) => None)]
    #[test_case(&json!({"type": "string"}), &json!(false) => None)]
    #[test_case(&json!(true), &json!({"type": "string"}) => Some(json!({"type": "string"})))]
    #[test_case(&json!({"type": "string"}), &json!(true) => Some(json!({"type": "string"})))]
    #[test_case(&json!({"type": "integer"}), &json!({"type": "number"}) => Some(json!({"type": "integer"})))]
    #[test_case(&json!({"type": "string"}), &json!({"type": "number"}) => None)]
    #[test_case(&json!({"minimum": 1}), &json!({"minimum": 2}) => Some(json!({"minimum": 2})))]
    #[test_case(&json!({"maximum": 2}), &json!({"minimum": 1}) => Some(json!({"maximum": 2, "minimum": 1})))]
    #[test_case(&json!({"maximum": 1}), &json!({"minimum": 2}) => None)]
    #[test_case(&json!({"enum": [1,2,3]}), &json!({"enum": [2,3,4]}) => Some(json!({"enum": [2,3]})))]
    #[test_case(&json!({"enum": [1]}), &json!({"enum": [2]}) => None)]
    #[test_case(&json!({"const": 1}), &json!({"const": 1}) => Some(json!({"const": 1, "type": "integer"})))]
    #[test_case(&json!({"const": 1}), &json!({"const": 2}) => None)]
    #[test_case(&json!({"format": "email"}), &json!({"format": "idn-email"}) => Some(json!({"format": "email"})))]
    #[test_case(&json!({"format": "email"}), &json!({"format": "ipv4"}) => None)]
    #[test_case(
        &json!({"properties": {"n": {"type": "string"}}, "additionalProperties": false}),
        &json!({"properties": {"n": {"type": "string"}, "a": {"type": "integer"}}, "required": ["n", "a"]})
        => None
    )]
    #[test_case(
        &json!({"properties": {"name": {"type": "string"}}}),
        &json!({"properties": {"age": {"type": "integer"}}})
        => Some(json!({"properties": {"name": {"type": "string"}, "age": {"type": "integer"}}}))
    )]
    fn test_merge(a: &Value, b: &Value) -> Option<Value> {
        merge(a, b)
    }

    #[test]
    fn test_merge_is_commutative_for_simple_type_cases() {
        let a = json!({"type": "integer", "minimum": 1});
        let b = json!({"type": "number", "minimum": 2});
        assert_eq!(merge(&a, &b), merge(&b, &a));
    }
}
