pub(crate) mod is;
pub(crate) mod replace;
pub(crate) mod types;

use serde_json::Value;

/// Structural deep-equality: primitives compare by value, arrays element-wise, objects
/// key-by-key irrespective of insertion order. This is exactly `serde_json::Value`'s own
/// `PartialEq` (object comparison is already order-independent there), kept as a named
/// function so call sites read as intentional comparisons rather than incidental `==`.
#[inline]
pub(crate) fn deep_equal(a: &Value, b: &Value) -> bool {
    a == b
}

/// Join the list of `Value`s by appending all the items in `other` not present in `schema` at the end of `schema`
///
/// WARNING: Possible duplicates in `schema` are not removed
///
/// NOTE: For every item in other we do run a lineary search in `schema` items. This is generally acceptable if `schema`
/// length is "small" and we can eventualy make this assumption. An alternative would be to convert all the items to
/// something ordinable/hashable (like via `ToString::to_string`) but it would require more memory and still a
/// linear loop for the set creation.
pub(crate) fn join_and_deduplicate(schema: &mut Vec<Value>, other: &[Value]) {
    for other_value in other {
        if !schema
            .iter()
            .any(|schema_value| schema_value == other_value)
        {
            schema.push(other_value.clone());
        }
    }
}

/// Intersect the list of `Value`s with the items present in `other`
///
/// WARNING: Possible duplicates in `schema` are not removed
///
/// NOTE: For every item in other we do run a lineary search in `schema` items. This is generally acceptable if `schema`
/// length is "small" and we can eventualy make this assumption. An alternative would be to convert all the items to
/// something ordinable/hashable (like via `ToString::to_string`) but it would require more memory and still a
/// linear loop for the set creation.
pub(crate) fn common_values_and_deduplicate(schema: &mut Vec<Value>, other: &[Value]) {
    let schema_indexes_to_remove: Vec<usize> = schema
        .iter()
        .enumerate()
        .filter_map(|(index, schema_value)| {
            if other.contains(schema_value) {
                None
            } else {
                Some(index)
            }
        })
        .collect();
    for index_to_remove in schema_indexes_to_remove.iter().rev() {
        let _ = schema.remove(*index_to_remove);
    }
}

#[cfg(test)]
mod tests {
    use super::{common_values_and_deduplicate, deep_equal, join_and_deduplicate};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1}) => true)]
    #[test_case(&json!([1, 2]), &json!([1, 2]) => true)]
    #[test_case(&json!({"a": 1}), &json!({"a": 2}) => false)]
    fn test_deep_equal(a: &Value, b: &Value) -> bool {
        deep_equal(a, b)
    }

    #[test_case(json!([1, 3, 5]), &json!([]) => json!([1, 3, 5]))]
    #[test_case(json!([1, 1, 3, 5]), &json!([]) => json!([1, 1, 3, 5]))]
    #[test_case(json!([1, 3, 5]), &json!([3, 2, 1, 5]) => json!([1, 3, 5, 2]))]
    #[test_case(json!([]), &json!([3, 2, 1, 5]) => json!([3, 2, 1, 5]))]
    fn test_join_and_deduplicate(mut schema: Value, other: &Value) -> Value {
        join_and_deduplicate(
            schema.as_array_mut().expect("It should be there"),
            other.as_array().expect("It should be there"),
        );
        schema
    }

    #[test_case(json!([1, 3, 5]), &json!([]) => json!([]))]
    #[test_case(json!([1, 1, 3, 5]), &json!([]) => json!([]))]
    #[test_case(json!([1, 3, 5]), &json!([3, 2, 1, 5]) => json!([1, 3, 5]))]
    #[test_case(json!([1, 1, 3, 5]), &json!([3, 2, 1, 5]) => json!([1, 1, 3, 5]))]
    #[test_case(json!([]), &json!([3, 2, 1, 5]) => json!([]))]
    fn test_common_values_and_deduplicate(mut schema: Value, other: &Value) -> Value {
        common_values_and_deduplicate(
            schema.as_array_mut().expect("It should be there"),
            other.as_array().expect("It should be there"),
        );
        schema
    }
}
