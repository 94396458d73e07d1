use serde_json::Value;

/// Checks if the input schema is a `false` schema
#[inline]
pub(crate) fn false_schema(schema: &Value) -> bool {
    match schema {
        Value::Bool(false) => true,
        _ => false,
    }
}

/// Checks if the input schema is a `true` schema
#[inline]
pub(crate) fn true_schema(schema: &Value) -> bool {
    match schema {
        Value::Bool(true) => true,
        Value::Object(obj) if obj.is_empty() => true,
        _ => false,
    }
}
