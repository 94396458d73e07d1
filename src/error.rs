use serde_json::Value;
use thiserror::Error;

/// Surfaces a schema shape the engine assumed but did not find, eg. `properties` holding
/// something other than a JSON object. These are programmer errors (a malformed schema was fed
/// in where the engine's own invariants assume well-formedness already checked elsewhere) and
/// are always surfaced as panics at the boundary where the shape is assumed -- never threaded
/// through a `Result` -- matching the `.expect(...)` idiom used throughout this crate, just with
/// a named error backing the panic message instead of an ad hoc string literal.
#[derive(Debug, Error)]
pub(crate) enum SchemaShapeError {
    /// A keyword whose value MUST be a JSON object (per the Draft 7 meta-schema) was not one.
    #[error("expected `{keyword}` to hold a JSON object, found {actual}")]
    NotAnObject {
        keyword: &'static str,
        actual: &'static str,
    },
}

impl SchemaShapeError {
    pub(crate) fn not_an_object(keyword: &'static str, value: &Value) -> Self {
        Self::NotAnObject {
            keyword,
            actual: value_kind(value),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
