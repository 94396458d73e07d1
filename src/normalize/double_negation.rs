use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::Value;

/// Collapses `{"not": {"not": X, ...no-other-keys}, rest...}` into `{...X, rest...}`.
///
/// Only fires when the inner `not`'s carrier has no keyword besides `not` itself: a carrier
/// such as `{"not": {"not": X}, "title": "..."}` would change meaning if flattened away, since
/// `title` annotates the inner schema rather than `X`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn collapse_double_negation(schema: &mut Value) -> bool {
    let inner = {
        let schema_object = if let Some(value) = schema.as_object() {
            value
        } else {
            return false;
        };
        if schema_object.len() != 1 {
            return false;
        }
        let outer_not = if let Some(value) = schema_object.get("not") {
            value
        } else {
            return false;
        };
        let outer_not_object = if let Some(value) = outer_not.as_object() {
            value
        } else {
            return false;
        };
        if outer_not_object.len() != 1 {
            return false;
        }
        if let Some(value) = outer_not_object.get("not") {
            value.clone()
        } else {
            return false;
        }
    };
    let _ = std::mem::replace(schema, inner);
    true
}
