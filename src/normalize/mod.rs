//! Canonicalization: collapses a schema into its smallest/most informative equivalent form.
//!
//! Children are normalized before the parent's own rules run (descend-then-apply), and the
//! whole traversal repeats until a fixed point is reached
//! (`normalize(normalize(x)) == normalize(x)`).
mod applicators;
mod bounds;
mod const_enum;
mod double_negation;
mod ignore_keywords;
mod items;
mod object;
mod type_keyword;

use crate::constants::{KEYWORDS_WITH_DIRECT_SUBSCHEMAS, KEYWORDS_WITH_SUBSCHEMAS};
use crate::helpers::{is, replace};
use serde_json::Value;

/// Order of the rules applied at each schema level.
///
/// `remove_extraneous_keys_keyword_type` and `remove_keywords_in_must_ignore_groups` run first
/// as they cheaply shrink the amount of keywords left to process. `flatten_all_of`/
/// `simplify_all_of` run last since they fold sibling schemas together and benefit from
/// everything else already being canonical.
static NORMALIZE_METHODS: &[fn(&mut Value) -> bool] = &[
    type_keyword::remove_extraneous_keys_keyword_type,
    ignore_keywords::remove_keywords_in_must_ignore_groups,
    ignore_keywords::omit_keywords_that_do_not_alter_schema_selectivity,
    double_negation::collapse_double_negation,
    const_enum::infer_type_from_const,
    const_enum::infer_type_from_enum,
    const_enum::collapse_single_member_enum,
    const_enum::drop_enum_redundant_with_const,
    const_enum::prune_const_incompatible_with_type,
    const_enum::prune_enum_incompatible_with_type,
    items::simplify_items,
    items::simplify_additional_items,
    object::remove_empty_required,
    object::remove_empty_additional_properties,
    object::optimise_property_names,
    bounds::update_max_min_related_keywords,
    applicators::simplify_if,
    applicators::simplify_any_of,
    applicators::simplify_one_of,
    type_keyword::optimise_keyword_type,
    applicators::flatten_all_of,
    applicators::simplify_all_of,
];

fn normalize_schema_no_recursive(schema: &mut Value) -> bool {
    let mut updated_schema = false;
    for method in NORMALIZE_METHODS {
        if method(schema) {
            updated_schema = true;
        }
        if &Value::Bool(true) == schema || is::false_schema(schema) {
            // Boolean schemas cannot be simplified any further.
            return true;
        }
    }
    updated_schema
}

/// Descend the schema and canonicalize it. Returns `true` if any modification was performed.
fn normalize_schema(schema: &mut Value) -> bool {
    let mut updated_schema = false;
    if is::true_schema(schema) {
        return replace::with_true_schema(schema);
    } else if let Value::Object(schema_object) = schema {
        for (key, subschema) in schema_object.iter_mut() {
            if !KEYWORDS_WITH_SUBSCHEMAS.contains(&key.as_ref()) {
                continue;
            }
            match subschema {
                Value::Object(subschema_object) => {
                    if KEYWORDS_WITH_DIRECT_SUBSCHEMAS.contains(&key.as_ref()) {
                        // The keyword's value MUST itself be a valid JSON Schema,
                        // eg. `{"additionalProperties": {"type": "string"}}`
                        updated_schema |= normalize_schema(subschema);
                    } else {
                        // The keyword's value is a JSON object whose values MUST be valid
                        // JSON Schemas, eg. `{"properties": {"name": {"type": "string"}}}`
                        for subschema_value in subschema_object.values_mut() {
                            updated_schema |= normalize_schema(subschema_value);
                        }
                    }
                }
                Value::Array(subschema_array) => {
                    // The keyword's value is an array of valid JSON Schemas,
                    // eg. `{"allOf": [{"type": "string"}]}`
                    for subschema_value in subschema_array {
                        updated_schema |= normalize_schema(subschema_value);
                    }
                }
                _ => {}
            }
        }
        updated_schema |= normalize_schema_no_recursive(schema);
    }
    updated_schema
}

/// Canonicalize `schema`, recursing into every subschema. Idempotent: normalizing an
/// already-normalized schema returns it unchanged.
pub fn normalize(mut schema: Value) -> Value {
    while normalize_schema(&mut schema) {}
    schema
}
