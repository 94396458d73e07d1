//! # jsonschema-subset
//!
//! Structural subset, equivalence, intersection, diff and condition-resolution engine for
//! JSON Schema (Draft 7) documents, built on top of a canonicalising normaliser.
//!
//! The normaliser flattens the input schema and removes keywords that provide no restriction.
//! On top of that foundation this crate answers structural questions schema authors actually
//! need answered: is `A` a subset of `B`? What would change if `A` were merged with `B`? Given
//! a concrete document, which branch of an `if`/`then`/`else` does a schema resolve to?
//!
//! ## How to use
//! ```toml
//! # Cargo.toml
//! jsonschema-subset = "0"
//! ```
//!
//! ```rust
//! use jsonschema_subset::is_subset;
//! use serde_json::json;
//!
//! let narrower = json!({"type": "string", "minLength": 5});
//! let wider = json!({"type": "string"});
//! assert!(is_subset(&narrower, &wider));
//! assert!(!is_subset(&wider, &narrower));
//! ```
#![warn(
    clippy::pedantic,
    clippy::doc_markdown,
    clippy::redundant_closure,
    clippy::explicit_iter_loop,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::print_stdout,
    clippy::integer_arithmetic,
    clippy::cast_possible_truncation,
    clippy::result_unwrap_used,
    clippy::result_map_unwrap_or_else,
    clippy::option_unwrap_used,
    clippy::option_map_unwrap_or_else,
    clippy::option_map_unwrap_or,
    clippy::trivially_copy_pass_by_ref,
    clippy::needless_pass_by_value,
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    variant_size_differences
)]

mod constants;
mod diff;
mod error;
mod format;
mod helpers;
mod macros;
mod merge;
mod normalize;
mod pattern;
mod primitive_type;
mod resolve;
mod subset;

use serde_json::Value;

pub use diff::{CanConnectResult, Diff, DiffKind, SubsetResult};
pub use resolve::{CheckResolvedResult, ResolvedSchema};

/// Canonicalize `schema` into its smallest/most informative equivalent form, recursing into
/// every subschema. Idempotent: `normalize(normalize(x)) == normalize(x)`.
#[must_use]
#[inline]
pub fn normalize(schema: Value) -> Value {
    normalize::normalize(schema)
}

/// `true` iff every instance accepted by `a` is also accepted by `b`.
#[must_use]
#[inline]
pub fn is_subset(a: &Value, b: &Value) -> bool {
    subset::is_subset(a, b)
}

/// `true` iff `a` and `b` accept exactly the same set of instances.
#[must_use]
#[inline]
pub fn is_equal(a: &Value, b: &Value) -> bool {
    subset::is_equal(a, b)
}

/// Compute `a ∩ b`: the schema whose accepted set is the intersection of its operands'. An
/// empty intersection (the operands are structurally incompatible) is reported as the `false`
/// schema, matching how an impossible-to-satisfy schema is otherwise represented throughout
/// this crate.
#[must_use]
#[inline]
pub fn intersect(a: &Value, b: &Value) -> Value {
    merge::merge(a, b).unwrap_or(Value::Bool(false))
}

/// Compare `a` and `b`: whether `a ⊆ b`, their merge, and what the merge added, removed, or
/// changed relative to `a` alone.
#[must_use]
#[inline]
pub fn check(a: &Value, b: &Value) -> SubsetResult {
    diff::check(a, b)
}

/// `check(output_schema, input_schema)`, re-labeled for a producer/consumer connectivity
/// question: can every value shaped by `output_schema` be accepted by `input_schema`?
#[must_use]
#[inline]
pub fn can_connect(output_schema: &Value, input_schema: &Value) -> CanConnectResult {
    diff::can_connect(output_schema, input_schema)
}

/// Resolve every `if`/`then`/`else` reachable from `schema` against `data`, reporting the
/// branches taken and the discriminating assertions left over in the resolved shape.
#[must_use]
#[inline]
pub fn resolve_conditions(schema: &Value, data: &Value) -> ResolvedSchema {
    resolve::resolve_conditions(schema, data)
}

/// Resolve both `sub` and `sup`'s conditionals against their respective data (`sup_data`
/// defaults to `sub_data` when absent) and `check` the resolved shapes against each other.
#[must_use]
#[inline]
pub fn check_resolved(
    sub: &Value,
    sup: &Value,
    sub_data: &Value,
    sup_data: Option<&Value>,
) -> CheckResolvedResult {
    resolve::check_resolved(sub, sup, sub_data, sup_data)
}

/// Render `diffs` as a human-readable report: one line per diff, `+ path: value` for
/// additions, `- path: was value` for removals, `~ path: expected → actual` for changes.
#[must_use]
pub fn format_result(diffs: &[Diff]) -> String {
    diffs
        .iter()
        .map(|diff| match diff.kind {
            DiffKind::Added => format!("+ {}: {}", diff.path, diff.actual),
            DiffKind::Removed => format!("- {}: was {}", diff.path, diff.expected),
            DiffKind::Changed => format!("~ {}: {} → {}", diff.path, diff.expected, diff.actual),
        })
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{
        can_connect, check, check_resolved, format_result, intersect, is_equal, is_subset,
        normalize, resolve_conditions,
    };
    use serde_json::json;

    #[test]
    fn test_normalize_flattens_redundant_type_constraint() {
        assert_eq!(
            normalize(json!({"type": "string", "minimum": 1})),
            json!({"type": "string"})
        );
    }

    #[test]
    fn test_is_subset_and_is_equal() {
        assert!(is_subset(
            &json!({"type": "string", "minLength": 5}),
            &json!({"type": "string"})
        ));
        assert!(is_equal(
            &json!({"enum": ["a"]}),
            &json!({"const": "a", "type": "string"})
        ));
    }

    #[test]
    fn test_intersect_incompatible_is_false_schema() {
        assert_eq!(
            intersect(&json!({"type": "string"}), &json!({"type": "number"})),
            json!(false)
        );
    }

    #[test]
    fn test_check_and_can_connect() {
        let a = json!({"type": "string", "minLength": 5});
        let b = json!({"type": "string"});
        assert!(check(&a, &b).is_subset);
        assert!(can_connect(&a, &b).is_subset);
        assert_eq!(can_connect(&a, &b).direction, "sourceOutput ⊆ targetInput");
    }

    #[test]
    fn test_resolve_conditions_and_check_resolved() {
        let schema = json!({
            "if": {"properties": {"kind": {"const": "a"}}},
            "then": {"required": ["a_field"]},
        });
        let resolved = resolve_conditions(&schema, &json!({"kind": "a"}));
        assert_eq!(resolved.resolved, json!({"required": ["a_field"]}));

        let result = check_resolved(
            &schema,
            &json!({"properties": {"a_field": {"type": "string"}}}),
            &json!({"kind": "a", "a_field": "x"}),
            None,
        );
        assert!(!result.is_subset);
    }

    #[test]
    fn test_format_result() {
        let result = check(
            &json!({"type": "string"}),
            &json!({"type": "string", "minLength": 3}),
        );
        let rendered = format_result(&result.diffs);
        assert!(rendered.contains("minLength"));
    }
}
