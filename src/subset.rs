//! Structural subset/equivalence oracle: `A ⊆ B` iff every instance valid against `A` is also
//! valid against `B`.
use crate::helpers::deep_equal;
use crate::merge::merge;
use crate::normalize::normalize;
use serde_json::Value;

/// Pulls the `anyOf`/`oneOf` branches out of `schema`, together with the rest of the schema
/// (the keyword map with the disjunction keyword removed). `oneOf`'s "exactly one" exclusivity
/// is not modeled here: both keywords are treated as "at least one branch accepted", a
/// documented, non-bug simplification.
fn outer_disjunction(schema: &Value) -> Option<(Vec<Value>, Value)> {
    let schema_object = schema.as_object()?;
    for disjunction_keyword in &["anyOf", "oneOf"] {
        if let Some(Value::Array(branches)) = schema_object.get(*disjunction_keyword) {
            let mut rest = schema_object.clone();
            let _ = rest.remove(*disjunction_keyword);
            return Some((branches.clone(), Value::Object(rest)));
        }
    }
    None
}

/// Combine a disjunction branch with the sibling keywords of the schema it came from. A branch
/// that contradicts those siblings can never be selected by any instance, so it is dropped
/// rather than reported as a (vacuous) subset failure.
fn branch_with_siblings(branch: &Value, rest: &Value) -> Option<Value> {
    merge(rest, branch).map(normalize)
}

fn is_subset_normalized(norm_a: &Value, norm_b: &Value) -> bool {
    if deep_equal(norm_a, norm_b) {
        return true;
    }
    if let Some((branches, rest)) = outer_disjunction(norm_a) {
        return branches
            .iter()
            .filter_map(|branch| branch_with_siblings(branch, &rest))
            .all(|branch_schema| is_subset_normalized(&branch_schema, norm_b));
    }
    if let Some((branches, rest)) = outer_disjunction(norm_b) {
        return branches
            .iter()
            .filter_map(|branch| branch_with_siblings(branch, &rest))
            .any(|branch_schema| is_subset_normalized(norm_a, &branch_schema));
    }
    match merge(norm_a, norm_b) {
        None => false,
        Some(merged) => deep_equal(&normalize(merged), norm_a),
    }
}

/// Decide `a ⊆ b`: every instance accepted by `a` is accepted by `b`.
#[must_use]
pub fn is_subset(a: &Value, b: &Value) -> bool {
    if deep_equal(a, b) {
        // Load-bearing, not a cosmetic optimisation: without this, a schema carrying
        // `if`/`then`/`else` can fail `a ⊆ a`, since merging it with itself pushes the
        // conditional into a residual `allOf` and the two normalized forms stop matching.
        return true;
    }
    let norm_a = normalize(a.clone());
    let norm_b = normalize(b.clone());
    is_subset_normalized(&norm_a, &norm_b)
}

/// Decide `a ≡ b`: both accept exactly the same set of instances.
#[must_use]
pub fn is_equal(a: &Value, b: &Value) -> bool {
    deep_equal(&normalize(a.clone()), &normalize(b.clone()))
}

#[cfg(test)]
mod tests {
    use super::{is_equal, is_subset};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"type": "string"}), &json!({"type": "string"}) => true)]
    #[test_case(&json!(false), &json!({"type": "string"}) => true)]
    #[test_case(&json!({"type": "string"}), &json!(true) => true)]
    #[test_case(&json!(true), &json!(false) => false)]
    #[test_case(
        &json!({"type": "string", "minLength": 5}),
        &json!({"type": "string"})
        => true
    )]
    #[test_case(
        &json!({"type": "string"}),
        &json!({"type": "string", "minLength": 5})
        => false
    )]
    #[test_case(&json!({"type": "string"}), &json!({"type": "number"}) => false)]
    #[test_case(
        &json!({"type": "object", "properties": {"name": {"type": "string", "minLength": 5}}, "required": ["name"]}),
        &json!({"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]})
        => true
    )]
    #[test_case(
        &json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}),
        &json!({"type": ["string", "integer"]})
        => true
    )]
    fn test_is_subset(a: &Value, b: &Value) -> bool {
        is_subset(a, b)
    }

    #[test_case(&json!({"type": "string"}), &json!({"type": "string"}) => true)]
    #[test_case(&json!({"enum": ["a"]}), &json!({"const": "a", "type": "string"}) => true)]
    #[test_case(&json!({"type": "string"}), &json!({"type": "number"}) => false)]
    fn test_is_equal(a: &Value, b: &Value) -> bool {
        is_equal(a, b)
    }

    #[test]
    fn test_is_subset_reflexive_with_conditional() {
        let schema = json!({
            "if": {"properties": {"kind": {"const": "a"}}},
            "then": {"required": ["a_field"]},
        });
        assert!(is_subset(&schema, &schema));
    }
}
