//! Condition resolver: evaluates `if`/`then`/`else` (wherever it occurs, nested under `allOf`
//! or at the schema root) against concrete data, folding the taken branch into the schema so
//! downstream subset checks see the resolved shape rather than the raw conditional.
use crate::diff::{check, Diff};
use crate::format::{validate_format, FormatValidation};
use crate::normalize::normalize;
use crate::primitive_type::PrimitiveType;
use crate::helpers::types::PrimitiveTypesBitMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Result of resolving a schema's conditionals against data: the schema with every reachable
/// `if`/`then`/`else` folded away, which branch the top-level conditional took (`None` when
/// the schema carries no top-level `if`), the branch taken at every reachable conditional
/// keyed by its path, and a flat map of the data values that drove each decision.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSchema {
    pub resolved: Value,
    pub branch: Option<String>,
    pub branches: BTreeMap<String, String>,
    pub discriminant: BTreeMap<String, Value>,
}

/// Assertion keywords whose presence on an `if.properties` entry marks that property as a
/// discriminant: the data value observed there is what drove the branch decision.
const DISCRIMINANT_KEYWORDS: &[&str] = &[
    "const",
    "enum",
    "type",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "minItems",
    "maxItems",
];

/// `true` iff `data` satisfies every assertion `cond` makes. Absent data defaults to
/// satisfying a keyword unless `required` explicitly demands its presence.
#[must_use]
pub(crate) fn evaluate_condition(cond: &Value, data: &Value) -> bool {
    match cond {
        Value::Bool(value) => return *value,
        Value::Object(_) => {}
        _ => return true,
    }
    let cond_object = cond.as_object().expect("matched Value::Object above");

    if let Some(Value::Array(required)) = cond_object.get("required") {
        let data_object = data.as_object();
        for key in required {
            let key = match key.as_str() {
                Some(key) => key,
                None => continue,
            };
            if !data_object.map_or(false, |map| map.contains_key(key)) {
                return false;
            }
        }
    }

    if let Some(Value::Object(properties)) = cond_object.get("properties") {
        let data_object = data.as_object();
        for (key, sub_schema) in properties {
            let value = match data_object.and_then(|map| map.get(key)) {
                Some(value) => value,
                None => continue,
            };
            if !assertion_holds(sub_schema, value) {
                return false;
            }
        }
    }

    if let Some(Value::Array(all_of)) = cond_object.get("allOf") {
        if !all_of.iter().all(|sub| evaluate_condition(sub, data)) {
            return false;
        }
    }
    if let Some(Value::Array(any_of)) = cond_object.get("anyOf") {
        if !any_of.iter().any(|sub| evaluate_condition(sub, data)) {
            return false;
        }
    }
    // oneOf's exclusivity is not checked here, same simplification the subset oracle makes.
    if let Some(Value::Array(one_of)) = cond_object.get("oneOf") {
        if !one_of.iter().any(|sub| evaluate_condition(sub, data)) {
            return false;
        }
    }
    if let Some(not_schema) = cond_object.get("not") {
        if evaluate_condition(not_schema, data) {
            return false;
        }
    }
    true
}

/// Checks the assertion keywords a property subschema may carry against the concrete value
/// found at that property. Keywords whose operand type doesn't match `value` are skipped
/// rather than treated as a failure (eg. `minLength` against a number).
fn assertion_holds(sub_schema: &Value, value: &Value) -> bool {
    let sub_object = match sub_schema.as_object() {
        Some(sub_object) => sub_object,
        None => return true,
    };

    if let Some(const_value) = sub_object.get("const") {
        if const_value != value {
            return false;
        }
    }
    if let Some(Value::Array(enum_values)) = sub_object.get("enum") {
        if !enum_values.contains(value) {
            return false;
        }
    }
    if let Some(type_value) = sub_object.get("type") {
        let allowed = PrimitiveTypesBitMap::from_schema_value(Some(type_value));
        let actual = PrimitiveType::from_serde_value(value);
        if !allowed.contains(actual) {
            return false;
        }
    }
    if let (Some(minimum), Some(number)) = (
        sub_object.get("minimum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if number < minimum {
            return false;
        }
    }
    if let (Some(maximum), Some(number)) = (
        sub_object.get("maximum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if number > maximum {
            return false;
        }
    }
    if let (Some(minimum), Some(number)) = (
        sub_object.get("exclusiveMinimum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if number <= minimum {
            return false;
        }
    }
    if let (Some(maximum), Some(number)) = (
        sub_object.get("exclusiveMaximum").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if number >= maximum {
            return false;
        }
    }
    if let (Some(multiple_of), Some(number)) = (
        sub_object.get("multipleOf").and_then(Value::as_f64),
        value.as_f64(),
    ) {
        if multiple_of != 0.0 {
            let quotient = number / multiple_of;
            if (quotient - quotient.round()).abs() > f64::EPSILON {
                return false;
            }
        }
    }
    if let (Some(min_length), Some(string_value)) = (
        sub_object.get("minLength").and_then(Value::as_u64),
        value.as_str(),
    ) {
        if (string_value.chars().count() as u64) < min_length {
            return false;
        }
    }
    if let (Some(max_length), Some(string_value)) = (
        sub_object.get("maxLength").and_then(Value::as_u64),
        value.as_str(),
    ) {
        if (string_value.chars().count() as u64) > max_length {
            return false;
        }
    }
    if let (Some(Value::String(pattern)), Some(string_value)) =
        (sub_object.get("pattern"), value.as_str())
    {
        if let Ok(re) = regex::Regex::new(pattern) {
            if !re.is_match(string_value) {
                return false;
            }
        }
    }
    if let (Some(min_items), Some(Value::Array(items))) =
        (sub_object.get("minItems").and_then(Value::as_u64), Some(value))
    {
        if (items.len() as u64) < min_items {
            return false;
        }
    }
    if let (Some(max_items), Some(Value::Array(items))) =
        (sub_object.get("maxItems").and_then(Value::as_u64), Some(value))
    {
        if (items.len() as u64) > max_items {
            return false;
        }
    }
    if let Some(Value::String(format_name)) = sub_object.get("format") {
        if validate_format(format_name, value) == FormatValidation::Invalid {
            return false;
        }
    }

    // Nested `properties`: recurse only when the value is itself an object; otherwise there
    // is nothing to assert and the check is vacuously satisfied.
    if let Some(Value::Object(nested_properties)) = sub_object.get("properties") {
        if let Some(value_object) = value.as_object() {
            for (key, nested_sub_schema) in nested_properties {
                if let Some(nested_value) = value_object.get(key) {
                    if !assertion_holds(nested_sub_schema, nested_value) {
                        return false;
                    }
                }
            }
        }
    }

    true
}

/// Merge `branch` into `target` with property-oriented override semantics: `required` is a
/// set union, `properties[k]` recurses so the branch's scalars override `target`'s, and every
/// other keyword is copied with scalar-override/container-recurse. This differs from
/// `merge::merge` on purpose: a resolved `then`/`else` branch is meant to *narrow* the base
/// schema the way an author's own override would, not to compute their intersection.
fn override_merge(target: &mut Map<String, Value>, branch: &Value) {
    let branch_object = match branch.as_object() {
        Some(branch_object) => branch_object,
        None => return,
    };
    for (key, branch_value) in branch_object {
        match key.as_str() {
            "required" => {
                let mut merged_required: Vec<Value> = target
                    .get("required")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                if let Value::Array(branch_required) = branch_value {
                    for item in branch_required {
                        if !merged_required.contains(item) {
                            merged_required.push(item.clone());
                        }
                    }
                }
                if !merged_required.is_empty() {
                    let _ = target.insert("required".to_string(), Value::Array(merged_required));
                }
            }
            "properties" => {
                let mut merged_properties = target
                    .get("properties")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                if let Value::Object(branch_properties) = branch_value {
                    for (prop_key, prop_branch_schema) in branch_properties {
                        match merged_properties.get(prop_key).cloned() {
                            Some(Value::Object(mut existing)) => {
                                override_merge(&mut existing, prop_branch_schema);
                                let _ = merged_properties
                                    .insert(prop_key.clone(), Value::Object(existing));
                            }
                            _ => {
                                let _ = merged_properties
                                    .insert(prop_key.clone(), prop_branch_schema.clone());
                            }
                        }
                    }
                }
                let _ = target.insert("properties".to_string(), Value::Object(merged_properties));
            }
            _ => match (target.get(key).cloned(), branch_value) {
                (Some(Value::Object(mut existing)), Value::Object(_)) => {
                    override_merge(&mut existing, branch_value);
                    let _ = target.insert(key.clone(), Value::Object(existing));
                }
                _ => {
                    let _ = target.insert(key.clone(), branch_value.clone());
                }
            },
        }
    }
}

/// Record, for each property in `cond.properties` that asserts one of the discriminant
/// keywords, the actual value found at that property in `data`. `prefix` is the dot-notation
/// path from the schema root to the object `cond` was evaluated against (empty at the root).
fn collect_discriminant_from_condition(
    cond: &Value,
    data: &Value,
    prefix: &str,
    out: &mut BTreeMap<String, Value>,
) {
    let properties = match cond.get("properties").and_then(Value::as_object) {
        Some(properties) => properties,
        None => return,
    };
    let data_object = data.as_object();
    for (key, sub_schema) in properties {
        let sub_object = match sub_schema.as_object() {
            Some(sub_object) => sub_object,
            None => continue,
        };
        if !DISCRIMINANT_KEYWORDS
            .iter()
            .any(|keyword| sub_object.contains_key(*keyword))
        {
            continue;
        }
        if let Some(value) = data_object.and_then(|map| map.get(key)) {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            let _ = out.insert(path, value.clone());
        }
    }
}

/// Resolve every `if`/`then`/`else` reachable from `schema` (at its root, inside its `allOf`
/// entries, and recursively inside its `properties`) against `data`. `path` tracks the
/// `$`-rooted location for `branches`; `prefix` tracks the plain dot-notation location (no `$`,
/// no `.properties.` segments) for `discriminant`.
fn resolve_into(
    schema: &Value,
    data: &Value,
    path: &str,
    prefix: &str,
    branches: &mut BTreeMap<String, String>,
    discriminant: &mut BTreeMap<String, Value>,
) -> Value {
    let mut result = match schema.as_object() {
        Some(schema_object) => schema_object.clone(),
        None => return schema.clone(),
    };

    if let Some(Value::Array(all_of_items)) = result.get("allOf").cloned() {
        let _ = result.remove("allOf");
        let mut residual_all_of = Vec::new();
        for (index, item) in all_of_items.iter().enumerate() {
            let cond = item.as_object().and_then(|item_object| item_object.get("if"));
            let cond = match cond {
                Some(cond) => cond,
                None => {
                    residual_all_of.push(item.clone());
                    continue;
                }
            };
            let condition_holds = evaluate_condition(cond, data);
            branches.insert(
                format!("{}.allOf[{}]", path, index),
                (if condition_holds { "then" } else { "else" }).to_string(),
            );
            collect_discriminant_from_condition(cond, data, prefix, discriminant);
            let branch_schema = item
                .as_object()
                .and_then(|item_object| item_object.get(if condition_holds { "then" } else { "else" }));
            if let Some(branch_schema) = branch_schema {
                override_merge(&mut result, branch_schema);
            }
        }
        if !residual_all_of.is_empty() {
            let _ = result.insert("allOf".to_string(), Value::Array(residual_all_of));
        }
    }

    if let Some(cond) = result.get("if").cloned() {
        let condition_holds = evaluate_condition(&cond, data);
        branches.insert(
            path.to_string(),
            (if condition_holds { "then" } else { "else" }).to_string(),
        );
        collect_discriminant_from_condition(&cond, data, prefix, discriminant);
        let branch_schema = if condition_holds {
            result.get("then").cloned()
        } else {
            result.get("else").cloned()
        };
        let _ = result.remove("if");
        let _ = result.remove("then");
        let _ = result.remove("else");
        if let Some(branch_schema) = branch_schema {
            override_merge(&mut result, &branch_schema);
        }
    }

    if let Some(Value::Object(properties)) = result.get("properties").cloned() {
        let data_object = data.as_object();
        let mut resolved_properties = Map::with_capacity(properties.len());
        for (key, sub_schema) in properties {
            let sub_data = data_object
                .and_then(|map| map.get(&key))
                .cloned()
                .unwrap_or(Value::Null);
            let sub_path = format!("{}.properties.{}", path, key);
            let sub_prefix = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            let resolved_sub =
                resolve_into(&sub_schema, &sub_data, &sub_path, &sub_prefix, branches, discriminant);
            let _ = resolved_properties.insert(key, resolved_sub);
        }
        let _ = result.insert("properties".to_string(), Value::Object(resolved_properties));
    }

    Value::Object(result)
}

/// Resolve every reachable conditional in `schema` against `data`, reporting the branch taken
/// at the top level, the branch taken at every reachable conditional, and the data values that
/// drove each decision.
#[must_use]
pub fn resolve_conditions(schema: &Value, data: &Value) -> ResolvedSchema {
    let normalized = normalize(schema.clone());
    let mut branches = BTreeMap::new();
    let mut discriminant = BTreeMap::new();
    let resolved = resolve_into(&normalized, data, "$", "", &mut branches, &mut discriminant);
    let branch = branches.get("$").cloned();
    ResolvedSchema {
        resolved,
        branch,
        branches,
        discriminant,
    }
}

/// Result of `check_resolved`: the two resolved shapes alongside the ordinary `check` output
/// computed from them.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckResolvedResult {
    pub resolved_sub: Value,
    pub resolved_sup: Value,
    pub is_subset: bool,
    pub merged: Option<Value>,
    pub diffs: Vec<Diff>,
}

/// Resolve both `sub` and `sup`'s conditionals against their respective data (`sup_data`
/// defaults to `sub_data` when absent) and `check` the resolved shapes against each other.
#[must_use]
pub fn check_resolved(
    sub: &Value,
    sup: &Value,
    sub_data: &Value,
    sup_data: Option<&Value>,
) -> CheckResolvedResult {
    let resolved_sub = resolve_conditions(sub, sub_data).resolved;
    let resolved_sup = resolve_conditions(sup, sup_data.unwrap_or(sub_data)).resolved;
    let result = check(&resolved_sub, &resolved_sup);
    CheckResolvedResult {
        resolved_sub,
        resolved_sup,
        is_subset: result.is_subset,
        merged: result.merged,
        diffs: result.diffs,
    }
}
