//! Structural diff between a schema and what it becomes once merged with another: reports,
//! keyword-by-keyword and subschema-by-subschema, what the merge added, removed, or changed.
use crate::merge::merge;
use crate::normalize::normalize;
use crate::subset::is_subset;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// The nature of a single divergence between a schema and its merge with another.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
}

/// A single keyword- or subschema-level divergence, anchored at a dot/bracket path.
#[derive(Clone, Debug, PartialEq)]
pub struct Diff {
    pub kind: DiffKind,
    pub path: String,
    pub expected: Value,
    pub actual: Value,
}

/// Result of comparing two schemas: whether one is a subset of the other, their merge (`None`
/// when incompatible), and the diffs explaining why/where they differ.
#[derive(Clone, Debug, PartialEq)]
pub struct SubsetResult {
    pub is_subset: bool,
    pub merged: Option<Value>,
    pub diffs: Vec<Diff>,
}

/// Result of `can_connect`: `check` re-labeled for a producer/consumer connectivity question.
#[derive(Clone, Debug, PartialEq)]
pub struct CanConnectResult {
    pub is_subset: bool,
    pub direction: String,
    pub diffs: Vec<Diff>,
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Diff two already-normalized keyword maps (`a` is the baseline, `merged` is `a` merged with
/// some other schema); recurses into the subschema-bearing keywords so the path of a nested
/// divergence reads like `properties.name.minLength` rather than collapsing to `properties`.
fn diff_schema_objects(
    path: &str,
    a: &Map<String, Value>,
    merged: &Map<String, Value>,
    diffs: &mut Vec<Diff>,
) {
    let keys: BTreeSet<&String> = a.keys().chain(merged.keys()).collect();
    for key in keys {
        let a_value = a.get(key);
        let merged_value = merged.get(key);
        match (a_value, merged_value) {
            (None, Some(merged_value)) => diffs.push(Diff {
                kind: DiffKind::Added,
                path: join_path(path, key),
                expected: Value::Null,
                actual: merged_value.clone(),
            }),
            (Some(a_value), None) => diffs.push(Diff {
                kind: DiffKind::Removed,
                path: join_path(path, key),
                expected: a_value.clone(),
                actual: Value::Null,
            }),
            (Some(a_value), Some(merged_value)) if a_value == merged_value => {}
            (Some(a_value), Some(merged_value)) => {
                let key_path = join_path(path, key);
                match key.as_str() {
                    "properties" | "patternProperties" | "definitions" => {
                        diff_keyed_subschemas(&key_path, a_value, merged_value, diffs);
                    }
                    "items" => diff_items(&key_path, a_value, merged_value, diffs),
                    "anyOf" | "oneOf" => {
                        diff_indexed_subschemas(&key_path, a_value, merged_value, diffs);
                    }
                    _ => diffs.push(Diff {
                        kind: DiffKind::Changed,
                        path: key_path,
                        expected: a_value.clone(),
                        actual: merged_value.clone(),
                    }),
                }
            }
            (None, None) => {}
        }
    }
}

/// Diffs `properties`/`patternProperties`/`definitions`-shaped maps of subschemas.
fn diff_keyed_subschemas(path: &str, a_value: &Value, merged_value: &Value, diffs: &mut Vec<Diff>) {
    let (a_map, merged_map) = match (a_value.as_object(), merged_value.as_object()) {
        (Some(a_map), Some(merged_map)) => (a_map, merged_map),
        _ => {
            diffs.push(Diff {
                kind: DiffKind::Changed,
                path: path.to_string(),
                expected: a_value.clone(),
                actual: merged_value.clone(),
            });
            return;
        }
    };
    let keys: BTreeSet<&String> = a_map.keys().chain(merged_map.keys()).collect();
    for key in keys {
        let key_path = join_path(path, key);
        match (a_map.get(key), merged_map.get(key)) {
            (None, Some(merged_sub)) => diffs.push(Diff {
                kind: DiffKind::Added,
                path: key_path,
                expected: Value::Null,
                actual: merged_sub.clone(),
            }),
            (Some(a_sub), None) => diffs.push(Diff {
                kind: DiffKind::Removed,
                path: key_path,
                expected: a_sub.clone(),
                actual: Value::Null,
            }),
            (Some(a_sub), Some(merged_sub)) if a_sub == merged_sub => {}
            (Some(a_sub), Some(merged_sub)) => {
                match (a_sub.as_object(), merged_sub.as_object()) {
                    (Some(a_sub_obj), Some(merged_sub_obj)) => {
                        diff_schema_objects(&key_path, a_sub_obj, merged_sub_obj, diffs);
                    }
                    _ => diffs.push(Diff {
                        kind: DiffKind::Changed,
                        path: key_path,
                        expected: a_sub.clone(),
                        actual: merged_sub.clone(),
                    }),
                }
            }
            (None, None) => {}
        }
    }
}

/// Diffs the `items` keyword: a tuple (array of subschemas) diffs position by position with
/// `items[i]` paths; a single schema recurses without appending an index.
fn diff_items(path: &str, a_value: &Value, merged_value: &Value, diffs: &mut Vec<Diff>) {
    match (a_value, merged_value) {
        (Value::Array(_), Value::Array(_)) => {
            diff_indexed_subschemas(path, a_value, merged_value, diffs);
        }
        (Value::Object(a_obj), Value::Object(merged_obj)) => {
            diff_schema_objects(path, a_obj, merged_obj, diffs);
        }
        _ => diffs.push(Diff {
            kind: DiffKind::Changed,
            path: path.to_string(),
            expected: a_value.clone(),
            actual: merged_value.clone(),
        }),
    }
}

/// Diffs `anyOf`/`oneOf`/tuple-`items`-shaped arrays of subschemas, one `<path>[i]` per entry.
fn diff_indexed_subschemas(path: &str, a_value: &Value, merged_value: &Value, diffs: &mut Vec<Diff>) {
    let (a_items, merged_items) = match (a_value.as_array(), merged_value.as_array()) {
        (Some(a_items), Some(merged_items)) => (a_items, merged_items),
        _ => {
            diffs.push(Diff {
                kind: DiffKind::Changed,
                path: path.to_string(),
                expected: a_value.clone(),
                actual: merged_value.clone(),
            });
            return;
        }
    };
    let max_len = a_items.len().max(merged_items.len());
    for index in 0..max_len {
        let item_path = format!("{}[{}]", path, index);
        match (a_items.get(index), merged_items.get(index)) {
            (None, Some(merged_item)) => diffs.push(Diff {
                kind: DiffKind::Added,
                path: item_path,
                expected: Value::Null,
                actual: merged_item.clone(),
            }),
            (Some(a_item), None) => diffs.push(Diff {
                kind: DiffKind::Removed,
                path: item_path,
                expected: a_item.clone(),
                actual: Value::Null,
            }),
            (Some(a_item), Some(merged_item)) if a_item == merged_item => {}
            (Some(a_item), Some(merged_item)) => {
                match (a_item.as_object(), merged_item.as_object()) {
                    (Some(a_obj), Some(merged_obj)) => {
                        diff_schema_objects(&item_path, a_obj, merged_obj, diffs);
                    }
                    _ => diffs.push(Diff {
                        kind: DiffKind::Changed,
                        path: item_path,
                        expected: a_item.clone(),
                        actual: merged_item.clone(),
                    }),
                }
            }
            (None, None) => {}
        }
    }
}

/// Compare `a` and `b`: normalize both, merge them, and report everything the merge added,
/// removed, or changed relative to `a` alone.
#[must_use]
pub fn check(a: &Value, b: &Value) -> SubsetResult {
    let norm_a = normalize(a.clone());
    let norm_b = normalize(b.clone());
    let is_subset_value = is_subset(a, b);

    match merge(&norm_a, &norm_b) {
        None => SubsetResult {
            is_subset: false,
            merged: None,
            diffs: vec![Diff {
                kind: DiffKind::Changed,
                path: "$".to_string(),
                expected: norm_a,
                actual: Value::String(
                    "Incompatible: no instance can satisfy both schemas".to_string(),
                ),
            }],
        },
        Some(merged_raw) => {
            let merged = normalize(merged_raw);
            let mut diffs = Vec::new();
            match (norm_a.as_object(), merged.as_object()) {
                (Some(a_obj), Some(merged_obj)) => {
                    diff_schema_objects("", a_obj, merged_obj, &mut diffs);
                }
                _ if norm_a != merged => diffs.push(Diff {
                    kind: DiffKind::Changed,
                    path: "$".to_string(),
                    expected: norm_a.clone(),
                    actual: merged.clone(),
                }),
                _ => {}
            }
            SubsetResult {
                is_subset: is_subset_value,
                merged: Some(merged),
                diffs,
            }
        }
    }
}

/// `check(output_schema, input_schema)`, re-labeled for a producer/consumer connectivity
/// question: can a value shaped by `output_schema` always be accepted by `input_schema`?
#[must_use]
pub fn can_connect(output_schema: &Value, input_schema: &Value) -> CanConnectResult {
    let result = check(output_schema, input_schema);
    CanConnectResult {
        is_subset: result.is_subset,
        direction: "sourceOutput ⊆ targetInput".to_string(),
        diffs: result.diffs,
    }
}

#[cfg(test)]
mod tests {
    use super::{check, DiffKind};
    use serde_json::json;

    #[test]
    fn test_check_compatible_subset_has_no_diffs() {
        let a = json!({
            "type": "object",
            "properties": {"name": {"type": "string", "minLength": 5}},
            "required": ["name"],
        });
        let b = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"],
        });
        let result = check(&a, &b);
        assert!(result.is_subset);
        assert!(result.diffs.is_empty());
    }

    #[test]
    fn test_check_type_conflict_emits_incompatible_sentinel() {
        let result = check(&json!({"type": "string"}), &json!({"type": "number"}));
        assert!(!result.is_subset);
        assert_eq!(result.merged, None);
        assert_eq!(result.diffs.len(), 1);
        assert_eq!(result.diffs[0].path, "$");
        assert_eq!(result.diffs[0].kind, DiffKind::Changed);
        assert!(result.diffs[0]
            .actual
            .as_str()
            .expect("actual is a string")
            .contains("Incompatible"));
    }

    #[test]
    fn test_check_missing_required_reports_changed_and_added() {
        let a = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"],
        });
        let b = json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "number"}},
            "required": ["name", "age"],
        });
        let result = check(&a, &b);
        assert!(!result.is_subset);
        assert!(result
            .diffs
            .iter()
            .any(|diff| diff.path == "required" && diff.kind == DiffKind::Changed));
        assert!(result
            .diffs
            .iter()
            .any(|diff| diff.path == "properties.age" && diff.kind == DiffKind::Added));
    }
}
