use crate::helpers::{is, replace, types::get_primitive_types, types::PrimitiveTypesBitMap};
use jsonschema_subset_rule_processor_logger::log_processing;
use serde_json::{Map, Value};

/// Simplify the `if`/`then`/`else` group by embedding the deterministic branch into `allOf`
/// once `if` collapses to a literal `true`/`false`, or dropping the group entirely once neither
/// `then` nor `else` are present.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn simplify_if(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };

    if let Some(if_schema) = schema_object.get("if") {
        if is::false_schema(if_schema) {
            let _ = schema_object.remove("if");
            let _ = schema_object.remove("then");
            if let Some(else_schema) = schema_object.remove("else") {
                push_into_all_of(schema_object, else_schema);
            }
            true
        } else if is::true_schema(if_schema) {
            let _ = schema_object.remove("if");
            let _ = schema_object.remove("else");
            if let Some(then_schema) = schema_object.remove("then") {
                push_into_all_of(schema_object, then_schema);
            }
            true
        } else if !schema_object.contains_key("else") && !schema_object.contains_key("then") {
            let _ = schema_object.remove("if");
            true
        } else {
            false
        }
    } else {
        false
    }
}

fn push_into_all_of(schema_object: &mut Map<String, Value>, branch_schema: Value) {
    if let Value::Array(mut all_of_items) = schema_object
        .remove("allOf")
        .unwrap_or_else(|| Value::Array(Vec::with_capacity(1)))
    {
        all_of_items.push(branch_schema);
        let _ = schema_object.insert("allOf".to_string(), Value::Array(all_of_items));
    }
}

/// Simplify `anyOf`: drop branches that can never validate (`false` schema, or a `type`
/// disjoint from the parent's), then drop the keyword entirely once a branch is unconstrained,
/// or collapse the whole schema to `false` once every branch was dropped.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn simplify_any_of(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };

    let schema_primitive_types = get_primitive_types(schema_object.get("type"));
    if let Some(Value::Array(items)) = schema_object.get_mut("anyOf") {
        let indexes_to_remove: Vec<_> = items
            .iter()
            .enumerate()
            .filter_map(|(index, subschema)| {
                if is::false_schema(subschema) {
                    Some(index)
                } else if schema_primitive_types
                    .intersection(&get_primitive_types(subschema.get("type")))
                    .next()
                    .is_some()
                {
                    None
                } else {
                    Some(index)
                }
            })
            .collect();

        for index_to_remove in indexes_to_remove.iter().rev() {
            let _ = items.remove(*index_to_remove);
        }

        if items.is_empty() {
            if !indexes_to_remove.is_empty() {
                return replace::with_false_schema(schema);
            }
        } else if items.iter().any(is::true_schema) {
            let _ = schema_object.remove("anyOf");
            return true;
        } else {
            return !indexes_to_remove.is_empty();
        }
    }
    false
}

/// Simplify `oneOf`: branches that can never validate (`false` schema) cannot be "the one that
/// matches" and are dropped. If no branch survives the schema is `false`; if exactly one
/// survives, `oneOf`'s "exactly one of" degenerates into "this one", so the branch is folded
/// into `allOf` instead.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn simplify_one_of(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };

    let removed_any = if let Some(Value::Array(items)) = schema_object.get_mut("oneOf") {
        let indexes_to_remove: Vec<_> = items
            .iter()
            .enumerate()
            .filter_map(|(index, subschema)| {
                if is::false_schema(subschema) {
                    Some(index)
                } else {
                    None
                }
            })
            .collect();
        for index_to_remove in indexes_to_remove.iter().rev() {
            let _ = items.remove(*index_to_remove);
        }
        !indexes_to_remove.is_empty()
    } else {
        return false;
    };

    match schema_object.get_mut("oneOf") {
        Some(Value::Array(items)) if items.is_empty() => {
            if removed_any {
                replace::with_false_schema(schema)
            } else {
                false
            }
        }
        Some(Value::Array(items)) if items.len() == 1 => {
            let only_branch = items.remove(0);
            let _ = schema_object.remove("oneOf");
            push_into_all_of(schema_object, only_branch);
            true
        }
        _ => removed_any,
    }
}

/// `false` iff `subschema` does NOT carry an `if`/`then`/`else` conditional group. Operands with
/// a conditional cannot be safely folded into the parent via `merge`, as the conditional's
/// branch selection depends on data not known while only normalizing schemas.
fn contains_conditional(subschema: &Value) -> bool {
    subschema.get("if").is_some()
}

/// Simplify `allOf` by removing members equivalent to `true`, collapsing to `false` if any
/// member is `false` or if member `type`s share no common primitive type, and otherwise
/// narrowing every member's `type` to the intersection (enabling later keyword-level folding).
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn simplify_all_of(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let schema_primitive_types = PrimitiveTypesBitMap::from_schema_value(schema_object.get("type"));
    if let Some(Value::Array(items)) = schema_object.get_mut("allOf") {
        let mut updated_schema = false;

        let indexes_to_remove: Vec<_> = items
            .iter()
            .enumerate()
            .filter_map(|(index, subschema)| {
                if is::true_schema(subschema) {
                    Some(index)
                } else {
                    None
                }
            })
            .collect();

        for index_to_remove in indexes_to_remove.iter().rev() {
            let _ = items.remove(*index_to_remove);
        }

        if items.is_empty() {
            if !indexes_to_remove.is_empty() {
                let _ = schema_object.remove("allOf");
                return true;
            }
        } else if items.iter().any(is::false_schema) {
            return replace::with_false_schema(schema);
        } else {
            let all_of_primitive_types: Vec<_> = items
                .iter()
                .map(|all_of_schema| {
                    PrimitiveTypesBitMap::from_schema_value(all_of_schema.get("type"))
                })
                .collect();

            let mut defined_types_in_all_of = false;
            let mut common_all_of_primitive_types = schema_primitive_types;

            for primitive_types in &all_of_primitive_types {
                common_all_of_primitive_types = common_all_of_primitive_types & *primitive_types;

                if common_all_of_primitive_types.is_empty() {
                    return replace::with_false_schema(schema);
                }

                if !primitive_types.is_empty() {
                    defined_types_in_all_of = true;
                }
            }

            if !defined_types_in_all_of {
                // No member constrains `type`, so there's nothing to narrow.
            } else if common_all_of_primitive_types.is_empty() {
                return replace::with_false_schema(schema);
            } else {
                for (all_of_item, all_of_primitive_types) in
                    items.iter_mut().zip(all_of_primitive_types)
                {
                    if all_of_primitive_types != common_all_of_primitive_types {
                        if let Value::Object(all_of_item_schema) = all_of_item {
                            updated_schema |= replace::type_with(
                                all_of_item_schema,
                                common_all_of_primitive_types,
                            )
                        }
                    }
                }
            }
        }
        updated_schema
    } else {
        false
    }
}

/// Fold every `allOf` member that carries no conditional into the parent schema via `merge`,
/// leaving conditional members inside a residual `allOf`.
#[log_processing(cfg(feature = "logging"))]
pub(crate) fn flatten_all_of(schema: &mut Value) -> bool {
    let schema_object = if let Some(value) = schema.as_object_mut() {
        value
    } else {
        return false;
    };
    let all_of_items = match schema_object.get("allOf") {
        Some(Value::Array(items)) => items.clone(),
        _ => return false,
    };
    if all_of_items.is_empty() {
        return false;
    }

    let mut base = Value::Object(schema_object.clone());
    if let Value::Object(base_object) = &mut base {
        let _ = base_object.remove("allOf");
    }

    let mut residual = Vec::new();
    let mut merged_any = false;
    for item in all_of_items {
        if contains_conditional(&item) {
            residual.push(item);
            continue;
        }
        match crate::merge::merge(&base, &item) {
            Some(merged) => {
                base = merged;
                merged_any = true;
            }
            None => return replace::with_false_schema(schema),
        }
    }

    if !merged_any {
        return false;
    }

    if is::false_schema(&base) {
        return replace::with_false_schema(schema);
    }
    if is::true_schema(&base) {
        base = Value::Object(Map::new());
    }
    if let Value::Object(base_object) = &mut base {
        if residual.is_empty() {
            let _ = base_object.remove("allOf");
        } else {
            let _ = base_object.insert("allOf".to_string(), Value::Array(residual));
        }
    }
    let _ = std::mem::replace(schema, base);
    true
}

#[cfg(test)]
mod tests {
    use super::{flatten_all_of, simplify_all_of, simplify_any_of, simplify_if, simplify_one_of};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({}) => json!({}))]
    #[test_case(&json!({"if": false, "then": {"minLength": 0}, "else": {"maxLength": 0}}) => json!({"allOf": [{"maxLength": 0}]}))]
    #[test_case(&json!({"if": true, "then": {"minLength": 0}, "else": {"maxLength": 0}}) => json!({"allOf": [{"minLength": 0}]}))]
    #[test_case(&json!({"if": {"type": "string"}, "then": {"minLength": 0}, "else": {"maxLength": 0}}) => json!({"if": {"type": "string"}, "then": {"minLength": 0}, "else": {"maxLength": 0}}))]
    #[test_case(&json!({"if": {"type": "string"}}) => json!({}))]
    fn test_simplify_if(schema: &Value) -> Value {
        let mut schema = schema.clone();
        let _ = simplify_if(&mut schema);
        schema
    }

    #[test_case(json!({"anyOf": [{"type": "string"}]}) => json!({"anyOf": [{"type": "string"}]}))]
    #[test_case(json!({"type": "object", "anyOf": [{}]}) => json!({"type": "object"}))]
    #[test_case(json!({"anyOf": [true]}) => json!({}))]
    #[test_case(json!({"anyOf": [false]}) => json!(false))]
    #[test_case(json!({"anyOf": [{"type": "boolean"}, {"type": "number"}], "type": "number"}) => json!({"anyOf": [{"type": "number"}], "type": "number"}))]
    fn test_simplify_any_of(mut schema: Value) -> Value {
        let _ = simplify_any_of(&mut schema);
        schema
    }

    #[test_case(json!({"oneOf": [{"type": "string"}, {"type": "number"}]}) => json!({"oneOf": [{"type": "string"}, {"type": "number"}]}))]
    #[test_case(json!({"oneOf": [false, {"type": "string"}]}) => json!({"allOf": [{"type": "string"}]}))]
    #[test_case(json!({"oneOf": [false, false]}) => json!(false))]
    fn test_simplify_one_of(mut schema: Value) -> Value {
        let _ = simplify_one_of(&mut schema);
        schema
    }

    #[test_case(json!({"allOf": [{"type": "string"}]}) => json!({"allOf": [{"type": "string"}]}))]
    #[test_case(json!({"type": "object", "allOf": [{}]}) => json!({"type": "object"}))]
    #[test_case(json!({"allOf": [false]}) => json!(false))]
    #[test_case(json!({"allOf": [{"type": "integer"}, {"type": "number"}]}) => json!({"allOf": [{"type": "integer"}, {"type": "integer"}]}))]
    #[test_case(json!({"allOf": [{"type": "string"}, {"type": "number"}]}) => json!(false))]
    fn test_simplify_all_of(mut schema: Value) -> Value {
        let _ = simplify_all_of(&mut schema);
        schema
    }

    #[test_case(json!({"allOf": [{"type": "string"}]}) => json!({"type": "string"}))]
    #[test_case(json!({"allOf": [{"type": "string"}, {"minLength": 1}]}) => json!({"type": "string", "minLength": 1}))]
    #[test_case(json!({"allOf": [{"if": {"type": "string"}, "then": {"minLength": 1}}]}) => json!({"allOf": [{"if": {"type": "string"}, "then": {"minLength": 1}}]}))]
    fn test_flatten_all_of(mut schema: Value) -> Value {
        let _ = flatten_all_of(&mut schema);
        schema
    }
}
