use crate::primitive_type::PrimitiveType;
use serde_json::Value;
use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Extract a set of primitive types contained by the input `type` keyword. (`maybe_type` should be the result of `schema.get("type")`)
///
/// NOTE: A `BTreeSet` is returned in order to preserve order-predictability while testing
pub(crate) fn get_primitive_types(maybe_type: Option<&Value>) -> BTreeSet<PrimitiveType> {
    if let Some(type_) = maybe_type {
        let mut set = BTreeSet::default();
        match type_ {
            Value::String(type_s) => {
                if let Ok(pt) = PrimitiveType::try_from(type_s.as_str()) {
                    let _ = set.insert(pt);
                    if pt == PrimitiveType::Number {
                        // "integer" is a subtype of "number"
                        // so if number is present then also integer is an included type
                        // NOTE: `to_json_schema_primitive_types` takes care of removing
                        // the redundancy if present
                        let _ = set.insert(PrimitiveType::Integer);
                    }
                }
            }
            Value::Array(types_) => {
                for type_s in types_ {
                    if let Ok(pt) = PrimitiveType::try_from(type_s) {
                        let _ = set.insert(pt);
                    }
                }
            }
            _ => {}
        }
        set
    } else {
        let mut set = BTreeSet::new();
        let _ = set.insert(PrimitiveType::Array);
        let _ = set.insert(PrimitiveType::Boolean);
        let _ = set.insert(PrimitiveType::Integer);
        let _ = set.insert(PrimitiveType::Null);
        let _ = set.insert(PrimitiveType::Number);
        let _ = set.insert(PrimitiveType::Object);
        let _ = set.insert(PrimitiveType::String);
        set
    }
}

/// Provide the most-efficient JSON representation of the input `primitive_types`.
///
/// The process includes removing `integer` if `number` is in or not having a representation if all the possible types are included
pub(crate) fn to_json_schema_primitive_types(
    primitive_types: &BTreeSet<PrimitiveType>,
) -> Option<Value> {
    match primitive_types.len() {
        0 => None,
        1 => Some(Value::String(
            primitive_types
                .iter()
                .next()
                .expect("Not empty iterator, so there is at least one element")
                .to_string(),
        )),
        6 if !primitive_types.contains(&PrimitiveType::Integer) => None,
        7 => None,
        _ => {
            let contains_number = primitive_types.contains(&PrimitiveType::Number);
            let json_primitive_types: Vec<_> = primitive_types
                .iter()
                .filter_map(|primitive_type| {
                    if contains_number && primitive_type == &PrimitiveType::Integer {
                        None
                    } else {
                        Some(Value::String(primitive_type.to_string()))
                    }
                })
                .collect();
            if json_primitive_types.len() == 1 {
                Some(json_primitive_types[0].clone())
            } else {
                Some(Value::Array(json_primitive_types))
            }
        }
    }
}

/// Bitset representation of a (possibly empty) set of `PrimitiveType`s.
///
/// Each primitive type owns exactly one bit (see `PrimitiveType::to_bit_representation_internal`);
/// `number` is folded to also carry the `integer` bit whenever a map is built via
/// `from_primitive_type`/`from_schema_value`, mirroring the "integer is a subtype of number" rule
/// used everywhere else in this crate. The map exists so keyword processing can do cheap set
/// arithmetic over the `type` keyword instead of repeatedly allocating a `BTreeSet`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct PrimitiveTypesBitMap(u8);

impl PrimitiveTypesBitMap {
    pub(crate) fn from_primitive_type(primitive_type: PrimitiveType) -> Self {
        Self(primitive_type.to_bit_representation())
    }

    /// Build a bitmap from the value of a `type` keyword (`None` means "no `type` keyword", ie. every type allowed)
    pub(crate) fn from_schema_value(maybe_type: Option<&Value>) -> Self {
        get_primitive_types(maybe_type)
            .into_iter()
            .fold(Self::default(), |acc, primitive_type| {
                acc | Self::from_primitive_type(primitive_type)
            })
    }

    /// Build a bitmap out of a full schema. A `false` schema always maps to the empty bitmap,
    /// regardless of whether it happens to carry a (meaningless) `type` keyword.
    pub(crate) fn from_schema(schema: &Value) -> Self {
        if schema == &Value::Bool(false) {
            Self::default()
        } else {
            Self::from_schema_value(schema.get("type"))
        }
    }

    fn as_btree_set(self) -> BTreeSet<PrimitiveType> {
        PrimitiveType::from_bit_representation(self.0)
            .into_iter()
            .collect()
    }

    /// Render back to the smallest equivalent JSON representation of the `type` keyword.
    /// `None` means the keyword should be omitted (either no constraint or impossible-to-satisfy).
    pub(crate) fn to_schema_value(self) -> Option<Value> {
        to_json_schema_primitive_types(&self.as_btree_set())
    }

    pub(crate) fn contains(self, primitive_type: PrimitiveType) -> bool {
        self.0 & primitive_type.to_bit_representation_internal() != 0
    }

    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn has_other_primitive_types_other_than(self, primitive_type: PrimitiveType) -> bool {
        self.0 & !primitive_type.to_bit_representation_internal() != 0
    }

    pub(crate) fn remove(&mut self, primitive_type: PrimitiveType) {
        self.0 &= !primitive_type.to_bit_representation_internal();
    }

    pub(crate) fn remove_all(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl From<PrimitiveType> for PrimitiveTypesBitMap {
    fn from(primitive_type: PrimitiveType) -> Self {
        Self::from_primitive_type(primitive_type)
    }
}

impl From<&[PrimitiveType]> for PrimitiveTypesBitMap {
    fn from(primitive_types: &[PrimitiveType]) -> Self {
        primitive_types
            .iter()
            .fold(Self::default(), |acc, primitive_type| {
                acc | *primitive_type
            })
    }
}

impl BitOr<PrimitiveType> for PrimitiveTypesBitMap {
    type Output = Self;
    fn bitor(self, rhs: PrimitiveType) -> Self {
        self | Self::from_primitive_type(rhs)
    }
}

impl BitOr for PrimitiveTypesBitMap {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypesBitMap {
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        self.0 |= Self::from_primitive_type(rhs).0;
    }
}

impl BitOrAssign for PrimitiveTypesBitMap {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PrimitiveTypesBitMap {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for PrimitiveTypesBitMap {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{get_primitive_types, to_json_schema_primitive_types, PrimitiveTypesBitMap};
    use crate::primitive_type::PrimitiveType;
    use serde_json::{json, Value};
    use std::collections::BTreeSet;
    use test_case::test_case;

    #[test_case(&json!({}) => btree_set!(PrimitiveType::Array, PrimitiveType::Boolean, PrimitiveType::Integer, PrimitiveType::Null, PrimitiveType::Number, PrimitiveType::Object, PrimitiveType::String))]
    #[test_case(&json!({"type": "array"}) => btree_set!(PrimitiveType::Array))]
    #[test_case(&json!({"type": ["boolean"]}) => btree_set!(PrimitiveType::Boolean))]
    #[test_case(&json!({"type": ["integer", "null"]}) => btree_set!(PrimitiveType::Integer, PrimitiveType::Null))]
    #[test_case(&json!({"type": ["a-wrong-type"]}) => btree_set!())]
    fn test_get_primitive_types(schema: &Value) -> BTreeSet<PrimitiveType> {
        get_primitive_types(schema.get("type"))
    }

    #[test_case(&btree_set!() => None)]
    #[test_case(&btree_set!(PrimitiveType::Array) => Some(json!("array")))]
    #[test_case(&btree_set!(PrimitiveType::Boolean, PrimitiveType::Null) => Some(json!(["boolean", "null"])))]
    #[test_case(&btree_set!(PrimitiveType::Integer, PrimitiveType::Number) => Some(json!("number")))]
    #[test_case(&btree_set!(PrimitiveType::Integer, PrimitiveType::Number, PrimitiveType::String) => Some(json!(["number", "string"])))]
    #[test_case(&btree_set!(PrimitiveType::Array, PrimitiveType::Boolean, PrimitiveType::Null, PrimitiveType::Number, PrimitiveType::Object, PrimitiveType::String) => None)]
    #[test_case(&btree_set!(PrimitiveType::Array, PrimitiveType::Boolean, PrimitiveType::Integer, PrimitiveType::Null, PrimitiveType::Number, PrimitiveType::Object, PrimitiveType::String) => None)]
    fn test_to_json_schema_primitive_types(
        primitive_types: &BTreeSet<PrimitiveType>,
    ) -> Option<Value> {
        to_json_schema_primitive_types(primitive_types)
    }

    #[test_case(None => PrimitiveTypesBitMap::default() | PrimitiveType::Array | PrimitiveType::Boolean | PrimitiveType::Integer | PrimitiveType::Null | PrimitiveType::Number | PrimitiveType::Object | PrimitiveType::String)]
    #[test_case(Some(&json!("string")) => PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::String))]
    #[test_case(Some(&json!("number")) => PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::Integer) | PrimitiveType::Number)]
    fn test_from_schema_value(maybe_type: Option<&Value>) -> PrimitiveTypesBitMap {
        PrimitiveTypesBitMap::from_schema_value(maybe_type)
    }

    #[test_case(&json!(false) => true)]
    #[test_case(&json!({"type": "string"}) => false)]
    #[test_case(&json!({}) => false)]
    fn test_from_schema_false_schema_is_empty(schema: &Value) -> bool {
        PrimitiveTypesBitMap::from_schema(schema).is_empty()
    }

    #[test_case(PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::Number), PrimitiveType::Integer => true)]
    #[test_case(PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::String), PrimitiveType::Integer => false)]
    fn test_contains(bit_map: PrimitiveTypesBitMap, primitive_type: PrimitiveType) -> bool {
        bit_map.contains(primitive_type)
    }

    #[test_case(PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::String), PrimitiveType::String => false)]
    #[test_case(PrimitiveTypesBitMap::from_primitive_type(PrimitiveType::String) | PrimitiveType::Null, PrimitiveType::String => true)]
    fn test_has_other_primitive_types_other_than(
        bit_map: PrimitiveTypesBitMap,
        primitive_type: PrimitiveType,
    ) -> bool {
        bit_map.has_other_primitive_types_other_than(primitive_type)
    }
}
