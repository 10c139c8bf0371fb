//! Runtime values.
//!
//! Heap payloads sit behind `Arc` so values are cheap to clone and can be
//! shared between concurrent evaluations of one program. Build them through
//! the factory methods (`Value::string`, `Value::list`, ...).

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::errors::{duplicate_map_key, invalid_map_key, EvalError};
use crate::native::NativeTag;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned integer under [`crate::UintRepr::Lossless`]; under the
    /// signed representation unsigned values are non-negative `Int`s.
    Uint(u64),
    Double(f64),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    List(Arc<[Value]>),
    Map(Arc<ValueMap>),
    Optional(Option<Arc<Value>>),
}

impl Value {
    #[inline]
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    #[inline]
    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }

    #[inline]
    pub fn map(map: ValueMap) -> Self {
        Value::Map(Arc::new(map))
    }

    #[inline]
    pub fn some(value: Value) -> Self {
        Value::Optional(Some(Arc::new(value)))
    }

    #[inline]
    pub fn none() -> Self {
        Value::Optional(None)
    }

    /// The runtime representation tag of this value.
    pub fn tag(&self) -> NativeTag {
        match self {
            Value::Null => NativeTag::Null,
            Value::Bool(_) => NativeTag::Bool,
            Value::Int(_) => NativeTag::Int,
            Value::Uint(_) => NativeTag::Uint,
            Value::Double(_) => NativeTag::Double,
            Value::String(_) => NativeTag::String,
            Value::Bytes(_) => NativeTag::Bytes,
            Value::List(_) => NativeTag::List,
            Value::Map(_) => NativeTag::Map,
            Value::Optional(_) => NativeTag::Optional,
        }
    }

    /// Name of the value's runtime type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null_type",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Optional(_) => "optional_type",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Uint(_) | Value::Double(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Structural equality, used by tests and map bookkeeping.
///
/// Language-level equality is heterogeneous across numeric representations
/// and lives in [`crate::NumericComparator::equals`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Optional(a), Value::Optional(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}u"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Optional(Some(inner)) => write!(f, "optional.of({inner})"),
            Value::Optional(None) => f.write_str("optional.none()"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

/// Hashable identity of a map key.
///
/// Integer keys of either representation share one numeric key space, so
/// `m[1]` and `m[1u]` find the same entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    Bool(bool),
    Int(i128),
    String(Arc<str>),
}

impl MapKey {
    /// Key for a value stored into a map; only bool, int, uint and string
    /// values may be keys.
    pub fn for_insert(value: &Value) -> Option<MapKey> {
        match value {
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Int(i) => Some(MapKey::Int(i128::from(*i))),
            Value::Uint(u) => Some(MapKey::Int(i128::from(*u))),
            Value::String(s) => Some(MapKey::String(s.clone())),
            _ => None,
        }
    }

    /// Key for a lookup; integral doubles also find numeric keys.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the double is integral and inside the i128 range"
    )]
    pub fn for_lookup(value: &Value) -> Option<MapKey> {
        match value {
            Value::Double(d) if d.fract() == 0.0 && d.abs() < 1e30 => Some(MapKey::Int(*d as i128)),
            other => MapKey::for_insert(other),
        }
    }
}

/// Insertion-ordered map with heterogeneous numeric key lookup.
#[derive(Clone, Debug, Default)]
pub struct ValueMap {
    entries: Vec<(Value, Value)>,
    index: FxHashMap<MapKey, usize>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry; the key must be valid and not yet present.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<(), EvalError> {
        let Some(map_key) = MapKey::for_insert(&key) else {
            return Err(invalid_map_key(key.type_name()));
        };
        if self.index.contains_key(&map_key) {
            return Err(duplicate_map_key(&key));
        }
        self.index.insert(map_key, self.entries.len());
        self.entries.push((key, value));
        Ok(())
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        let map_key = MapKey::for_lookup(key)?;
        let &slot = self.index.get(&map_key)?;
        self.entries.get(slot).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Order-insensitive structural equality.
impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| w == v))
    }
}

impl TryFrom<Vec<(Value, Value)>> for ValueMap {
    type Error = EvalError;

    fn try_from(entries: Vec<(Value, Value)>) -> Result<Self, Self::Error> {
        let mut map = ValueMap::new();
        for (key, value) in entries {
            map.insert(key, value)?;
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ValueMap {
        ValueMap::try_from(vec![
            (Value::Int(1), Value::from("one")),
            (Value::from("k"), Value::Bool(true)),
        ])
        .unwrap()
    }

    #[test]
    fn numeric_keys_share_one_space() {
        let map = sample();
        assert_eq!(map.get(&Value::Uint(1)), Some(&Value::from("one")));
        assert_eq!(map.get(&Value::Double(1.0)), Some(&Value::from("one")));
        assert_eq!(map.get(&Value::Double(1.5)), None);
        assert_eq!(map.get(&Value::Int(2)), None);
    }

    #[test]
    fn duplicate_and_invalid_keys() {
        let mut map = sample();
        let err = map.insert(Value::Uint(1), Value::Null).unwrap_err();
        assert_eq!(err.message, "duplicate map key: 1u");
        let err = map.insert(Value::Double(2.0), Value::Null).unwrap_err();
        assert_eq!(err.message, "unsupported map key type: double");
    }

    #[test]
    fn map_equality_ignores_order() {
        let a = sample();
        let b = ValueMap::try_from(vec![
            (Value::from("k"), Value::Bool(true)),
            (Value::Int(1), Value::from("one")),
        ])
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn display() {
        let v = Value::list(vec![Value::Uint(3), Value::Double(1.0), Value::from("x")]);
        assert_eq!(v.to_string(), r#"[3u, 1.0, "x"]"#);
        assert_eq!(Value::some(Value::Null).to_string(), "optional.of(null)");
    }
}
