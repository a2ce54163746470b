//! Attribute store.
//!
//! Every definition entity (production, rule, module, configuration cell)
//! carries an immutable, ordered map from attribute key to a tagged value.
//! Values are a closed set of variants so that extraction never needs a
//! runtime type cast.

use crate::{AttributeError, AttributeResult, Location};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known attribute keys.
pub mod keys {
    pub const FUNCTION: &str = "function";
    pub const PREDICATE: &str = "predicate";
    pub const PATTERN: &str = "pattern";
    pub const SMTLIB: &str = "smtlib";
    pub const STRICT: &str = "strict";
    pub const SEQSTRICT: &str = "seqstrict";
    pub const HEAT: &str = "heat";
    pub const COOL: &str = "cool";
    pub const BINDER: &str = "binder";
    pub const METABINDER: &str = "metabinder";
    pub const STREAM: &str = "stream";
    pub const FRESH_GENERATOR: &str = "freshGenerator";
    pub const KLABEL: &str = "klabel";
    pub const SOURCE: &str = "source";
    pub const LOCATION: &str = "location";
    pub const CELL: &str = "cell";
    pub const MULTIPLICITY: &str = "multiplicity";
    pub const LABEL: &str = "label";
}

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttrValue {
    /// A bare marker such as `[function]`.
    Marker,
    /// A string payload such as `[smtlib(+)]`.
    Str(String),
    /// An integer payload.
    Int(i64),
    /// A boolean payload.
    Bool(bool),
    /// A list of positions such as `[strict(1, 2)]`.
    Ints(Vec<u32>),
    /// An ordered relation of integer pairs (binder maps).
    Relation(Vec<(u32, u32)>),
    /// A source position.
    Location(Location),
}

impl AttrValue {
    /// Returns true if this is a bare marker.
    pub fn is_marker(&self) -> bool {
        matches!(self, AttrValue::Marker)
    }

    /// Get as string reference if this is a Str value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as a position list if this is an Ints value.
    pub fn as_ints(&self) -> Option<&[u32]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }

    /// Get as a relation if this is a Relation value.
    pub fn as_relation(&self) -> Option<&[(u32, u32)]> {
        match self {
            AttrValue::Relation(r) => Some(r),
            _ => None,
        }
    }

    /// Get as a location if this is a Location value.
    pub fn as_location(&self) -> Option<Location> {
        match self {
            AttrValue::Location(l) => Some(*l),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Marker => "Marker",
            AttrValue::Str(_) => "Str",
            AttrValue::Int(_) => "Int",
            AttrValue::Bool(_) => "Bool",
            AttrValue::Ints(_) => "Ints",
            AttrValue::Relation(_) => "Relation",
            AttrValue::Location(_) => "Location",
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Marker => Ok(()),
            AttrValue::Str(s) => write!(f, "\"{}\"", s),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Ints(items) => {
                let items: Vec<String> = items.iter().map(u32::to_string).collect();
                write!(f, "{}", items.join(", "))
            }
            AttrValue::Relation(pairs) => {
                let pairs: Vec<String> = pairs.iter().map(|(a, b)| format!("{a} {b}")).collect();
                write!(f, "{}", pairs.join(", "))
            }
            AttrValue::Location(l) => write!(f, "{}:{}", l.line, l.column),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<Vec<u32>> for AttrValue {
    fn from(v: Vec<u32>) -> Self {
        AttrValue::Ints(v)
    }
}

impl From<Vec<(u32, u32)>> for AttrValue {
    fn from(r: Vec<(u32, u32)>) -> Self {
        AttrValue::Relation(r)
    }
}

impl From<Location> for AttrValue {
    fn from(l: Location) -> Self {
        AttrValue::Location(l)
    }
}

/// An immutable ordered mapping from attribute key to value.
///
/// "Modifying" operations return a new set; the receiver is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: BTreeMap<String, AttrValue>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` bound to `value`.
    pub fn with(&self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    /// Returns a copy with `key` bound to a marker.
    pub fn with_marker(&self, key: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), AttrValue::Marker);
        Self { entries }
    }

    /// Returns a copy without `key`.
    pub fn without(&self, key: &str) -> Self {
        let mut entries = self.entries.clone();
        entries.remove(key);
        Self { entries }
    }

    /// Returns the union of both sets; entries of `other` win on conflicts.
    pub fn merge(&self, other: &Attributes) -> Self {
        let mut entries = self.entries.clone();
        for (k, v) in &other.entries {
            entries.insert(k.clone(), v.clone());
        }
        Self { entries }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ==================== Typed extraction ====================

    /// Get a string attribute. Markers read as absent payloads.
    pub fn get_str(&self, key: &str) -> AttributeResult<Option<&str>> {
        match self.entries.get(key) {
            None | Some(AttrValue::Marker) => Ok(None),
            Some(AttrValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(AttributeError::type_mismatch(key, "Str", other.type_name())),
        }
    }

    pub fn get_int(&self, key: &str) -> AttributeResult<Option<i64>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(AttrValue::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(AttributeError::type_mismatch(key, "Int", other.type_name())),
        }
    }

    pub fn get_bool(&self, key: &str) -> AttributeResult<Option<bool>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(AttrValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(AttributeError::type_mismatch(key, "Bool", other.type_name())),
        }
    }

    /// Get a position list. A bare marker reads as an empty list.
    pub fn get_ints(&self, key: &str) -> AttributeResult<Option<&[u32]>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(AttrValue::Marker) => Ok(Some(&[])),
            Some(AttrValue::Ints(v)) => Ok(Some(v)),
            Some(other) => Err(AttributeError::type_mismatch(key, "Ints", other.type_name())),
        }
    }

    pub fn get_relation(&self, key: &str) -> AttributeResult<Option<&[(u32, u32)]>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(AttrValue::Relation(r)) => Ok(Some(r)),
            Some(other) => Err(AttributeError::type_mismatch(
                key,
                "Relation",
                other.type_name(),
            )),
        }
    }

    pub fn get_location(&self, key: &str) -> AttributeResult<Option<Location>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(AttrValue::Location(l)) => Ok(Some(*l)),
            Some(other) => Err(AttributeError::type_mismatch(
                key,
                "Location",
                other.type_name(),
            )),
        }
    }

    // ==================== Common queries ====================

    /// The `source` attribute, if any.
    pub fn source(&self) -> Option<&str> {
        self.get_str(keys::SOURCE).ok().flatten()
    }

    /// The `location` attribute, if any.
    pub fn location(&self) -> Option<Location> {
        self.get_location(keys::LOCATION).ok().flatten()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }
        write!(f, "[")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if value.is_marker() {
                write!(f, "{}", key)?;
            } else {
                write!(f, "{}({})", key, value)?;
            }
        }
        write!(f, "]")
    }
}

impl FromIterator<(String, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Helper macro to create attribute sets.
///
/// `attrs![function, smtlib => "+"]` binds `function` to a marker and
/// `smtlib` to a string.
#[macro_export]
macro_rules! attrs {
    () => {
        $crate::Attributes::new()
    };
    ($($key:ident $(=> $value:expr)?),+ $(,)?) => {
        {
            let attrs = $crate::Attributes::new();
            $(
                let attrs = $crate::attrs!(@entry attrs, $key $(, $value)?);
            )+
            attrs
        }
    };
    (@entry $attrs:ident, $key:ident) => {
        $attrs.with_marker(stringify!($key))
    };
    (@entry $attrs:ident, $key:ident, $value:expr) => {
        $attrs.with(stringify!($key), $crate::AttrValue::from($value))
    };
}
