//! Self-describing NBT documents for tiles.
//!
//! A [`CompoundTag`] is an ordered map of named NBT values. Top-level field
//! order is preserved through save/load so re-saved documents diff cleanly;
//! nested compounds are plain `fastnbt` values.

use std::collections::HashMap;

use fastnbt::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{field}` is not a {expected} tag")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}

/// Typed view of a borrowed NBT value.
pub trait FromTag<'a>: Sized {
    /// Tag type name used in error messages.
    const TAG: &'static str;

    fn from_tag(value: &'a Value) -> Option<Self>;
}

macro_rules! scalar_tag {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl<'a> FromTag<'a> for $ty {
            const TAG: &'static str = $name;

            fn from_tag(value: &'a Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }

        impl IntoTag for $ty {
            fn into_tag(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

scalar_tag!(i8, Byte, "byte");
scalar_tag!(i16, Short, "short");
scalar_tag!(i32, Int, "int");
scalar_tag!(i64, Long, "long");
scalar_tag!(f32, Float, "float");
scalar_tag!(f64, Double, "double");

impl<'a> FromTag<'a> for &'a str {
    const TAG: &'static str = "string";

    fn from_tag(value: &'a Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl<'a> FromTag<'a> for &'a [Value] {
    const TAG: &'static str = "list";

    fn from_tag(value: &'a Value) -> Option<Self> {
        match value {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl<'a> FromTag<'a> for &'a HashMap<String, Value> {
    const TAG: &'static str = "compound";

    fn from_tag(value: &'a Value) -> Option<Self> {
        match value {
            Value::Compound(map) => Some(map),
            _ => None,
        }
    }
}

/// Conversion of an owned value into an NBT tag.
pub trait IntoTag {
    fn into_tag(self) -> Value;
}

impl IntoTag for bool {
    fn into_tag(self) -> Value {
        Value::Byte(self as i8)
    }
}

impl IntoTag for String {
    fn into_tag(self) -> Value {
        Value::String(self)
    }
}

impl IntoTag for &str {
    fn into_tag(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoTag for Vec<Value> {
    fn into_tag(self) -> Value {
        Value::List(self)
    }
}

impl IntoTag for CompoundTag {
    fn into_tag(self) -> Value {
        self.into_value()
    }
}

impl IntoTag for Value {
    fn into_tag(self) -> Value {
        self
    }
}

/// An ordered NBT compound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompoundTag(IndexMap<String, Value>);

impl CompoundTag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a `Value::Compound`. Keys are sorted since the source map is
    /// unordered. Returns `None` for any other tag type.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Compound(map) => {
                let mut entries: Vec<(String, Value)> = map.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Some(Self(entries.into_iter().collect()))
            }
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Compound(self.0.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Typed lookup. Absent is `Ok(None)`; present with another tag type is
    /// an error.
    pub fn get<'a, T: FromTag<'a>>(&'a self, key: &str) -> Result<Option<T>, DocumentError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(value) => T::from_tag(value)
                .map(Some)
                .ok_or_else(|| DocumentError::WrongType {
                    field: key.to_owned(),
                    expected: T::TAG,
                }),
        }
    }

    pub fn get_or<'a, T: FromTag<'a>>(&'a self, key: &str, default: T) -> Result<T, DocumentError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    pub fn require<'a, T: FromTag<'a>>(&'a self, key: &str) -> Result<T, DocumentError> {
        self.get(key)?
            .ok_or_else(|| DocumentError::MissingField(key.to_owned()))
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn put(&mut self, key: impl Into<String>, value: impl IntoTag) -> &mut Self {
        self.0.insert(key.into(), value.into_tag());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }
}
