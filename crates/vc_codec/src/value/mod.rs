//! The tree-shaped exchange representation.
//!
//! A [`Value`] is a plain tagged tree: scalars, lists and string-keyed maps.
//! It carries no references of its own; identity and back-references are
//! expressed by [envelopes](crate::envelope) built out of maps.
//!
//! [`Value`] implements `serde`'s `Serialize` and `Deserialize`, so any serde
//! format can be used to write it out or read it back:
//!
//! ```
//! # use vc_codec::value::{Map, Value};
//! let mut map = Map::new();
//! map.insert("ref".into(), Value::Int(0));
//! let value = Value::Map(map);
//!
//! let text = serde_json::to_string(&value).unwrap();
//! assert_eq!(text, r#"{"ref":0}"#);
//!
//! let back: Value = serde_json::from_str(&text).unwrap();
//! assert_eq!(back, value);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod convert;
mod serde_impl;

// -----------------------------------------------------------------------------
// Exports

pub use convert::{FromValue, ValueError};

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// The map type used by [`Value::Map`].
///
/// Keys are kept sorted, so two maps holding the same entries always
/// compare and serialize identically.
pub type Map = BTreeMap<String, Value>;

// -----------------------------------------------------------------------------
// Value

/// One node of the exchange tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// A short name of the variant, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number as `f64`; integers are widened.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a map.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }
}

// -----------------------------------------------------------------------------
// Conversions into Value

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_try_from_int {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Value {
                type Error = ValueError;

                /// Fails if `value` does not fit into an `i64`.
                fn try_from(value: $ty) -> Result<Self, ValueError> {
                    i64::try_from(value)
                        .map(Self::Int)
                        .map_err(|_| ValueError::Overflow {
                            value: value as i128,
                            origin: stringify!($ty),
                        })
                }
            }
        )*
    };
}

impl_try_from_int!(isize, u64, usize);

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(String::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    #[inline]
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

// -----------------------------------------------------------------------------
// Tests
