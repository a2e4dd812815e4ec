use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use super::Value;

// -----------------------------------------------------------------------------
// ValueError

/// A scalar field held a value of the wrong shape.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValueError {
    #[error("expected {expected}, found {found}")]
    Kind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{value} is out of range for {target}")]
    OutOfRange { value: i64, target: &'static str },

    #[error("{value} ({origin}) does not fit into an integer value")]
    Overflow { value: i128, origin: &'static str },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ValueError>,
    },
}

impl ValueError {
    #[inline]
    fn kind(expected: &'static str, found: &Value) -> Self {
        Self::Kind {
            expected,
            found: found.kind(),
        }
    }
}

// -----------------------------------------------------------------------------
// FromValue

/// Conversion from an exchange-tree node into a scalar field value.
///
/// Reference fields are not converted through this trait; they go through
/// the deserialization context so that back-references can be resolved.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_bool()
            .ok_or_else(|| ValueError::kind("boolean", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_i64()
            .ok_or_else(|| ValueError::kind("integer", value))
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ValueError> {
                    let int = i64::from_value(value)?;
                    <$ty>::try_from(int).map_err(|_| ValueError::OutOfRange {
                        value: int,
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value.as_f64().ok_or_else(|| ValueError::kind("number", value))
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| ValueError::kind("string", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        let list = value
            .as_list()
            .ok_or_else(|| ValueError::kind("list", value))?;
        list.iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_value(item).map_err(|err| ValueError::Element {
                    index,
                    source: Box::new(err),
                })
            })
            .collect()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{FromValue, ValueError};
    use crate::value::Value;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(u8::from_value(&Value::Int(255)), Ok(255));
        assert_eq!(
            u8::from_value(&Value::Int(256)),
            Err(ValueError::OutOfRange {
                value: 256,
                target: "u8"
            })
        );
        assert!(u32::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn wide_integers_both_ways() {
        let value = Value::try_from(u64::from(u32::MAX) + 1).unwrap();
        assert_eq!(u64::from_value(&value), Ok(u64::from(u32::MAX) + 1));
        assert_eq!(Value::try_from(-3_isize), Ok(Value::Int(-3)));
        assert_eq!(Value::try_from(7_usize), Ok(Value::Int(7)));

        let err = Value::try_from(u64::MAX).unwrap_err();
        assert_eq!(
            err,
            ValueError::Overflow {
                value: i128::from(u64::MAX),
                origin: "u64"
            }
        );
        assert_eq!(
            err.to_string(),
            "18446744073709551615 (u64) does not fit into an integer value"
        );
    }

    #[test]
    fn kind_mismatch() {
        let err = String::from_value(&Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "expected string, found integer");
    }

    #[test]
    fn nested() {
        let list = Value::List(vec![Value::Int(1), Value::Null]);
        assert_eq!(
            Vec::<Option<i32>>::from_value(&list),
            Ok(vec![Some(1), None])
        );

        let err = Vec::<i32>::from_value(&list).unwrap_err();
        assert_eq!(err.to_string(), "element 1: expected integer, found null");
    }
}
