use thiserror::Error;

use crate::{FieldKey, ObjectKey};

// -----------------------------------------------------------------------------
// AccessError

/// Failure to read or write an entry of an [`ObjectGraph`](crate::ObjectGraph).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("object {0:?} does not exist in this graph")]
    Missing(ObjectKey),

    #[error("object {0:?} is reserved but has not been constructed yet")]
    Vacant(ObjectKey),

    #[error("object {0:?} has already been constructed")]
    Occupied(ObjectKey),

    #[error("object {key:?} is a `{found}`, not a `{expected}`")]
    TypeMismatch {
        key: ObjectKey,
        expected: &'static str,
        found: &'static str,
    },

    #[error("object {0:?} is frozen")]
    Frozen(ObjectKey),
}

// -----------------------------------------------------------------------------
// PatchError

/// Returned by [`Object::patch`](crate::Object::patch) when a deferred
/// reference cannot be assigned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatchError {
    #[error("`{0}` is not a reference field")]
    UnknownField(FieldKey),

    #[error("`{0}` is out of range")]
    OutOfRange(FieldKey),
}
