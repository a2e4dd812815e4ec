use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;
use vc_graph::{AccessError, PatchError};

use crate::envelope::RefId;
use crate::value::ValueError;

/// Field name used for problems with the root value itself.
pub const ROOT_FIELD: &str = "$";

// -----------------------------------------------------------------------------
// FieldError

/// One problem found at one field.
///
/// `field` is the path from the root, e.g. `next.children[2].name`, or
/// [`ROOT_FIELD`] for the root value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{field}`: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[inline]
    pub fn new(field: impl Into<String>, message: impl ToString) -> Self {
        Self {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldErrors

/// A batch of [`FieldError`]s collected during one walk.
///
/// Decoding does not stop at the first problem: every problem found in the
/// input is reported together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// A batch holding exactly one error.
    #[inline]
    pub fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    #[inline]
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Moves every error of `other` into `self`.
    #[inline]
    pub fn append(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    #[inline]
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }

    /// Returns `Err(self)` unless the batch is empty.
    #[inline]
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => return f.write_str("no field errors"),
            1 => f.write_str("1 field error: ")?,
            n => write!(f, "{n} field errors: ")?,
        }
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl core::error::Error for FieldErrors {}

impl From<FieldError> for FieldErrors {
    #[inline]
    fn from(value: FieldError) -> Self {
        Self::single(value)
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = vec::IntoIter<FieldError>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = core::slice::Iter<'a, FieldError>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// -----------------------------------------------------------------------------
// DecodeError

/// Why a top-level decode failed.
///
/// No partial graph is ever returned alongside an error.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Validation and structural problems, batched.
    #[error("invalid input, {0}")]
    Invalid(FieldErrors),

    #[error("unresolved reference at `{field}`: id {id} is never declared")]
    UnresolvedReference { id: RefId, field: String },

    #[error("the root envelope is a reference to id {0}")]
    RootIsReference(RefId),

    #[error("reference at `{field}` expects a `{expected}`, but id {id} is a `{found}`")]
    ReferenceMismatch {
        id: RefId,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot assign the reference at `{field}`: {source}")]
    Patch {
        field: String,
        #[source]
        source: PatchError,
    },

    #[error("cannot store the object at `{field}`: {source}")]
    Access {
        field: String,
        #[source]
        source: AccessError,
    },
}

impl DecodeError {
    /// Flattens the error into `{ field, message }` entries.
    ///
    /// [`DecodeError::Invalid`] yields its whole batch, every other variant
    /// yields one entry.
    pub fn field_errors(&self) -> FieldErrors {
        let field = match self {
            Self::Invalid(errors) => return errors.clone(),
            Self::RootIsReference(_) => ROOT_FIELD,
            Self::UnresolvedReference { field, .. }
            | Self::ReferenceMismatch { field, .. }
            | Self::Patch { field, .. }
            | Self::Access { field, .. } => field.as_str(),
        };
        FieldErrors::single(FieldError::new(field, self))
    }
}

impl From<FieldErrors> for DecodeError {
    #[inline]
    fn from(value: FieldErrors) -> Self {
        Self::Invalid(value)
    }
}

// -----------------------------------------------------------------------------
// EncodeError

/// Why a top-level encode failed.
///
/// Encoding fails when the graph itself is inconsistent, nests deeper than
/// the walk allows, or holds a scalar the value tree cannot represent.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("cannot encode `{field}`: {source}")]
    Access {
        field: String,
        #[source]
        source: AccessError,
    },

    #[error("cannot encode `{field}`: no codec is registered for type `{tag}`")]
    Unregistered { field: String, tag: &'static str },

    #[error("cannot encode `{field}`: nesting exceeds the depth limit of {limit}")]
    DepthLimit { field: String, limit: usize },

    #[error("cannot encode `{field}`: {source}")]
    Value {
        field: String,
        #[source]
        source: ValueError,
    },
}

// -----------------------------------------------------------------------------
// Tests
