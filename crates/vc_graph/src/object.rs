use core::any::{Any, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use slotmap::{Key, new_key_type};

use crate::PatchError;

// -----------------------------------------------------------------------------
// ObjectKey

new_key_type! {
    /// Identity of one instance inside an [`ObjectGraph`](crate::ObjectGraph).
    ///
    /// Two keys are equal only if they address the same slot, so the key is
    /// the object's identity, unrelated to the value it holds.
    pub struct ObjectKey;
}

// -----------------------------------------------------------------------------
// FieldKey

/// Names a reference-holding property of an [`Object`].
///
/// A property is either a plain field or one element of a list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name(&'static str),
    Element(&'static str, usize),
}

impl FieldKey {
    /// Returns the field name, ignoring any element index.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Name(name) | Self::Element(name, _) => name,
        }
    }

    /// Returns the element index, if this key addresses a list element.
    #[inline]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Name(_) => None,
            Self::Element(_, index) => Some(*index),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Element(name, index) => write!(f, "{name}[{index}]"),
        }
    }
}

// -----------------------------------------------------------------------------
// Object

/// A value that can live in an [`ObjectGraph`](crate::ObjectGraph).
///
/// Implementations are usually generated together with the type's codec.
/// A graph may be built on one thread and handed to another, so objects
/// must be `Send + Sync`.
pub trait Object: Any + Send + Sync {
    /// The tag written into (and expected from) value envelopes.
    fn type_tag(&self) -> &'static str;

    /// Assigns `target` to the reference property named by `field`.
    ///
    /// Called after construction for references whose target did not exist
    /// yet when the object was built. Custom setters run here, in the order
    /// the references were encountered.
    fn patch(&mut self, field: &FieldKey, target: ObjectKey) -> Result<(), PatchError>;
}

// -----------------------------------------------------------------------------
// Ref

/// A typed handle to an object of type `T` inside an
/// [`ObjectGraph`](crate::ObjectGraph).
///
/// `Ref` is `Copy` and compares by identity: two handles are equal if they
/// address the same slot, regardless of the contents.
///
/// A handle can be *null*, it then addresses nothing. Null handles are used as
/// placeholders while a graph is under construction.
pub struct Ref<T> {
    key: ObjectKey,
    marker: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    /// Wraps an untyped key.
    ///
    /// The type is checked on access, not here.
    #[inline]
    pub const fn from_key(key: ObjectKey) -> Self {
        Self {
            key,
            marker: PhantomData,
        }
    }

    /// Creates a handle addressing nothing.
    #[inline]
    pub fn null() -> Self {
        Self::from_key(ObjectKey::null())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.key.is_null()
    }

    /// Returns the untyped key.
    #[inline]
    pub const fn key(self) -> ObjectKey {
        self.key
    }
}

impl<T> Clone for Ref<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T> Default for Ref<T> {
    /// See [`Ref::null`].
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref<{}>({:?})", type_name::<T>(), self.key.data())
    }
}

impl<T> From<Ref<T>> for ObjectKey {
    #[inline]
    fn from(value: Ref<T>) -> Self {
        value.key
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{FieldKey, ObjectKey, Ref};
    use alloc::string::ToString;

    struct Marker;

    #[test]
    fn null_ref() {
        let r = Ref::<Marker>::null();
        assert!(r.is_null());
        assert_eq!(r, Ref::default());
        assert_eq!(r.key(), ObjectKey::default());
    }

    #[test]
    fn field_key_display() {
        assert_eq!(FieldKey::Name("next").to_string(), "next");
        assert_eq!(FieldKey::Element("children", 3).to_string(), "children[3]");
        assert_eq!(FieldKey::Element("children", 3).name(), "children");
        assert_eq!(FieldKey::Name("next").index(), None);
    }
}
