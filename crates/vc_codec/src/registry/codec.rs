use core::any::type_name;
use core::fmt;

use vc_graph::{ObjectKey, Ref};

use super::{HashMap, Resolution, new_hash_map};
use crate::de::{Decode, DeserializeContext};
use crate::error::{EncodeError, FieldErrors};
use crate::ser::{Encode, SerializeContext};
use crate::value::Value;

// -----------------------------------------------------------------------------
// TypeCodec

/// Type-erased codec entry point for one registered type.
///
/// Each function re-enters the context with the concrete type, so nested
/// values share the registries of the walk that reached them.
#[derive(Clone, Copy)]
pub struct TypeCodec {
    tag: &'static str,
    type_name: &'static str,
    encode: fn(&mut SerializeContext<'_>, ObjectKey) -> Result<Value, EncodeError>,
    decode: fn(&mut DeserializeContext<'_>, &Value) -> Result<Resolution, FieldErrors>,
}

impl TypeCodec {
    /// Creates the codec entry of `T`.
    pub fn of<T: Encode + Decode>() -> Self {
        Self {
            tag: T::TYPE_TAG,
            type_name: type_name::<T>(),
            encode: encode_erased::<T>,
            decode: decode_erased::<T>,
        }
    }

    #[inline]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Encodes the object at `key`, which must be of this codec's type.
    #[inline]
    pub fn encode(
        &self,
        ctx: &mut SerializeContext<'_>,
        key: ObjectKey,
    ) -> Result<Value, EncodeError> {
        (self.encode)(ctx, key)
    }

    /// Decodes `value` as this codec's type.
    #[inline]
    pub fn decode(
        &self,
        ctx: &mut DeserializeContext<'_>,
        value: &Value,
    ) -> Result<Resolution, FieldErrors> {
        (self.decode)(ctx, value)
    }
}

impl fmt::Debug for TypeCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCodec")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn encode_erased<T: Encode>(
    ctx: &mut SerializeContext<'_>,
    key: ObjectKey,
) -> Result<Value, EncodeError> {
    ctx.serialize(Ref::<T>::from_key(key))
}

fn decode_erased<T: Decode>(
    ctx: &mut DeserializeContext<'_>,
    value: &Value,
) -> Result<Resolution, FieldErrors> {
    ctx.deserialize::<T>(value)
}

// -----------------------------------------------------------------------------
// CodecRegistry

/// Type tag to [`TypeCodec`] table.
///
/// Only needed for references whose concrete type is not known statically,
/// see [`FieldWriter::dyn_reference`](crate::ser::FieldWriter::dyn_reference)
/// and [`FieldReader::dyn_reference`](crate::de::FieldReader::dyn_reference).
///
/// # Examples
///
/// ```ignore
/// let mut registry = CodecRegistry::new();
/// registry.register::<Circle>();
/// registry.register::<Square>();
///
/// let decoded = DecodeDriver::with_registry(&registry).decode_dyn(&value)?;
/// ```
pub struct CodecRegistry {
    by_tag: HashMap<&'static str, TypeCodec>,
}

impl Default for CodecRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            by_tag: new_hash_map(),
        }
    }

    /// Registers `T` under its type tag.
    ///
    /// Returns `false`, keeping the existing entry, if the tag is taken.
    pub fn register<T: Encode + Decode>(&mut self) -> bool {
        self.insert(TypeCodec::of::<T>())
    }

    /// Inserts a codec entry unless its tag is already taken.
    pub fn insert(&mut self, codec: TypeCodec) -> bool {
        match self.by_tag.get(codec.tag) {
            Some(existing) => {
                log::warn!(
                    "type tag `{}` is already registered by `{}`, ignoring `{}`",
                    codec.tag,
                    existing.type_name,
                    codec.type_name,
                );
                false
            }
            None => {
                self.by_tag.insert(codec.tag, codec);
                true
            }
        }
    }

    #[inline]
    pub fn get(&self, tag: &str) -> Option<&TypeCodec> {
        self.by_tag.get(tag)
    }

    #[inline]
    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Iterates over every registered codec, in no particular order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeCodec> {
        self.by_tag.values()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.by_tag.keys()).finish()
    }
}
