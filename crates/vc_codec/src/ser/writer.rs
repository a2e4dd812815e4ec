use alloc::string::String;
use alloc::vec::Vec;

use vc_graph::{FieldKey, ObjectKey, Ref};

use super::{Encode, SerializeContext};
use crate::error::EncodeError;
use crate::value::{Map, Value, ValueError};

/// Collects the field map of one value envelope.
///
/// Handed to [`Encode::encode_fields`]. Reference fields are encoded through
/// the owning [`SerializeContext`] with the field pushed onto its path.
pub struct FieldWriter<'c, 'g> {
    ctx: &'c mut SerializeContext<'g>,
    fields: Map,
}

impl<'c, 'g> FieldWriter<'c, 'g> {
    #[inline]
    pub(super) fn new(ctx: &'c mut SerializeContext<'g>) -> Self {
        Self {
            ctx,
            fields: Map::new(),
        }
    }

    #[inline]
    pub(super) fn finish(self) -> Map {
        self.fields
    }

    /// The context of the walk this writer belongs to.
    #[inline]
    pub fn context(&mut self) -> &mut SerializeContext<'g> {
        &mut *self.ctx
    }

    /// Writes a scalar field.
    #[inline]
    pub fn scalar(&mut self, name: &'static str, value: impl Into<Value>) {
        self.fields.insert(String::from(name), value.into());
    }

    /// Writes a scalar field whose conversion can fail, e.g. a `u64` above
    /// `i64::MAX`.
    pub fn try_scalar<V>(&mut self, name: &'static str, value: V) -> Result<(), EncodeError>
    where
        V: TryInto<Value, Error = ValueError>,
    {
        let value = value.try_into().map_err(|source| EncodeError::Value {
            field: self.ctx.child_path(FieldKey::Name(name)),
            source,
        })?;
        self.fields.insert(String::from(name), value);
        Ok(())
    }

    /// Writes a reference field.
    pub fn reference<T: Encode>(
        &mut self,
        name: &'static str,
        handle: Ref<T>,
    ) -> Result<(), EncodeError> {
        let value = self.nested(FieldKey::Name(name), |ctx| ctx.serialize(handle))?;
        self.fields.insert(String::from(name), value);
        Ok(())
    }

    /// Writes a reference field that may be empty, `None` is written as null.
    pub fn optional_reference<T: Encode>(
        &mut self,
        name: &'static str,
        handle: Option<Ref<T>>,
    ) -> Result<(), EncodeError> {
        match handle {
            Some(handle) => self.reference(name, handle),
            None => {
                self.fields.insert(String::from(name), Value::Null);
                Ok(())
            }
        }
    }

    /// Writes a list of references.
    pub fn references<T: Encode>(
        &mut self,
        name: &'static str,
        handles: &[Ref<T>],
    ) -> Result<(), EncodeError> {
        let mut items = Vec::with_capacity(handles.len());
        for (index, handle) in handles.iter().enumerate() {
            let value = self.nested(FieldKey::Element(name, index), |ctx| {
                ctx.serialize(*handle)
            })?;
            items.push(value);
        }
        self.fields.insert(String::from(name), Value::List(items));
        Ok(())
    }

    /// Writes a reference whose concrete type is found through the codec
    /// registry.
    pub fn dyn_reference(&mut self, name: &'static str, key: ObjectKey) -> Result<(), EncodeError> {
        let value = self.nested(FieldKey::Name(name), |ctx| ctx.serialize_dyn(key))?;
        self.fields.insert(String::from(name), value);
        Ok(())
    }

    fn nested(
        &mut self,
        key: FieldKey,
        f: impl FnOnce(&mut SerializeContext<'g>) -> Result<Value, EncodeError>,
    ) -> Result<Value, EncodeError> {
        self.ctx.enter(key);
        let result = f(&mut *self.ctx);
        self.ctx.leave();
        result
    }
}
