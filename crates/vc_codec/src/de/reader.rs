use alloc::string::ToString;
use alloc::vec::Vec;

use vc_graph::{FieldKey, ObjectKey, Ref};

use super::{Decode, DeserializeContext};
use crate::error::{FieldError, FieldErrors};
use crate::registry::Resolution;
use crate::value::{FromValue, Map, Value};

const MISSING: &str = "missing required field";

/// Reads the field map of one value envelope.
///
/// Handed to [`Decode::decode_fields`]. Every accessor records its problems
/// in the reader and returns `None`, so reading continues and all problems of
/// the envelope are reported together.
///
/// Reference accessors may hand out a placeholder (a null [`Ref`]) when the
/// referenced object appears later in the tree; the field is then assigned
/// through [`Object::patch`](vc_graph::Object::patch) once the walk is over.
pub struct FieldReader<'c, 'r> {
    ctx: &'c mut DeserializeContext<'r>,
    target: ObjectKey,
    fields: &'c Map,
    errors: FieldErrors,
}

impl<'c, 'r> FieldReader<'c, 'r> {
    #[inline]
    pub(super) fn new(
        ctx: &'c mut DeserializeContext<'r>,
        target: ObjectKey,
        fields: &'c Map,
    ) -> Self {
        Self {
            ctx,
            target,
            fields,
            errors: FieldErrors::new(),
        }
    }

    #[inline]
    pub(super) fn into_errors(self) -> FieldErrors {
        self.errors
    }

    /// The slot of the object being decoded.
    ///
    /// It stays vacant until `decode_fields` returns.
    #[inline]
    pub const fn target(&self) -> ObjectKey {
        self.target
    }

    /// The context of the walk this reader belongs to.
    #[inline]
    pub fn context(&mut self) -> &mut DeserializeContext<'r> {
        &mut *self.ctx
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns a field without converting it.
    #[inline]
    pub fn raw(&self, name: &str) -> Option<&'c Value> {
        self.fields.get(name)
    }

    /// Returns `true` if no problem has been recorded so far.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records a problem with the field `name`.
    ///
    /// Use this for custom validation: the object is not constructed if any
    /// problem was recorded.
    pub fn reject(&mut self, name: &'static str, message: impl ToString) {
        let field = self.ctx.child_path(FieldKey::Name(name));
        self.errors.push(FieldError::new(field, message));
    }

    // -------------------------------------------------------------------------
    // Scalars

    /// Reads and converts a field that must be present.
    pub fn required<S: FromValue>(&mut self, name: &'static str) -> Option<S> {
        let fields = self.fields;
        let Some(value) = fields.get(name) else {
            self.reject(name, MISSING);
            return None;
        };
        self.convert(name, value)
    }

    /// Reads and converts a field that may be absent or null.
    pub fn optional<S: FromValue>(&mut self, name: &'static str) -> Option<S> {
        let fields = self.fields;
        match fields.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => self.convert(name, value),
        }
    }

    fn convert<S: FromValue>(&mut self, name: &'static str, value: &Value) -> Option<S> {
        match S::from_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                self.reject(name, err);
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // References

    /// Reads a reference field that must be present.
    pub fn reference<T: Decode>(&mut self, name: &'static str) -> Option<Ref<T>> {
        let fields = self.fields;
        let Some(value) = fields.get(name) else {
            self.reject(name, MISSING);
            return None;
        };
        self.decode_reference(FieldKey::Name(name), value)
    }

    /// Reads a reference field that may be absent or null.
    pub fn optional_reference<T: Decode>(&mut self, name: &'static str) -> Option<Ref<T>> {
        let fields = self.fields;
        match fields.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => self.decode_reference(FieldKey::Name(name), value),
        }
    }

    /// Reads a list of references, which must be present.
    ///
    /// Elements are patched individually, as [`FieldKey::Element`] keys.
    pub fn references<T: Decode>(&mut self, name: &'static str) -> Option<Vec<Ref<T>>> {
        let fields = self.fields;
        let Some(value) = fields.get(name) else {
            self.reject(name, MISSING);
            return None;
        };
        let Some(items) = value.as_list() else {
            self.reject(name, format_args!("expected a list, found {}", value.kind()));
            return None;
        };

        let mut handles = Vec::with_capacity(items.len());
        let mut complete = true;
        for (index, item) in items.iter().enumerate() {
            match self.decode_reference(FieldKey::Element(name, index), item) {
                Some(handle) => handles.push(handle),
                None => complete = false,
            }
        }
        complete.then_some(handles)
    }

    /// Reads a reference whose concrete type is named by the envelope tag.
    ///
    /// The returned key may be null when the object appears later in the
    /// tree, it is then patched like any other reference.
    pub fn dyn_reference(&mut self, name: &'static str) -> Option<ObjectKey> {
        let fields = self.fields;
        let Some(value) = fields.get(name) else {
            self.reject(name, MISSING);
            return None;
        };

        let key = FieldKey::Name(name);
        self.ctx.enter(key);
        let result = self.ctx.deserialize_dyn(value);
        self.ctx.leave();
        self.settle(key, result, None)
    }

    fn decode_reference<T: Decode>(&mut self, key: FieldKey, value: &Value) -> Option<Ref<T>> {
        self.ctx.enter(key);
        let result = self.ctx.deserialize::<T>(value);
        self.ctx.leave();
        self.settle(key, result, Some(T::TYPE_TAG))
            .map(Ref::from_key)
    }

    /// Turns the outcome of a nested decode into the value stored in the
    /// field: the bound key, a null placeholder plus a queued patch, or
    /// nothing.
    fn settle(
        &mut self,
        key: FieldKey,
        result: Result<Resolution, FieldErrors>,
        expected: Option<&'static str>,
    ) -> Option<ObjectKey> {
        match result {
            Ok(Resolution::Resolved(object)) => Some(object),
            Ok(Resolution::Pending(pending)) => {
                self.ctx.enqueue(self.target, key, pending, expected);
                Some(ObjectKey::default())
            }
            Err(errors) => {
                self.errors.append(errors);
                None
            }
        }
    }
}
