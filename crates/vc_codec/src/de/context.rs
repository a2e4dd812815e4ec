use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};

use vc_graph::{FieldKey, ObjectGraph, ObjectKey};

use super::{Decode, DecodeOptions, FieldReader, FreezeTracker, Patch, PatchQueue};
use crate::envelope::{Envelope, RefId};
use crate::error::{DecodeError, FieldError, FieldErrors};
use crate::path::{DEFAULT_MAX_DEPTH, FieldPath};
use crate::registry::{CodecRegistry, PendingRef, ReferenceRegistry, Resolution};
use crate::value::{Map, Value};

// -----------------------------------------------------------------------------
// DeserializeContext

/// State of one decode walk.
///
/// Owns the graph under construction together with the [`ReferenceRegistry`],
/// [`PatchQueue`] and [`FreezeTracker`] of the walk. A context is created per
/// top-level call; nothing in it is shared with another call.
pub struct DeserializeContext<'r> {
    graph: ObjectGraph,
    references: ReferenceRegistry,
    patches: PatchQueue,
    freeze: FreezeTracker,
    registry: Option<&'r CodecRegistry>,
    path: FieldPath,
    max_depth: usize,
}

impl Default for DeserializeContext<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> DeserializeContext<'r> {
    #[inline]
    pub fn new() -> Self {
        Self {
            graph: ObjectGraph::new(),
            references: ReferenceRegistry::new(),
            patches: PatchQueue::new(),
            freeze: FreezeTracker::new(),
            registry: None,
            path: FieldPath::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a context able to decode `dyn` references through `registry`.
    #[inline]
    pub fn with_registry(registry: &'r CodecRegistry) -> Self {
        Self {
            registry: Some(registry),
            ..Self::new()
        }
    }

    /// Limits how deep objects may nest below the root.
    ///
    /// Defaults to [`DEFAULT_MAX_DEPTH`].
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[inline]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The graph under construction.
    ///
    /// Objects whose fields are still being read are reserved but vacant.
    #[inline]
    pub const fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    #[inline]
    pub const fn references(&self) -> &ReferenceRegistry {
        &self.references
    }

    #[inline]
    pub const fn patches(&self) -> &PatchQueue {
        &self.patches
    }

    /// See [`ReferenceRegistry::resolve`].
    #[inline]
    pub fn resolve(&self, id: RefId) -> Resolution {
        self.references.resolve(id)
    }

    /// Binds `id` to `key`, reporting a duplicate id at the current path.
    pub fn register(
        &mut self,
        id: RefId,
        key: ObjectKey,
        tag: &'static str,
    ) -> Result<(), FieldError> {
        self.references.register(id, key, tag).map_err(|err| {
            log::warn!(
                "decode: id {id} at `{}` is already bound to a `{}`, keeping the first binding",
                self.path,
                err.existing.tag,
            );
            FieldError::new(self.path.render(), err)
        })
    }

    /// Queues the assignment of `pending` to `field` of `target`.
    ///
    /// `field` is a child of the current path.
    pub fn enqueue(
        &mut self,
        target: ObjectKey,
        field: FieldKey,
        pending: PendingRef,
        expected: Option<&'static str>,
    ) {
        self.patches.enqueue(Patch {
            target,
            field,
            id: pending.id(),
            expected,
            path: self.path.child(field),
        });
    }

    /// Decodes `value` as a `T`.
    ///
    /// A value envelope is constructed and bound, a back-reference resolves
    /// to its bound object or to a [`PendingRef`] when the id is not bound
    /// yet. Every problem found in `value` and below it is returned as one
    /// batch.
    pub fn deserialize<T: Decode>(&mut self, value: &Value) -> Result<Resolution, FieldErrors> {
        match self.parse(value)? {
            Envelope::Ref(id) => self.resolve_as(id, Some(T::TYPE_TAG)),
            Envelope::Object { tag, id, fields } => {
                if tag != T::TYPE_TAG {
                    return Err(self.error(format!(
                        "expected a `{}` envelope, found `{tag}`",
                        T::TYPE_TAG
                    )));
                }
                self.construct::<T>(id, fields).map(Resolution::Resolved)
            }
        }
    }

    /// Decodes `value` as whatever type its envelope tag names, looked up in
    /// the codec registry.
    pub fn deserialize_dyn(&mut self, value: &Value) -> Result<Resolution, FieldErrors> {
        match self.parse(value)? {
            Envelope::Ref(id) => self.resolve_as(id, None),
            Envelope::Object { tag, .. } => {
                let codec = self
                    .registry
                    .and_then(|registry| registry.get(tag))
                    .copied()
                    .ok_or_else(|| {
                        self.error(format!("no codec is registered for type `{tag}`"))
                    })?;
                codec.decode(self, value)
            }
        }
    }

    /// Runs the patch phase, then the freeze phase if requested, and returns
    /// the finished graph.
    pub fn finish(self, options: DecodeOptions) -> Result<ObjectGraph, DecodeError> {
        let Self {
            mut graph,
            references,
            patches,
            freeze,
            ..
        } = self;

        let applied = patches.apply_all(&references, &mut graph)?;
        if options.freeze {
            freeze.freeze_all(&mut graph, applied);
        }
        Ok(graph)
    }

    // -------------------------------------------------------------------------
    // Walk

    fn parse<'v>(&self, value: &'v Value) -> Result<Envelope<'v>, FieldErrors> {
        Envelope::parse(value).map_err(|err| self.error(err))
    }

    fn resolve_as(
        &self,
        id: RefId,
        expected: Option<&'static str>,
    ) -> Result<Resolution, FieldErrors> {
        match (self.references.binding(id), expected) {
            (Some(binding), Some(expected)) if binding.tag != expected => Err(self.error(format!(
                "reference to id {id} expects a `{expected}`, found a `{}`",
                binding.tag
            ))),
            (Some(binding), _) => Ok(Resolution::Resolved(binding.key)),
            (None, _) => Ok(Resolution::Pending(PendingRef::new(id))),
        }
    }

    fn construct<T: Decode>(&mut self, id: RefId, fields: &Map) -> Result<ObjectKey, FieldErrors> {
        if self.path.depth() > self.max_depth {
            log::warn!(
                "decode: `{}` nests deeper than {} objects",
                self.path,
                self.max_depth
            );
            return Err(self.error(format!(
                "nesting exceeds the depth limit of {}",
                self.max_depth
            )));
        }

        let missing: FieldErrors = T::REQUIRED_FIELDS
            .iter()
            .filter(|name| !fields.contains_key(**name))
            .map(|name| {
                FieldError::new(self.path.child(FieldKey::Name(*name)), "missing required field")
            })
            .collect();
        missing.into_result()?;

        let key = self.graph.reserve();
        self.register(id, key, T::TYPE_TAG)?;
        self.freeze.track(key);

        let mut reader = FieldReader::new(self, key, fields);
        let object = T::decode_fields(&mut reader);
        let errors = reader.into_errors();

        errors.into_result()?;
        let Some(object) = object else {
            return Err(self.error(format!("`{}` could not be constructed", T::TYPE_TAG)));
        };

        self.graph
            .fill(key, Box::new(object))
            .map_err(|err| self.error(err))?;
        Ok(key)
    }

    // -------------------------------------------------------------------------
    // Path

    #[inline]
    pub(crate) fn enter(&mut self, key: FieldKey) {
        self.path.push(key);
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    /// Renders the current field path.
    #[inline]
    pub fn path(&self) -> String {
        self.path.render()
    }

    /// Renders the path of the field `key` of the current value.
    #[inline]
    pub(crate) fn child_path(&self, key: FieldKey) -> String {
        self.path.child(key)
    }

    #[inline]
    fn error(&self, message: impl ToString) -> FieldErrors {
        FieldErrors::single(FieldError::new(self.path.render(), message))
    }
}
