use alloc::string::String;

use vc_graph::{FieldKey, ObjectGraph, ObjectKey, Ref};

use super::{Encode, FieldWriter};
use crate::envelope::{RefId, object_envelope, ref_envelope};
use crate::error::EncodeError;
use crate::path::{DEFAULT_MAX_DEPTH, FieldPath};
use crate::registry::{CodecRegistry, IdentityRegistry};
use crate::value::Value;

// -----------------------------------------------------------------------------
// SerializeContext

/// State of one encode walk.
///
/// Owns the [`IdentityRegistry`] of the walk. A context is created per
/// top-level call and dropped after it, ids are never shared between calls.
pub struct SerializeContext<'g> {
    graph: &'g ObjectGraph,
    registry: Option<&'g CodecRegistry>,
    identities: IdentityRegistry,
    path: FieldPath,
    max_depth: usize,
}

impl<'g> SerializeContext<'g> {
    #[inline]
    pub const fn new(graph: &'g ObjectGraph) -> Self {
        Self {
            graph,
            registry: None,
            identities: IdentityRegistry::new(),
            path: FieldPath::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a context able to encode `dyn` references through `registry`.
    #[inline]
    pub const fn with_registry(graph: &'g ObjectGraph, registry: &'g CodecRegistry) -> Self {
        Self {
            graph,
            registry: Some(registry),
            identities: IdentityRegistry::new(),
            path: FieldPath::new(),
            max_depth: DEFAULT_MAX_DEPTH,
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

    #[inline]
    pub const fn graph(&self) -> &'g ObjectGraph {
        self.graph
    }

    #[inline]
    pub const fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    /// See [`IdentityRegistry::lookup`].
    #[inline]
    pub fn lookup(&self, key: ObjectKey) -> Option<RefId> {
        self.identities.lookup(key)
    }

    /// See [`IdentityRegistry::register`].
    #[inline]
    pub fn register(&mut self, key: ObjectKey) -> RefId {
        self.identities.register(key)
    }

    /// Encodes the object behind `handle`.
    ///
    /// Returns a back-reference if the object was already visited during
    /// this walk, otherwise registers it and returns its value envelope.
    pub fn serialize<T: Encode>(&mut self, handle: Ref<T>) -> Result<Value, EncodeError> {
        let key = handle.key();
        if let Some(id) = self.lookup(key) {
            return Ok(ref_envelope(id));
        }
        self.check_depth()?;

        let graph = self.graph;
        let object = graph.get(handle).map_err(|source| EncodeError::Access {
            field: self.path.render(),
            source,
        })?;

        let id = self.register(key);
        let mut writer = FieldWriter::new(self);
        object.encode_fields(&mut writer)?;
        let fields = writer.finish();

        Ok(object_envelope(object.type_tag(), id, fields))
    }

    /// Encodes the object at `key`, whose type is looked up by its tag in the
    /// codec registry.
    pub fn serialize_dyn(&mut self, key: ObjectKey) -> Result<Value, EncodeError> {
        if let Some(id) = self.lookup(key) {
            return Ok(ref_envelope(id));
        }
        self.check_depth()?;

        let tag = self
            .graph
            .get_dyn(key)
            .map_err(|source| EncodeError::Access {
                field: self.path.render(),
                source,
            })?
            .type_tag();

        let codec = self
            .registry
            .and_then(|registry| registry.get(tag))
            .copied()
            .ok_or_else(|| EncodeError::Unregistered {
                field: self.path.render(),
                tag,
            })?;

        codec.encode(self, key)
    }

    fn check_depth(&self) -> Result<(), EncodeError> {
        if self.path.depth() > self.max_depth {
            log::warn!(
                "encode: `{}` nests deeper than {} objects",
                self.path,
                self.max_depth
            );
            return Err(EncodeError::DepthLimit {
                field: self.path.render(),
                limit: self.max_depth,
            });
        }
        Ok(())
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
}
