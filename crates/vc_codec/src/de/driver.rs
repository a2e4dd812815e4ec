use vc_graph::{AccessError, ObjectGraph, ObjectKey, Ref};

use super::{Decode, DeserializeContext};
use crate::error::DecodeError;
use crate::path::DEFAULT_MAX_DEPTH;
use crate::registry::{CodecRegistry, Resolution};
use crate::value::Value;

// -----------------------------------------------------------------------------
// DecodeOptions

/// Options of one top-level decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Seal every decoded object once all references are assigned.
    ///
    /// Defaults to `false`.
    pub freeze: bool,
    /// How deep objects may nest below the root before the input is
    /// rejected.
    ///
    /// Defaults to [`DEFAULT_MAX_DEPTH`].
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeOptions {
    #[inline]
    pub const fn new() -> Self {
        Self {
            freeze: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    #[inline]
    pub const fn with_freeze(mut self, freeze: bool) -> Self {
        self.freeze = freeze;
        self
    }

    #[inline]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

// -----------------------------------------------------------------------------
// Decoded

/// The result of a successful decode: the graph and its root.
pub struct Decoded<T> {
    graph: ObjectGraph,
    root: Ref<T>,
}

impl<T: Decode> Decoded<T> {
    #[inline]
    pub const fn root(&self) -> Ref<T> {
        self.root
    }

    #[inline]
    pub const fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    /// The graph, mutably. Sealed objects still reject mutation.
    #[inline]
    pub const fn graph_mut(&mut self) -> &mut ObjectGraph {
        &mut self.graph
    }

    /// Returns the root object.
    #[inline]
    pub fn get(&self) -> Result<&T, AccessError> {
        self.graph.get(self.root)
    }

    #[inline]
    pub fn into_parts(self) -> (ObjectGraph, Ref<T>) {
        (self.graph, self.root)
    }
}

impl<T> core::fmt::Debug for Decoded<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Decoded")
            .field("graph", &self.graph)
            .field("root", &self.root)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// DecodeDriver

/// Top-level entry point for decoding an exchange tree into a graph.
///
/// Every call starts from a fresh [`DeserializeContext`] and a fresh graph,
/// so decoding the same tree twice yields two independent graphs. On error no
/// part of the graph is returned.
///
/// # Examples
///
/// ```ignore
/// let value: Value = serde_json::from_str(text)?;
/// let decoded = DecodeDriver::new().freeze(true).decode::<Node>(&value)?;
/// let root = decoded.get()?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeDriver<'a> {
    registry: Option<&'a CodecRegistry>,
    options: DecodeOptions,
}

impl<'a> DecodeDriver<'a> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            registry: None,
            options: DecodeOptions::new(),
        }
    }

    /// Creates a driver able to decode `dyn` references and roots.
    #[inline]
    pub const fn with_registry(registry: &'a CodecRegistry) -> Self {
        Self {
            registry: Some(registry),
            options: DecodeOptions::new(),
        }
    }

    /// Seal every decoded object at the end of the decode.
    #[inline]
    pub const fn freeze(mut self, freeze: bool) -> Self {
        self.options.freeze = freeze;
        self
    }

    /// Limits how deep objects may nest below the root.
    ///
    /// Deeper input fails with a [`FieldError`](crate::FieldError) at the
    /// first object past the limit.
    #[inline]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    #[inline]
    pub const fn options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Decodes a tree whose root is a `T`.
    pub fn decode<T: Decode>(&self, value: &Value) -> Result<Decoded<T>, DecodeError> {
        let mut ctx = self.context();
        let root = ctx.deserialize::<T>(value)?;
        let (graph, root) = self.finish(ctx, root)?;
        Ok(Decoded {
            graph,
            root: Ref::from_key(root),
        })
    }

    /// Decodes a tree whose root type is named by its envelope tag.
    ///
    /// Requires a driver created by [`with_registry`](Self::with_registry).
    pub fn decode_dyn(&self, value: &Value) -> Result<(ObjectGraph, ObjectKey), DecodeError> {
        let mut ctx = self.context();
        let root = ctx.deserialize_dyn(value)?;
        self.finish(ctx, root)
    }

    #[inline]
    fn context(&self) -> DeserializeContext<'a> {
        let ctx = match self.registry {
            Some(registry) => DeserializeContext::with_registry(registry),
            None => DeserializeContext::new(),
        };
        ctx.with_max_depth(self.options.max_depth)
    }

    fn finish(
        &self,
        ctx: DeserializeContext<'a>,
        root: Resolution,
    ) -> Result<(ObjectGraph, ObjectKey), DecodeError> {
        let root = match root {
            Resolution::Resolved(key) => key,
            Resolution::Pending(pending) => {
                return Err(DecodeError::RootIsReference(pending.id()));
            }
        };

        log::debug!(
            "decode: walk done, {} objects bound, {} patches queued",
            ctx.references().len(),
            ctx.patches().len(),
        );

        let graph = ctx.finish(self.options)?;
        Ok((graph, root))
    }
}

/// Decodes a tree whose root is a `T`.
///
/// Shorthand for [`DecodeDriver::new().options(options).decode(value)`](DecodeDriver::decode).
#[inline]
pub fn decode<T: Decode>(value: &Value, options: DecodeOptions) -> Result<Decoded<T>, DecodeError> {
    DecodeDriver::new().options(options).decode(value)
}
