use vc_graph::{ObjectGraph, ObjectKey, Ref};

use super::{Encode, SerializeContext};
use crate::error::EncodeError;
use crate::path::DEFAULT_MAX_DEPTH;
use crate::registry::CodecRegistry;
use crate::value::Value;

// -----------------------------------------------------------------------------
// EncodeDriver

/// Top-level entry point for encoding a graph into an exchange tree.
///
/// Every call starts from a fresh [`SerializeContext`], so ids always begin
/// at 0 and the root is always a value envelope.
///
/// # Examples
///
/// ```ignore
/// let value = EncodeDriver::new(&graph).encode(root)?;
/// let text = serde_json::to_string(&value)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EncodeDriver<'a> {
    graph: &'a ObjectGraph,
    registry: Option<&'a CodecRegistry>,
    max_depth: usize,
}

impl<'a> EncodeDriver<'a> {
    #[inline]
    pub const fn new(graph: &'a ObjectGraph) -> Self {
        Self {
            graph,
            registry: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a driver able to encode `dyn` references.
    #[inline]
    pub const fn with_registry(graph: &'a ObjectGraph, registry: &'a CodecRegistry) -> Self {
        Self {
            graph,
            registry: Some(registry),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limits how deep objects may nest below the root.
    ///
    /// A graph nesting deeper fails with [`EncodeError::DepthLimit`].
    #[inline]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Encodes the graph reachable from `root`.
    pub fn encode<T: Encode>(&self, root: Ref<T>) -> Result<Value, EncodeError> {
        let mut ctx = self.context();
        let value = ctx.serialize(root)?;
        log::debug!("encode: {} objects written", ctx.identities().len());
        Ok(value)
    }

    /// Encodes the graph reachable from `root`, whose type is looked up in
    /// the codec registry.
    pub fn encode_dyn(&self, root: ObjectKey) -> Result<Value, EncodeError> {
        let mut ctx = self.context();
        let value = ctx.serialize_dyn(root)?;
        log::debug!("encode: {} objects written", ctx.identities().len());
        Ok(value)
    }

    #[inline]
    fn context(&self) -> SerializeContext<'a> {
        let ctx = match self.registry {
            Some(registry) => SerializeContext::with_registry(self.graph, registry),
            None => SerializeContext::new(self.graph),
        };
        ctx.with_max_depth(self.max_depth)
    }
}

/// Encodes the graph reachable from `root`.
///
/// Shorthand for [`EncodeDriver::new(graph).encode(root)`](EncodeDriver::encode).
#[inline]
pub fn encode<T: Encode>(graph: &ObjectGraph, root: Ref<T>) -> Result<Value, EncodeError> {
    EncodeDriver::new(graph).encode(root)
}
