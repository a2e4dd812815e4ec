//! Exchange tree to graph.
//!
//! Decoding is a single depth-first pass followed by two fix-up phases:
//!
//! 1. **Walk**: every value envelope reserves a slot in a fresh
//!    [`ObjectGraph`](vc_graph::ObjectGraph) and binds its id *before* its
//!    fields are read, so a field pointing back at an enclosing object
//!    resolves at once. A field pointing at an id that appears later in the
//!    tree receives a placeholder and a [`Patch`] is queued.
//! 2. **Patch**: once the whole tree is visited, the [`PatchQueue`] is drained
//!    in order. Any id still unbound at this point is fatal.
//! 3. **Freeze** (optional): every constructed object is sealed.
//!
//! Validation problems found during the walk are collected into one
//! [`FieldErrors`](crate::FieldErrors) batch.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod decode;
mod driver;
mod freeze;
mod patch;
mod reader;

// -----------------------------------------------------------------------------
// Exports

pub use context::DeserializeContext;
pub use decode::Decode;
pub use driver::{DecodeDriver, DecodeOptions, Decoded, decode};
pub use freeze::FreezeTracker;
pub use patch::{Patch, PatchQueue, PatchesApplied};
pub use reader::FieldReader;
