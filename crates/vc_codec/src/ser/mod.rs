//! Graph to exchange tree.
//!
//! The walk is depth-first from the root. Every reference field goes through
//! [`SerializeContext::serialize`]: the first visit of an object emits a value
//! envelope with a fresh id, every later visit emits a back-reference to that
//! id. Cycles therefore terminate on their second visit.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod driver;
mod encode;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use context::SerializeContext;
pub use driver::{EncodeDriver, encode};
pub use encode::Encode;
pub use writer::FieldWriter;
