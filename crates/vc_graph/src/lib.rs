#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod graph;
mod object;

// -----------------------------------------------------------------------------
// Top-level exports

pub use error::{AccessError, PatchError};
pub use graph::ObjectGraph;
pub use object::{FieldKey, Object, ObjectKey, Ref};
