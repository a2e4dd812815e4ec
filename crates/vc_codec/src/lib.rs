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
mod path;

pub mod de;
pub mod envelope;
pub mod registry;
pub mod ser;
pub mod value;


// -----------------------------------------------------------------------------
// Top-level exports

pub use de::{Decode, DecodeDriver, DecodeOptions, Decoded, FieldReader, decode};
pub use envelope::RefId;
pub use error::{DecodeError, EncodeError, FieldError, FieldErrors, ROOT_FIELD};
pub use path::DEFAULT_MAX_DEPTH;
pub use registry::CodecRegistry;
pub use ser::{Encode, EncodeDriver, FieldWriter, encode};
pub use value::{FromValue, Map, Value};

pub use vc_graph::{FieldKey, Object, ObjectGraph, ObjectKey, PatchError, Ref};
