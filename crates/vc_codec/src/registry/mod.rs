//! Per-call identity bookkeeping and the type codec table.
//!
//! - [`IdentityRegistry`]: encode side, object identity to envelope id.
//! - [`ReferenceRegistry`]: decode side, envelope id to constructed object.
//! - [`CodecRegistry`]: type tag to codec functions, for references whose
//!   concrete type is only known at runtime.

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod identity;
mod reference;

// -----------------------------------------------------------------------------
// Exports

pub use codec::{CodecRegistry, TypeCodec};
pub use identity::IdentityRegistry;
pub use reference::{Binding, DuplicateId, PendingRef, ReferenceRegistry, Resolution};

// -----------------------------------------------------------------------------
// Hash containers

use foldhash::fast::FixedState;

const HASH_SEED: u64 = 0x5DEE_CE66_D1CE_4E5B;

/// Hash map with a fixed-seed `foldhash` state, so iteration order only
/// depends on the inserted keys.
type HashMap<K, V> = hashbrown::HashMap<K, V, FixedState>;

#[inline]
const fn new_hash_map<K, V>() -> HashMap<K, V> {
    hashbrown::HashMap::with_hasher(FixedState::with_seed(HASH_SEED))
}
