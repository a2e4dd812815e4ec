use thiserror::Error;
use vc_graph::ObjectKey;

use super::{HashMap, new_hash_map};
use crate::envelope::RefId;

// -----------------------------------------------------------------------------
// Resolution

/// Placeholder for an id that has not been registered yet.
///
/// It only says "this object will exist later"; it must never end up stored
/// as a field of the finished graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRef {
    id: RefId,
}

impl PendingRef {
    #[inline]
    pub const fn new(id: RefId) -> Self {
        Self { id }
    }

    #[inline]
    pub const fn id(&self) -> RefId {
        self.id
    }
}

/// Result of [`ReferenceRegistry::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ObjectKey),
    Pending(PendingRef),
}

impl Resolution {
    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    #[inline]
    pub const fn resolved(self) -> Option<ObjectKey> {
        match self {
            Self::Resolved(key) => Some(key),
            Self::Pending(_) => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Binding

/// What an id is bound to: the object slot and the object's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: ObjectKey,
    pub tag: &'static str,
}

/// An id was registered a second time.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("id {id} is declared more than once")]
pub struct DuplicateId {
    pub id: RefId,
    /// The binding that was kept.
    pub existing: Binding,
}

// -----------------------------------------------------------------------------
// ReferenceRegistry

/// Maps envelope ids to constructed objects during one decode.
///
/// The first registration of an id wins and is never displaced.
pub struct ReferenceRegistry {
    bindings: HashMap<RefId, Binding>,
}

impl Default for ReferenceRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            bindings: new_hash_map(),
        }
    }

    /// Binds `id` to the object slot `key`.
    ///
    /// Fails, leaving the first binding in place, if `id` is already bound.
    pub fn register(
        &mut self,
        id: RefId,
        key: ObjectKey,
        tag: &'static str,
    ) -> Result<(), DuplicateId> {
        match self.bindings.entry(id) {
            hashbrown::hash_map::Entry::Occupied(entry) => Err(DuplicateId {
                id,
                existing: *entry.get(),
            }),
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(Binding { key, tag });
                log::trace!("decode: id {id} bound to `{tag}` {key:?}");
                Ok(())
            }
        }
    }

    /// Returns the bound object, or a [`PendingRef`] if `id` is not bound yet.
    #[inline]
    pub fn resolve(&self, id: RefId) -> Resolution {
        match self.bindings.get(&id) {
            Some(binding) => Resolution::Resolved(binding.key),
            None => Resolution::Pending(PendingRef::new(id)),
        }
    }

    #[inline]
    pub fn binding(&self, id: RefId) -> Option<Binding> {
        self.bindings.get(&id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests
