use alloc::vec::Vec;

use vc_graph::ObjectKey;

use super::{HashMap, new_hash_map};
use crate::envelope::RefId;

// -----------------------------------------------------------------------------
// IdentityRegistry

/// Assigns envelope ids to objects during one encode.
///
/// Objects are told apart by identity (their [`ObjectKey`]), never by
/// content: two equal but distinct objects receive two ids.
///
/// Ids are handed out sequentially from 0 in first-visit order.
pub struct IdentityRegistry {
    ids: HashMap<ObjectKey, RefId>,
    order: Vec<ObjectKey>,
}

impl Default for IdentityRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            ids: new_hash_map(),
            order: Vec::new(),
        }
    }

    /// Returns the id previously assigned to `key`.
    #[inline]
    pub fn lookup(&self, key: ObjectKey) -> Option<RefId> {
        self.ids.get(&key).copied()
    }

    /// Assigns the next id to `key`.
    ///
    /// Callers are expected to [`lookup`](Self::lookup) first. Registering a
    /// key twice returns the id it already has.
    pub fn register(&mut self, key: ObjectKey) -> RefId {
        let next = RefId(self.order.len() as u32);
        let id = *self.ids.entry(key).or_insert(next);
        if id == next {
            self.order.push(key);
            log::trace!("encode: {key:?} registered as id {id}");
        }
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(id, key)` pairs in registration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (RefId, ObjectKey)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(index, key)| (RefId(index as u32), *key))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::IdentityRegistry;
    use crate::envelope::RefId;
    use alloc::vec::Vec;
    use vc_graph::ObjectGraph;

    #[test]
    fn lookup_is_stable() {
        let mut graph = ObjectGraph::new();
        let a = graph.reserve();
        let b = graph.reserve();

        let mut registry = IdentityRegistry::new();
        assert_eq!(registry.lookup(a), None);
        assert_eq!(registry.lookup(a), None);

        assert_eq!(registry.register(a), RefId(0));
        assert_eq!(registry.lookup(a), Some(RefId(0)));
        assert_eq!(registry.lookup(a), Some(RefId(0)));

        assert_eq!(registry.register(b), RefId(1));
        assert_eq!(registry.register(a), RefId(0));
        assert_eq!(registry.len(), 2);

        let order: Vec<_> = registry.iter().collect();
        assert_eq!(order, [(RefId(0), a), (RefId(1), b)]);
    }
}
